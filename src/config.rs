//! Map constants, the embedded level catalogue and persisted user settings.

use crate::geometry::PathStyle;
use crate::model::LevelDef;
use crate::persistence::{KeyValueStore, StoreError};
use crate::state::animation::DEFAULT_TWEEN_MS;
use serde::{Deserialize, Serialize};
use tracing::warn;

const CATALOGUE_JSON: &str = include_str!("../assets/levels.json");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("level catalogue is not valid JSON: {0}")]
    Catalogue(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub tween_ms: f64,
    /// Pause between completing a level and the marker setting off.
    pub lead_in_ms: f64,
    /// How long a freshly unlocked node flashes.
    pub unlock_flash_ms: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tween_ms: DEFAULT_TWEEN_MS,
            lead_in_ms: 500.0,
            unlock_flash_ms: 600.0,
        }
    }
}

/// Storage key names. The defaults match what the individual level pages write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageKeys {
    pub level_flag_prefix: String,
    pub level_flag_suffix: String,
    pub current_level: String,
    pub completed_levels: String,
    pub settings: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            level_flag_prefix: "level".into(),
            level_flag_suffix: "Completed".into(),
            current_level: "currentLevel".into(),
            completed_levels: "completedLevels".into(),
            settings: "lm_settings".into(),
        }
    }
}

impl StorageKeys {
    pub fn level_flag(&self, id: u32) -> String {
        format!("{}{}{}", self.level_flag_prefix, id, self.level_flag_suffix)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub timing: Timing,
    pub path: PathStyle,
    pub keys: StorageKeys,
    /// `{id}` is replaced with the level id.
    pub level_url_template: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            path: PathStyle::default(),
            keys: StorageKeys::default(),
            level_url_template: "level{id}.html".into(),
        }
    }
}

impl MapConfig {
    pub fn level_url(&self, id: u32) -> String {
        self.level_url_template.replace("{id}", &id.to_string())
    }
}

pub fn parse_catalogue(raw: &str) -> Result<Vec<LevelDef>, ConfigError> {
    Ok(serde_json::from_str(raw)?)
}

/// The catalogue shipped with the app. A broken asset yields an empty map.
pub fn load_catalogue() -> Vec<LevelDef> {
    match parse_catalogue(CATALOGUE_JSON) {
        Ok(defs) => defs,
        Err(e) => {
            warn!(error = %e, "level catalogue ignored");
            Vec::new()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub muted: bool,
}

impl Settings {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, keys: &StorageKeys) -> Self {
        let raw = match store.get(&keys.settings) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!(error = %e, "settings read failed");
                return Self::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "settings ignored");
            Self::default()
        })
    }

    pub fn save<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        keys: &StorageKeys,
    ) -> Result<(), StoreError> {
        store.set(&keys.settings, &serde_json::to_string(self)?)
    }

    /// Writes only when the stored settings differ. Returns whether a write happened.
    pub fn save_if_changed<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        keys: &StorageKeys,
    ) -> Result<bool, StoreError> {
        if Self::load(store, keys) == *self {
            return Ok(false);
        }
        self.save(store, keys)?;
        Ok(true)
    }
}
