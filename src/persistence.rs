//! Durable progress storage.
//!
//! Progress lives in the page's `localStorage` using the keys the level pages
//! themselves write: one `level{id}Completed` flag per level, plus the last current
//! level and the completed id list. Anything missing or malformed is treated as
//! absent.

use crate::config::StorageKeys;
use crate::progression::ProgressionState;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("localStorage is not available")]
    Unavailable,
    #[error("storage call failed: {0}")]
    Js(String),
    #[error("could not encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Minimal string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// The browser's `window.localStorage`.
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    pub fn open() -> Result<Self, StoreError> {
        let win = web_sys::window().ok_or(StoreError::Unavailable)?;
        match win.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StoreError::Unavailable),
            Err(e) => Err(StoreError::Js(format!("{e:?}"))),
        }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Js(format!("{e:?}")))
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::Js(format!("{e:?}")))
    }
    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StoreError::Js(format!("{e:?}")))
    }
}

/// Session-only store, used when `localStorage` is blocked.
#[derive(Default)]
pub struct MemoryStore {
    map: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.borrow().get(key).cloned())
    }
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map.borrow_mut().remove(key);
        Ok(())
    }
}

/// `localStorage` when available, otherwise an in-memory store for this session.
pub fn browser_store() -> Box<dyn KeyValueStore> {
    match LocalStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "falling back to in-memory progress store");
            Box::new(MemoryStore::new())
        }
    }
}

pub struct ProgressStore<S> {
    store: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(store: S, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    /// Reads progress for a catalogue of `total` levels.
    ///
    /// A saved in-progress level wins over the completed-count default so a player who
    /// left mid-level resumes there.
    pub fn load(&self, total: u32) -> ProgressionState {
        let completed: BTreeSet<u32> = (1..=total)
            .filter(|id| {
                self.read(&self.keys.level_flag(*id))
                    .is_some_and(|v| v.trim() == "true")
            })
            .collect();
        let saved_current = self
            .read(&self.keys.current_level)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|v| (1..=total).contains(v) && !completed.contains(v));
        let current_level_id = match saved_current {
            Some(v) => v,
            None => resume_level(total, &completed),
        };
        debug!(current_level_id, completed = completed.len(), "progress loaded");
        ProgressionState {
            current_level_id,
            completed_level_ids: completed,
        }
    }

    /// Writes `state` so that a following `load(total)` reproduces it.
    pub fn save(&self, state: &ProgressionState, total: u32) -> Result<(), StoreError> {
        for id in 1..=total {
            let key = self.keys.level_flag(id);
            if state.completed_level_ids.contains(&id) {
                self.store.set(&key, "true")?;
            } else {
                self.store.remove(&key)?;
            }
        }
        let list: Vec<u32> = state.completed_level_ids.iter().copied().collect();
        self.store
            .set(&self.keys.completed_levels, &serde_json::to_string(&list)?)?;
        // current level goes last: a crash before this line only loses the move itself
        self.store
            .set(&self.keys.current_level, &state.current_level_id.to_string())?;
        debug!(current = state.current_level_id, "progress saved");
        Ok(())
    }

    pub fn clear(&self, total: u32) -> Result<(), StoreError> {
        for id in 1..=total {
            self.store.remove(&self.keys.level_flag(id))?;
        }
        self.store.remove(&self.keys.current_level)?;
        self.store.remove(&self.keys.completed_levels)?;
        debug!("progress cleared");
        Ok(())
    }
}

/// One past the number of completed levels, held at the last level once all are done.
fn resume_level(total: u32, completed: &BTreeSet<u32>) -> u32 {
    let done = u32::try_from(completed.len()).unwrap_or(u32::MAX);
    done.saturating_add(1).min(total.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::{Advance, Progression};

    fn store() -> ProgressStore<MemoryStore> {
        ProgressStore::new(MemoryStore::new(), StorageKeys::default())
    }

    fn state(current: u32, completed: &[u32]) -> ProgressionState {
        ProgressionState {
            current_level_id: current,
            completed_level_ids: completed.iter().copied().collect(),
        }
    }

    #[test]
    fn fresh_store_loads_initial_state() {
        assert_eq!(store().load(7), ProgressionState::default());
    }

    #[test]
    fn flags_build_completed_set() {
        let s = store();
        s.inner().set("level1Completed", "true").unwrap();
        s.inner().set("level2Completed", "true").unwrap();
        s.inner().set("level3Completed", "false").unwrap();
        s.inner().set("level9Completed", "true").unwrap();
        assert_eq!(s.load(7), state(3, &[1, 2]));
    }

    #[test]
    fn saved_current_level_wins_when_valid() {
        let s = store();
        s.inner().set("level1Completed", "true").unwrap();
        s.inner().set("currentLevel", "2").unwrap();
        assert_eq!(s.load(7).current_level_id, 2);
    }

    #[test]
    fn invalid_saved_current_falls_back() {
        let s = store();
        s.inner().set("level1Completed", "true").unwrap();
        for bad in ["0", "8", "-3", "abc", "", "1"] {
            s.inner().set("currentLevel", bad).unwrap();
            assert_eq!(s.load(7).current_level_id, 2, "value {bad:?}");
        }
    }

    #[test]
    fn missing_current_resumes_after_completed_count() {
        let s = store();
        s.inner().set("level1Completed", "true").unwrap();
        s.inner().set("level3Completed", "true").unwrap();
        assert_eq!(s.load(7), state(3, &[1, 3]));
        // a stale saved value falls back the same way
        s.inner().set("currentLevel", "1").unwrap();
        assert_eq!(s.load(7).current_level_id, 3);
    }

    #[test]
    fn round_trips_every_reachable_state() {
        let s = store();
        let mut p = Progression::new(4, ProgressionState::default());
        let mut seen = vec![p.state().clone()];
        loop {
            match p.advance() {
                Ok(Advance::Move { .. }) => {
                    seen.push(p.state().clone());
                    p.commit();
                    seen.push(p.state().clone());
                }
                Ok(Advance::Finished { .. }) => {
                    seen.push(p.state().clone());
                    break;
                }
                Err(e) => panic!("unexpected {e}"),
            }
        }
        // mid-transition states are never persisted; only resting ones round-trip
        let resting = |st: &&ProgressionState| {
            !st.completed_level_ids.contains(&st.current_level_id)
                || st.completed_level_ids.len() == 4
        };
        for st in seen.iter().filter(resting) {
            s.save(st, 4).unwrap();
            assert_eq!(&s.load(4), st);
        }
    }

    #[test]
    fn save_writes_schema() {
        let s = store();
        s.save(&state(3, &[1, 2]), 7).unwrap();
        let kv = s.inner();
        assert_eq!(kv.get("level1Completed").unwrap().as_deref(), Some("true"));
        assert_eq!(kv.get("level3Completed").unwrap(), None);
        assert_eq!(kv.get("currentLevel").unwrap().as_deref(), Some("3"));
        assert_eq!(kv.get("completedLevels").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn clear_then_load_is_initial() {
        let s = store();
        s.save(&state(5, &[1, 2, 3, 4]), 7).unwrap();
        s.clear(7).unwrap();
        assert!(s.inner().is_empty());
        assert_eq!(s.load(7), ProgressionState::default());
    }

    #[test]
    fn all_complete_rests_on_last_level() {
        let s = store();
        s.save(&state(3, &[1, 2, 3]), 3).unwrap();
        assert_eq!(s.load(3), state(3, &[1, 2, 3]));
    }

    #[test]
    fn empty_catalogue_loads_default() {
        assert_eq!(store().load(0), ProgressionState::default());
    }
}
