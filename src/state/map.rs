// Level map state: progression, marker tween and the transient flags presentation
// reacts to. Driven by user commands and by one tick per animation frame.
use std::rc::Rc;
use yew::Reducible;

use super::animation::{AnimationController, AnimationState, TickOutcome};
use crate::config::{MapConfig, Timing};
use crate::geometry::{PathDescriptor, build_path_with, progress_fraction};
use crate::model::{Level, LevelStatus, Position, positions};
use crate::persistence::{KeyValueStore, ProgressStore, StoreError};
use crate::progression::{Advance, Progression, ProgressionState};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnlockFlash {
    pub level_id: u32,
    pub until: f64,
}

/// Hint for the level the marker is heading to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuideHint {
    pub level_id: u32,
}

/// Audio cue for an external player; never raised while muted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    LevelComplete,
    LevelUnlock,
}

/// Storage write owed after a state change. The host applies it and then
/// dispatches [`MapAction::PersistDone`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistIntent {
    Save(ProgressionState),
    Clear,
}

impl PersistIntent {
    pub fn apply<S: KeyValueStore>(
        &self,
        store: &ProgressStore<S>,
        total: u32,
    ) -> Result<(), StoreError> {
        match self {
            PersistIntent::Save(state) => store.save(state, total),
            PersistIntent::Clear => store.clear(total),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapState {
    pub levels: Rc<Vec<Level>>,
    /// Rebuilt only when the level set is replaced.
    pub path: Rc<PathDescriptor>,
    pub progression: Progression,
    pub animation: AnimationController,
    pub timing: Timing,
    pub unlock_flash: Option<UnlockFlash>,
    pub guide: Option<GuideHint>,
    pub sound_cue: Option<SoundCue>,
    pub muted: bool,
    pub show_about: bool,
    /// Latest pending write; a newer intent supersedes an unapplied one.
    pub persist: Option<PersistIntent>,
}

#[derive(Clone, Debug)]
pub enum MapAction {
    Advance { now: f64 },
    Tick { now: f64 },
    Reset,
    ToggleAbout,
    SetAbout(bool),
    ToggleMute,
    DismissGuide,
    ClearSoundCue,
    PersistDone,
}

impl MapState {
    pub fn new(
        levels: Vec<Level>,
        config: &MapConfig,
        progress: ProgressionState,
        muted: bool,
    ) -> Self {
        let path = build_path_with(&positions(&levels), &config.path);
        debug!(
            segments = path.segment_count(),
            straight = path.segments.iter().filter(|s| s.is_straight()).count(),
            d = %path.to_svg_path(),
            "connector built"
        );
        let progression = Progression::new(levels.len() as u32, progress);
        let rest = rest_position(&levels, &progression);
        Self {
            levels: Rc::new(levels),
            path: Rc::new(path),
            progression,
            animation: AnimationController::new(
                rest,
                config.timing.tween_ms,
                config.timing.lead_in_ms,
            ),
            timing: config.timing,
            unlock_flash: None,
            guide: None,
            sound_cue: None,
            muted,
            show_about: false,
            persist: None,
        }
    }

    pub fn level(&self, id: u32) -> Option<&Level> {
        id.checked_sub(1)
            .and_then(|idx| self.levels.get(idx as usize))
    }

    pub fn status(&self, id: u32) -> LevelStatus {
        self.progression.status(id)
    }

    pub fn frame(&self) -> AnimationState {
        self.animation.frame()
    }

    pub fn marker_position(&self) -> Position {
        self.frame().interpolated_position
    }

    pub fn is_moving(&self) -> bool {
        self.frame().is_moving
    }

    /// Share of the connector to draw as traversed.
    pub fn progress_fraction(&self) -> f64 {
        let frame = self.frame();
        progress_fraction(
            self.progression.current_level_id(),
            frame.partial_progress,
            frame.is_moving,
            self.levels.len(),
        )
    }

    pub fn is_flashing(&self, id: u32) -> bool {
        self.unlock_flash.is_some_and(|f| f.level_id == id)
    }

    /// Label for the advance button.
    pub fn advance_label(&self) -> &'static str {
        let p = &self.progression;
        if p.current_level_id() == p.total() && p.is_completed(p.total()) {
            "All Complete!"
        } else {
            "Next Level"
        }
    }

    pub fn can_advance(&self) -> bool {
        let p = &self.progression;
        !p.is_transitioning() && p.current_level_id() <= p.total() && !p.is_all_complete()
    }

    fn cue(&mut self, cue: SoundCue) {
        if !self.muted {
            self.sound_cue = Some(cue);
        }
    }

    fn save_progress(&mut self) {
        self.persist = Some(PersistIntent::Save(self.progression.state().clone()));
    }

    fn advance(&mut self, now: f64) -> bool {
        let outcome = self.progression.advance();
        if outcome.is_ok() {
            // completion flags are written right away; currentLevel only moves on commit
            self.save_progress();
        }
        match outcome {
            Ok(Advance::Move { from, to }) => {
                let (Some(a), Some(b)) = (self.level(from), self.level(to)) else {
                    self.progression.cancel_transition();
                    return true;
                };
                let (a, b) = (a.position, b.position);
                self.animation.start(a, b, now);
                self.guide = Some(GuideHint { level_id: to });
                self.cue(SoundCue::LevelComplete);
                true
            }
            Ok(Advance::Finished { .. }) => {
                self.cue(SoundCue::LevelComplete);
                true
            }
            Err(reason) => {
                debug!(%reason, "advance rejected");
                false
            }
        }
    }

    fn tick(&mut self, now: f64) -> bool {
        let mut changed = false;
        if self.unlock_flash.is_some_and(|f| now >= f.until) {
            self.unlock_flash = None;
            changed = true;
        }
        match self.animation.tick(now) {
            TickOutcome::Idle | TickOutcome::Waiting => {}
            TickOutcome::Moving => changed = true,
            TickOutcome::Completed => {
                if let Some(level_id) = self.progression.commit() {
                    self.save_progress();
                    self.unlock_flash = Some(UnlockFlash {
                        level_id,
                        until: now + self.timing.unlock_flash_ms,
                    });
                    self.cue(SoundCue::LevelUnlock);
                }
                self.guide = None;
                self.animation.finish();
                changed = true;
            }
        }
        changed
    }

    fn reset(&mut self) {
        self.progression.reset();
        let rest = rest_position(&self.levels, &self.progression);
        self.animation.cancel(rest);
        self.unlock_flash = None;
        self.guide = None;
        self.sound_cue = None;
        self.persist = Some(PersistIntent::Clear);
    }
}

/// Where the marker sits when nothing moves: on the current level, or on the last
/// level once the current id runs past the end.
fn rest_position(levels: &[Level], progression: &Progression) -> Position {
    let idx = progression.current_level_id().saturating_sub(1) as usize;
    levels
        .get(idx)
        .or_else(|| levels.last())
        .map(|l| l.position)
        .unwrap_or_default()
}

impl Reducible for MapState {
    type Action = MapAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut new = (*self).clone();
        let changed = match action {
            MapAction::Advance { now } => new.advance(now),
            MapAction::Tick { now } => new.tick(now),
            MapAction::Reset => {
                new.reset();
                true
            }
            MapAction::ToggleAbout => {
                new.show_about = !new.show_about;
                true
            }
            MapAction::SetAbout(open) => {
                new.show_about = open;
                open != self.show_about
            }
            MapAction::ToggleMute => {
                new.muted = !new.muted;
                if new.muted {
                    new.sound_cue = None;
                }
                true
            }
            MapAction::DismissGuide => new.guide.take().is_some(),
            MapAction::ClearSoundCue => new.sound_cue.take().is_some(),
            MapAction::PersistDone => new.persist.take().is_some(),
        };
        // returning the same Rc skips a re-render on idle frames
        if changed { Rc::new(new) } else { self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::zigzag_levels;
    use crate::persistence::MemoryStore;

    fn config() -> MapConfig {
        MapConfig::default()
    }

    fn fresh() -> Rc<MapState> {
        Rc::new(MapState::new(
            zigzag_levels(),
            &config(),
            ProgressionState::default(),
            false,
        ))
    }

    /// Advances and ticks the tween to completion, returning the time afterwards.
    fn advance_fully(mut s: Rc<MapState>, mut now: f64) -> (Rc<MapState>, f64) {
        s = s.reduce(MapAction::Advance { now });
        while s.animation.is_active() {
            now += 16.0;
            s = s.reduce(MapAction::Tick { now });
        }
        (s, now)
    }

    #[test]
    fn advance_moves_marker_and_commits_once() {
        let s = fresh();
        let start = s.marker_position();
        let (s, _) = advance_fully(s, 0.0);
        assert_eq!(s.progression.current_level_id(), 2);
        assert!(s.progression.is_completed(1));
        assert_eq!(s.marker_position(), s.levels[1].position);
        assert_ne!(s.marker_position(), start);
        assert!(!s.is_moving());
        assert_eq!(s.sound_cue, Some(SoundCue::LevelUnlock));
        assert!(s.is_flashing(2));
        assert_eq!(s.guide, None);
    }

    #[test]
    fn completion_shows_before_movement() {
        let s = fresh().reduce(MapAction::Advance { now: 0.0 });
        assert_eq!(s.status(1), LevelStatus::Completed);
        assert_eq!(s.progression.current_level_id(), 1);
        assert_eq!(s.guide, Some(GuideHint { level_id: 2 }));
        assert_eq!(s.sound_cue, Some(SoundCue::LevelComplete));
        // lead-in: not moving yet
        let s = s.reduce(MapAction::Tick { now: 100.0 });
        assert!(!s.is_moving());
    }

    #[test]
    fn advance_during_tween_is_ignored() {
        let s = fresh().reduce(MapAction::Advance { now: 0.0 });
        let s = s.reduce(MapAction::Tick { now: 900.0 });
        let again = s.clone().reduce(MapAction::Advance { now: 950.0 });
        assert!(Rc::ptr_eq(&s, &again));
        assert_eq!(again.progression.completed().len(), 1);
    }

    #[test]
    fn progress_fraction_is_monotonic_over_a_tween() {
        let n = 6.0;
        let mut s = fresh();
        for _ in 0..2 {
            s = advance_fully(s, 0.0).0;
        }
        let k = 2.0;
        assert!((s.progress_fraction() - k / n).abs() < 1e-12);
        s = s.reduce(MapAction::Advance { now: 10_000.0 });
        let mut last = s.progress_fraction();
        let mut now = 10_000.0;
        while s.animation.is_active() {
            now += 16.0;
            s = s.reduce(MapAction::Tick { now });
            let f = s.progress_fraction();
            assert!(f + 1e-12 >= last, "{f} < {last}");
            last = f;
        }
        assert!((s.progress_fraction() - (k + 1.0) / n).abs() < 1e-12);
    }

    #[test]
    fn last_level_completes_in_place() {
        let progress = ProgressionState {
            current_level_id: 7,
            completed_level_ids: (1..=6).collect(),
        };
        let s = Rc::new(MapState::new(zigzag_levels(), &config(), progress, false));
        let before = s.marker_position();
        let s = s.reduce(MapAction::Advance { now: 0.0 });
        assert!(s.progression.is_all_complete());
        assert!(!s.animation.is_active());
        assert_eq!(s.marker_position(), before);
        assert_eq!(s.advance_label(), "All Complete!");
        assert!(!s.can_advance());
        assert_eq!(s.progress_fraction(), 1.0);
    }

    #[test]
    fn unlock_flash_clears_after_delay() {
        let (s, now) = advance_fully(fresh(), 0.0);
        assert!(s.is_flashing(2));
        let s = s.reduce(MapAction::Tick { now: now + 100.0 });
        assert!(s.is_flashing(2));
        let s = s.reduce(MapAction::Tick { now: now + 600.0 });
        assert!(!s.is_flashing(2));
    }

    #[test]
    fn reset_cancels_tween_and_requests_clear() {
        let s = fresh().reduce(MapAction::Advance { now: 0.0 });
        let s = s.reduce(MapAction::Tick { now: 1200.0 });
        assert!(s.is_moving());
        let s = s.reduce(MapAction::Reset);
        assert_eq!(s.persist, Some(PersistIntent::Clear));
        assert!(!s.is_moving());
        assert_eq!(s.progression.state(), &ProgressionState::default());
        assert_eq!(s.marker_position(), s.levels[0].position);
        // a stale frame must not commit anything
        let s = s.reduce(MapAction::Tick { now: 5000.0 });
        assert_eq!(s.progression.current_level_id(), 1);
    }

    #[test]
    fn muted_state_raises_no_cues() {
        let s = Rc::new(MapState::new(
            zigzag_levels(),
            &config(),
            ProgressionState::default(),
            true,
        ));
        let (s, _) = advance_fully(s, 0.0);
        assert_eq!(s.sound_cue, None);
    }

    #[test]
    fn idle_ticks_do_not_rerender() {
        let s = fresh();
        let next = s.clone().reduce(MapAction::Tick { now: 16.0 });
        assert!(Rc::ptr_eq(&s, &next));
    }

    #[test]
    fn degenerate_map_is_always_complete() {
        let s = Rc::new(MapState::new(
            Vec::new(),
            &config(),
            ProgressionState::default(),
            false,
        ));
        assert!(s.path.is_empty());
        assert!(s.progression.is_all_complete());
        let after = s.clone().reduce(MapAction::Advance { now: 0.0 });
        assert!(Rc::ptr_eq(&s, &after));
        assert_eq!(s.progress_fraction(), 0.0);
    }

    /// Applies the pending write the way the app does after each render.
    fn flush(s: Rc<MapState>, store: &ProgressStore<MemoryStore>) -> Rc<MapState> {
        let Some(intent) = s.persist.clone() else {
            return s;
        };
        intent.apply(store, s.progression.total()).unwrap();
        s.reduce(MapAction::PersistDone)
    }

    fn advance_persisted(
        mut s: Rc<MapState>,
        store: &ProgressStore<MemoryStore>,
        mut now: f64,
    ) -> (Rc<MapState>, f64) {
        s = flush(s.reduce(MapAction::Advance { now }), store);
        while s.animation.is_active() {
            now += 16.0;
            s = flush(s.reduce(MapAction::Tick { now }), store);
        }
        (s, now)
    }

    fn stored_current(store: &ProgressStore<MemoryStore>) -> Option<String> {
        store.inner().get("currentLevel").unwrap()
    }

    #[test]
    fn seven_level_session() {
        let store = ProgressStore::new(MemoryStore::new(), config().keys);
        let loaded = store.load(7);
        assert_eq!(loaded.current_level_id, 1);

        let mut s = Rc::new(MapState::new(zigzag_levels(), &config(), loaded, false));
        assert_eq!(s.persist, None);
        let mut now = 0.0;
        for _ in 0..5 {
            let (next, t) = advance_persisted(s, &store, now);
            s = next;
            now = t;
        }
        assert_eq!(s.progression.current_level_id(), 6);
        let expected: Vec<u32> = (1..=5).collect();
        assert_eq!(
            s.progression.completed().iter().copied().collect::<Vec<_>>(),
            expected
        );
        assert_eq!(store.load(7), s.progression.state().clone());

        assert_eq!(s.progression.select_level(3), None);
        assert_eq!(s.progression.select_level(6), Some(6));
        assert_eq!(config().level_url(6), "level6.html");

        let s = flush(s.reduce(MapAction::Reset), &store);
        assert!(store.inner().is_empty());
        assert_eq!(s.progression.current_level_id(), 1);
        assert_eq!(store.load(7), ProgressionState::default());
    }

    #[test]
    fn current_level_is_written_only_after_commit() {
        let store = ProgressStore::new(MemoryStore::new(), config().keys);
        let s = flush(fresh().reduce(MapAction::Advance { now: 0.0 }), &store);
        assert_eq!(
            store.inner().get("level1Completed").unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(stored_current(&store).as_deref(), Some("1"));

        let s = flush(s.reduce(MapAction::Tick { now: 1500.0 }), &store);
        assert!(s.is_moving());
        assert_eq!(stored_current(&store).as_deref(), Some("1"));

        let s = s.reduce(MapAction::Tick { now: 2500.0 });
        assert_eq!(s.progression.current_level_id(), 2);
        assert_eq!(
            s.persist,
            Some(PersistIntent::Save(s.progression.state().clone()))
        );
        let s = flush(s, &store);
        assert_eq!(s.persist, None);
        assert_eq!(stored_current(&store).as_deref(), Some("2"));
        assert_eq!(store.load(7), s.progression.state().clone());
    }

    #[test]
    fn reset_mid_tween_empties_the_store() {
        let store = ProgressStore::new(MemoryStore::new(), config().keys);
        let (s, now) = advance_persisted(fresh(), &store, 0.0);
        let s = flush(s.reduce(MapAction::Advance { now }), &store);
        let s = flush(s.reduce(MapAction::Tick { now: now + 1200.0 }), &store);
        assert!(s.is_moving());
        assert!(!store.inner().is_empty());

        let s = flush(s.reduce(MapAction::Reset), &store);
        assert!(store.inner().is_empty());
        // the cancelled tween never commits or writes again
        let s = flush(s.reduce(MapAction::Tick { now: now + 5000.0 }), &store);
        assert_eq!(s.persist, None);
        assert!(store.inner().is_empty());
    }

    #[test]
    fn rejected_advance_owes_no_write() {
        let s = fresh().reduce(MapAction::Advance { now: 0.0 });
        let s = s.reduce(MapAction::PersistDone);
        let again = s.clone().reduce(MapAction::Advance { now: 10.0 });
        assert!(Rc::ptr_eq(&s, &again));
        assert_eq!(again.persist, None);
    }

    #[test]
    fn toggles() {
        let s = fresh();
        let s = s.reduce(MapAction::ToggleAbout);
        assert!(s.show_about);
        let same = s.clone().reduce(MapAction::SetAbout(true));
        assert!(Rc::ptr_eq(&s, &same));
        let s = s.reduce(MapAction::SetAbout(false));
        assert!(!s.show_about);
        let s = s.reduce(MapAction::ToggleMute);
        assert!(s.muted);
    }
}
