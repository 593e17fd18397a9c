//! Linear progression through the level catalogue.
//!
//! The whole macro-state is `(current_level_id, completed_level_ids)`; per-level
//! status is recomputed from those two on every query.

use crate::model::{LevelStatus, derive_status};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// 1..=N; stays on N after the last level is completed.
    pub current_level_id: u32,
    pub completed_level_ids: BTreeSet<u32>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            current_level_id: 1,
            completed_level_ids: BTreeSet::new(),
        }
    }
}

/// Accepted `advance()` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The marker has to travel from `from` to `to`; `commit()` finishes the move.
    Move { from: u32, to: u32 },
    /// The last level was completed; nothing moves.
    Finished { level: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejected {
    #[error("every level is already complete")]
    PastEnd,
    #[error("a level transition is already in flight")]
    InFlight,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Progression {
    state: ProgressionState,
    total: u32,
    transitioning: bool,
}

impl Progression {
    pub fn new(total: u32, state: ProgressionState) -> Self {
        Self {
            state,
            total,
            transitioning: false,
        }
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn current_level_id(&self) -> u32 {
        self.state.current_level_id
    }

    pub fn completed(&self) -> &BTreeSet<u32> {
        &self.state.completed_level_ids
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn is_completed(&self, id: u32) -> bool {
        self.state.completed_level_ids.contains(&id)
    }

    /// True once every level is in the completed set. An empty catalogue counts as
    /// complete.
    pub fn is_all_complete(&self) -> bool {
        (1..=self.total).all(|id| self.is_completed(id))
    }

    pub fn status(&self, id: u32) -> LevelStatus {
        derive_status(
            id,
            self.state.current_level_id,
            &self.state.completed_level_ids,
        )
    }

    pub fn statuses(&self) -> Vec<(u32, LevelStatus)> {
        (1..=self.total).map(|id| (id, self.status(id))).collect()
    }

    /// Completes the current level.
    ///
    /// The completed set is updated immediately; for any level but the last the
    /// caller is expected to animate the move and then call [`Progression::commit`].
    pub fn advance(&mut self) -> Result<Advance, Rejected> {
        if self.transitioning {
            debug!("advance ignored: transition in flight");
            return Err(Rejected::InFlight);
        }
        let current = self.state.current_level_id;
        if current > self.total || (current == self.total && self.is_completed(current)) {
            debug!(current, "advance ignored: nothing left to complete");
            return Err(Rejected::PastEnd);
        }
        self.state.completed_level_ids.insert(current);
        info!(level = current, "level completed");
        if current < self.total {
            self.transitioning = true;
            Ok(Advance::Move {
                from: current,
                to: current + 1,
            })
        } else {
            info!("all levels complete");
            Ok(Advance::Finished { level: current })
        }
    }

    /// Finishes an in-flight move. This is the only place the current level moves
    /// forward. Returns the newly current level.
    pub fn commit(&mut self) -> Option<u32> {
        if !self.transitioning {
            return None;
        }
        self.transitioning = false;
        self.state.current_level_id += 1;
        info!(level = self.state.current_level_id, "level unlocked");
        Some(self.state.current_level_id)
    }

    pub fn cancel_transition(&mut self) {
        if self.transitioning {
            debug!("transition cancelled");
        }
        self.transitioning = false;
    }

    /// Returns the level to navigate to, if `id` may be entered.
    pub fn select_level(&self, id: u32) -> Option<u32> {
        let selectable = id >= 1
            && id <= self.total
            && id <= self.state.current_level_id
            && !self.is_completed(id);
        if selectable {
            info!(level = id, "level selected");
            Some(id)
        } else {
            debug!(level = id, "selection ignored");
            None
        }
    }

    pub fn reset(&mut self) {
        self.cancel_transition();
        self.state = ProgressionState::default();
        info!("progression reset");
    }
}
