// Marker tween between two level positions, sampled once per animation frame.
use crate::model::Position;
use tracing::debug;

pub const DEFAULT_TWEEN_MS: f64 = 2000.0;

/// Cubic ease-out: fast start, slow finish.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenPhase {
    Idle,
    /// Lead-in before the marker starts moving.
    Waiting { starts_at: f64 },
    Running { started_at: f64 },
    /// Final frame reached; waiting for the owner to commit and call `finish`.
    Committing,
}

/// What presentation reads every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub is_moving: bool,
    /// Eased progress within the segment being traversed.
    pub partial_progress: f64,
    pub interpolated_position: Position,
}

impl AnimationState {
    fn resting(at: Position) -> Self {
        Self {
            is_moving: false,
            partial_progress: 0.0,
            interpolated_position: at,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Waiting,
    Moving,
    /// Reported exactly once per tween, on the tick that reaches progress 1.
    Completed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationController {
    phase: TweenPhase,
    from: Position,
    to: Position,
    duration_ms: f64,
    lead_in_ms: f64,
    last_sample: f64,
    frame: AnimationState,
}

impl AnimationController {
    pub fn new(rest: Position, duration_ms: f64, lead_in_ms: f64) -> Self {
        Self {
            phase: TweenPhase::Idle,
            from: rest,
            to: rest,
            duration_ms,
            lead_in_ms: lead_in_ms.max(0.0),
            last_sample: f64::NEG_INFINITY,
            frame: AnimationState::resting(rest),
        }
    }

    pub fn frame(&self) -> AnimationState {
        self.frame
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, TweenPhase::Idle)
    }

    pub fn start(&mut self, from: Position, to: Position, now: f64) {
        debug!(?from, ?to, "tween start");
        self.from = from;
        self.to = to;
        self.last_sample = now;
        self.frame = AnimationState::resting(from);
        self.phase = if self.lead_in_ms > 0.0 {
            TweenPhase::Waiting {
                starts_at: now + self.lead_in_ms,
            }
        } else {
            TweenPhase::Running { started_at: now }
        };
    }

    pub fn tick(&mut self, now: f64) -> TickOutcome {
        // elapsed time never runs backwards
        let now = now.max(self.last_sample);
        self.last_sample = now;
        match self.phase {
            TweenPhase::Idle | TweenPhase::Committing => TickOutcome::Idle,
            TweenPhase::Waiting { starts_at } => {
                if now < starts_at {
                    return TickOutcome::Waiting;
                }
                self.phase = TweenPhase::Running {
                    started_at: starts_at,
                };
                self.sample(starts_at, now)
            }
            TweenPhase::Running { started_at } => self.sample(started_at, now),
        }
    }

    fn sample(&mut self, started_at: f64, now: f64) -> TickOutcome {
        let elapsed = (now - started_at).max(0.0);
        let progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            (elapsed / self.duration_ms).min(1.0)
        };
        let eased = ease_out_cubic(progress);
        self.frame = AnimationState {
            is_moving: true,
            partial_progress: eased,
            interpolated_position: self.from.lerp(self.to, eased),
        };
        if progress >= 1.0 {
            self.phase = TweenPhase::Committing;
            TickOutcome::Completed
        } else {
            TickOutcome::Moving
        }
    }

    /// Called by the owner after committing a completed tween.
    pub fn finish(&mut self) {
        if matches!(self.phase, TweenPhase::Committing) {
            debug!(to = ?self.to, "tween finished");
            self.phase = TweenPhase::Idle;
            self.frame = AnimationState::resting(self.to);
        }
    }

    /// Drops any tween in flight and parks the marker at `rest`.
    pub fn cancel(&mut self, rest: Position) {
        if self.is_active() {
            debug!("tween cancelled");
        }
        self.phase = TweenPhase::Idle;
        self.from = rest;
        self.to = rest;
        self.frame = AnimationState::resting(rest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Position = Position::new(15.0, 85.0);
    const B: Position = Position::new(50.0, 65.0);

    #[test]
    fn easing_endpoints_and_shape() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        assert_eq!(ease_out_cubic(3.0), 1.0);
    }

    #[test]
    fn runs_to_completion_once() {
        let mut c = AnimationController::new(A, 2000.0, 0.0);
        c.start(A, B, 0.0);
        assert_eq!(c.tick(1000.0), TickOutcome::Moving);
        let mid = c.frame();
        assert!(mid.is_moving);
        assert!((mid.partial_progress - 0.875).abs() < 1e-12);
        assert_eq!(mid.interpolated_position, A.lerp(B, 0.875));
        assert_eq!(c.tick(2000.0), TickOutcome::Completed);
        assert_eq!(c.frame().partial_progress, 1.0);
        assert_eq!(c.frame().interpolated_position, B);
        // no second completion before or after finish
        assert_eq!(c.tick(2500.0), TickOutcome::Idle);
        c.finish();
        assert_eq!(c.tick(3000.0), TickOutcome::Idle);
        let rest = c.frame();
        assert!(!rest.is_moving);
        assert_eq!(rest.partial_progress, 0.0);
        assert_eq!(rest.interpolated_position, B);
    }

    #[test]
    fn lead_in_delays_movement() {
        let mut c = AnimationController::new(A, 2000.0, 500.0);
        c.start(A, B, 100.0);
        assert_eq!(c.tick(300.0), TickOutcome::Waiting);
        assert!(!c.frame().is_moving);
        assert_eq!(c.tick(600.0), TickOutcome::Moving);
        assert_eq!(c.frame().partial_progress, 0.0);
        assert_eq!(c.tick(2599.0), TickOutcome::Moving);
        assert_eq!(c.tick(2600.0), TickOutcome::Completed);
    }

    #[test]
    fn late_first_frame_can_complete_directly() {
        let mut c = AnimationController::new(A, 2000.0, 500.0);
        c.start(A, B, 0.0);
        assert_eq!(c.tick(10_000.0), TickOutcome::Completed);
    }

    #[test]
    fn progress_is_monotonic_even_if_clock_jitters() {
        let mut c = AnimationController::new(A, 2000.0, 0.0);
        c.start(A, B, 0.0);
        let mut last = 0.0;
        for now in [16.0, 40.0, 30.0, 900.0, 850.0, 1999.0] {
            c.tick(now);
            let p = c.frame().partial_progress;
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn cancel_parks_marker() {
        let mut c = AnimationController::new(A, 2000.0, 0.0);
        c.start(A, B, 0.0);
        c.tick(500.0);
        c.cancel(A);
        assert!(!c.is_active());
        assert_eq!(c.tick(5000.0), TickOutcome::Idle);
        assert_eq!(c.frame().interpolated_position, A);
    }

    #[test]
    fn zero_duration_completes_on_first_tick() {
        let mut c = AnimationController::new(A, 0.0, 0.0);
        c.start(A, B, 0.0);
        assert_eq!(c.tick(0.0), TickOutcome::Completed);
    }
}
