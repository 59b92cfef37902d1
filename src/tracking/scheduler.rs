//! Decides when the renderer should be sampled again.
//!
//! The renderer never reports motion, so every motion signal (a gesture, an
//! animated camera command, an explicit refresh) arms a tick, and each tick
//! that still sees the view moving arms the next one. Once a tick observes the
//! same corners twice in a row the chain ends.
//!
//! Armed ticks cannot be cancelled. A stale tick simply samples, finds nothing
//! new and lets the chain end, costing one redundant sample.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    /// No tick is armed
    #[default]
    Idle,
    /// At least one tick is armed or running
    Polling,
}

/// The `Idle`/`Polling` state machine.
///
/// The scheduler never touches a timer itself: each method tells the caller
/// whether to arm a tick and after how long. It counts the ticks that are
/// armed but have not fired yet so that overlapping motion signals share one
/// polling chain instead of each spawning its own.
#[derive(Debug, Clone)]
pub struct DebounceScheduler {
    phase: PollPhase,
    outstanding: usize,
    step: Duration,
}

impl DebounceScheduler {
    pub fn new(step: Duration) -> Self {
        Self {
            phase: PollPhase::Idle,
            outstanding: 0,
            step,
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Ticks armed but not yet fired
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Something may have started moving the view. The caller arms one tick
    /// after its chosen initial delay: zero for gestures and refreshes, half
    /// the ease duration after an animated command so the first sample does
    /// not run before the animation is visible.
    pub fn motion_started(&mut self) {
        self.phase = PollPhase::Polling;
        self.outstanding += 1;
    }

    /// An armed tick is about to sample
    pub fn tick_fired(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    /// Feeds back whether the sample saw motion. Returns the delay after
    /// which the caller must arm the next tick, if any.
    pub fn after_sample(&mut self, moved: bool) -> Option<Duration> {
        if moved {
            self.phase = PollPhase::Polling;
            if self.outstanding == 0 {
                self.outstanding += 1;
                return Some(self.step);
            }
            // A tick is already armed and will carry the chain on
            return None;
        }

        if self.outstanding == 0 {
            self.phase = PollPhase::Idle;
        }
        None
    }
}

impl Default for DebounceScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::constants::POLL_STEP_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(250);

    #[test]
    fn test_starts_idle() {
        let mut scheduler = DebounceScheduler::default();
        assert_eq!(scheduler.phase(), PollPhase::Idle);
        assert_eq!(scheduler.outstanding(), 0);
        // The default step is the reference poll interval
        assert_eq!(scheduler.after_sample(true), Some(STEP));
    }

    #[test]
    fn test_polls_until_settled() {
        let mut scheduler = DebounceScheduler::new(STEP);
        scheduler.motion_started();
        assert_eq!(scheduler.phase(), PollPhase::Polling);

        // Moving: keep ticking at the fixed step
        scheduler.tick_fired();
        assert_eq!(scheduler.after_sample(true), Some(STEP));
        scheduler.tick_fired();
        assert_eq!(scheduler.after_sample(true), Some(STEP));
        assert_eq!(scheduler.phase(), PollPhase::Polling);

        // Settled: no further tick
        scheduler.tick_fired();
        assert_eq!(scheduler.after_sample(false), None);
        assert_eq!(scheduler.phase(), PollPhase::Idle);
        assert_eq!(scheduler.outstanding(), 0);
    }

    #[test]
    fn test_overlapping_signals_share_one_chain() {
        let mut scheduler = DebounceScheduler::new(STEP);
        // Gesture sample runs immediately while an animated command's tick is armed
        scheduler.motion_started();
        scheduler.motion_started();
        scheduler.tick_fired();
        assert_eq!(scheduler.after_sample(true), None);
        assert_eq!(scheduler.outstanding(), 1);

        scheduler.tick_fired();
        assert_eq!(scheduler.after_sample(true), Some(STEP));
        assert_eq!(scheduler.outstanding(), 1);
    }

    #[test]
    fn test_early_settle_waits_for_armed_tick() {
        let mut scheduler = DebounceScheduler::new(STEP);
        scheduler.motion_started();
        scheduler.motion_started();

        // The first tick sees no motion yet, but another one is still armed
        scheduler.tick_fired();
        assert_eq!(scheduler.after_sample(false), None);
        assert_eq!(scheduler.phase(), PollPhase::Polling);

        scheduler.tick_fired();
        assert_eq!(scheduler.after_sample(false), None);
        assert_eq!(scheduler.phase(), PollPhase::Idle);
    }

    #[test]
    fn test_stale_tick_is_harmless() {
        let mut scheduler = DebounceScheduler::new(STEP);
        scheduler.tick_fired();
        assert_eq!(scheduler.outstanding(), 0);
        assert_eq!(scheduler.after_sample(false), None);
        assert_eq!(scheduler.phase(), PollPhase::Idle);
    }
}
