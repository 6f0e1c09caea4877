//! Single-slot delayed transitions measured on the session clock.
use serde::Serialize;
use std::time::Duration;

/// Cancellable handle for one pending transition.
///
/// Arming replaces whatever was pending; cancelling an idle slot is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimerSlot {
    due_at: Option<Duration>,
}

impl TimerSlot {
    /// Schedule the transition `delay` after `now`, returning its due time.
    pub fn arm(&mut self, now: Duration, delay: Duration) -> Duration {
        let due = now.saturating_add(delay);
        self.due_at = Some(due);
        due
    }

    /// Drop the pending transition. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.due_at.take().is_some()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    #[must_use]
    pub const fn due_at(&self) -> Option<Duration> {
        self.due_at
    }

    /// Consume the pending transition if it is due at `now`.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.due_at {
            Some(due) if now >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_exactly_at_due_time() {
        let mut slot = TimerSlot::default();
        let start = Duration::from_millis(500);
        assert_eq!(slot.arm(start, Duration::from_millis(3_000)), Duration::from_millis(3_500));
        assert!(!slot.fire_if_due(Duration::from_millis(3_499)));
        assert!(slot.fire_if_due(Duration::from_millis(3_500)));
        assert!(!slot.is_pending());
        assert!(!slot.fire_if_due(Duration::from_millis(9_000)));
    }

    #[test]
    fn rearm_replaces_and_cancel_is_idempotent() {
        let mut slot = TimerSlot::default();
        slot.arm(Duration::ZERO, Duration::from_millis(100));
        slot.arm(Duration::from_millis(50), Duration::from_millis(100));
        assert_eq!(slot.due_at(), Some(Duration::from_millis(150)));
        assert!(slot.cancel());
        assert!(!slot.cancel());
        assert!(!slot.fire_if_due(Duration::from_secs(60)));
    }
}
