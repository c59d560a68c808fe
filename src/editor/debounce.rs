/// Trailing-edge debouncer driven by caller-supplied timestamps.
///
/// Every [`touch`](Self::touch) restarts the quiet period; [`take_ready`]
/// fires once the period has elapsed since the last touch.
///
/// [`take_ready`]: Self::take_ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    delay_ms: u64,
    pending_since: Option<u64>,
}

impl Debouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending_since: None,
        }
    }

    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Record an event and restart the quiet period.
    pub const fn touch(&mut self, now_ms: u64) {
        self.pending_since = Some(now_ms);
    }

    /// Returns `true` (and clears the pending event) once the quiet period
    /// has elapsed.
    pub fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(since) = self.pending_since else {
            return false;
        };
        if now_ms.saturating_sub(since) >= self.delay_ms {
            self.pending_since = None;
            true
        } else {
            false
        }
    }

    pub const fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Drop the pending event. Returns whether one was pending.
    pub const fn cancel(&mut self) -> bool {
        self.pending_since.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_before_delay() {
        let mut debouncer = Debouncer::new(500);
        debouncer.touch(1_000);
        assert!(!debouncer.take_ready(1_499));
        assert!(debouncer.is_pending());
    }

    #[test]
    fn test_ready_at_delay_fires_once() {
        let mut debouncer = Debouncer::new(500);
        debouncer.touch(1_000);
        assert!(debouncer.take_ready(1_500));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.take_ready(3_000));
    }

    #[test]
    fn test_touch_restarts_quiet_period() {
        let mut debouncer = Debouncer::new(500);
        debouncer.touch(1_000);
        debouncer.touch(1_400);
        assert!(!debouncer.take_ready(1_600));
        assert!(debouncer.take_ready(1_900));
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut debouncer = Debouncer::new(100);
        assert!(!debouncer.cancel());
        debouncer.touch(0);
        assert!(debouncer.cancel());
        assert!(!debouncer.take_ready(1_000));
    }

    #[test]
    fn test_clock_going_backwards_does_not_fire() {
        let mut debouncer = Debouncer::new(100);
        debouncer.touch(1_000);
        assert!(!debouncer.take_ready(10));
    }
}
