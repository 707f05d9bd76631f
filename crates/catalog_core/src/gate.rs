use std::time::{Duration, Instant};

/// Holds back a changing value until it has been stable for `delay`.
///
/// Time is passed in by the caller, so the gate has no clock or timer of its
/// own. Every `input` restarts the wait; `poll` releases the latest value once
/// the wait has elapsed, and only once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuiescenceGate<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> QuiescenceGate<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the wait from `at`.
    pub fn input(&mut self, value: T, at: Instant) {
        self.pending = Some((value, at));
    }

    /// Releases the pending value if it has been stable for the full delay.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = match &self.pending {
            Some((_, at)) => now.saturating_duration_since(*at) >= self.delay,
            None => false,
        };
        if ready {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Instant at which the pending value becomes releasable.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Drops the pending value without releasing it.
    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// Stream form of the gate: maps timestamped inputs (in ascending time order)
/// to the values that would be released, stamped with their release instant.
pub fn quiesce<T>(inputs: impl IntoIterator<Item = (Instant, T)>, delay: Duration) -> Vec<(Instant, T)> {
    let mut gate = QuiescenceGate::new(delay);
    let mut released = Vec::new();
    for (at, value) in inputs {
        if let Some(deadline) = gate.deadline() {
            if deadline <= at {
                if let Some(value) = gate.poll(deadline) {
                    released.push((deadline, value));
                }
            }
        }
        gate.input(value, at);
    }
    if let Some(deadline) = gate.deadline() {
        if let Some(value) = gate.poll(deadline) {
            released.push((deadline, value));
        }
    }
    released
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn holds_value_until_delay_elapsed() {
        let t0 = Instant::now();
        let mut gate = QuiescenceGate::new(ms(200));
        gate.input("a", t0);

        assert_eq!(gate.poll(t0 + ms(199)), None);
        assert_eq!(gate.poll(t0 + ms(200)), Some("a"));
        assert_eq!(gate.poll(t0 + ms(500)), None);
        assert!(!gate.is_pending());
    }

    #[test]
    fn new_input_restarts_the_wait() {
        let t0 = Instant::now();
        let mut gate = QuiescenceGate::new(ms(200));
        gate.input("a", t0);
        gate.input("b", t0 + ms(150));

        assert_eq!(gate.poll(t0 + ms(250)), None);
        assert_eq!(gate.poll(t0 + ms(350)), Some("b"));
    }

    #[test]
    fn burst_collapses_to_last_value() {
        let t0 = Instant::now();
        let inputs = (0..5u64).map(|i| (t0 + ms(i * 100), i));

        let released = quiesce(inputs, ms(200));

        assert_eq!(released, vec![(t0 + ms(600), 4)]);
    }

    #[test]
    fn separated_inputs_each_release() {
        let t0 = Instant::now();
        let inputs = vec![(t0, "a"), (t0 + ms(300), "b"), (t0 + ms(350), "c")];

        let released = quiesce(inputs, ms(200));

        assert_eq!(released, vec![(t0 + ms(200), "a"), (t0 + ms(550), "c")]);
    }

    #[test]
    fn clear_discards_pending() {
        let t0 = Instant::now();
        let mut gate = QuiescenceGate::new(ms(10));
        gate.input(1, t0);
        gate.clear();
        assert_eq!(gate.poll(t0 + ms(50)), None);
        assert_eq!(gate.deadline(), None);
    }
}
