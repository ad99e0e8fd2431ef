//! Per-family sampling throttle.
//!
//! Some kernel subsystems refresh their counters on a fixed internal
//! schedule (the load average is recomputed every 5 seconds on macOS).
//! Polling faster than that reports the same value as if it were fresh.
//! `CadenceGate` keeps a countdown of the time remaining until the next
//! sample is due and is consulted once per tick.

use std::time::Duration;

/// Countdown gate for one metric family.
///
/// A fresh gate is always due, so the first tick samples every family.
#[derive(Debug, Clone, Default)]
pub struct CadenceGate {
    remaining: Duration,
}

impl CadenceGate {
    /// Creates a gate that is due on the next tick.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the family should be sampled on this tick.
    ///
    /// When not due, `dt` is deducted from the remaining time. When due,
    /// the remaining time is left untouched; the caller is expected to call
    /// [`reset`](Self::reset) after a successful sample.
    pub fn should_sample(&mut self, dt: Duration) -> bool {
        if self.remaining <= dt {
            true
        } else {
            self.remaining -= dt;
            false
        }
    }

    /// Restarts the countdown at `period` (not zero, which keeps phase with
    /// the previous sample instead of snapping to a tick boundary).
    pub fn reset(&mut self, period: Duration) {
        self.remaining = period;
    }

    /// Time remaining until the next sample is due.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }
}

/// Effective update period for a family: the configured interval, but never
/// shorter than the interval at which the underlying counter changes.
pub fn effective_period(configured: Duration, minimum: Duration) -> Duration {
    configured.max(minimum)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    /// Drives a gate the way the sampler does: reset after every positive answer.
    fn run(gate: &mut CadenceGate, period: Duration, dts: &[Duration]) -> Vec<bool> {
        dts.iter()
            .map(|&dt| {
                let due = gate.should_sample(dt);
                if due {
                    gate.reset(period);
                }
                due
            })
            .collect()
    }

    #[test]
    fn test_fresh_gate_is_due() {
        let mut gate = CadenceGate::new();
        assert!(gate.should_sample(SEC));
        assert!(gate.should_sample(Duration::ZERO));
    }

    #[test]
    fn test_zero_period_samples_every_tick() {
        let mut gate = CadenceGate::new();
        let result = run(&mut gate, Duration::ZERO, &[SEC; 10]);
        assert!(result.iter().all(|&due| due));
    }

    #[test]
    fn test_five_second_period_with_one_second_ticks() {
        let mut gate = CadenceGate::new();
        let result = run(&mut gate, 5 * SEC, &[SEC; 16]);

        let due_ticks: Vec<usize> = result
            .iter()
            .enumerate()
            .filter_map(|(i, &due)| due.then_some(i))
            .collect();
        assert_eq!(due_ticks, vec![0, 5, 10, 15]);
    }

    #[test]
    fn test_one_true_per_window_with_uneven_ticks() {
        let period = 5 * SEC;
        let dts: Vec<Duration> = [700u64, 1300, 900, 2100, 400, 1600, 800, 1200, 2500, 300, 1000]
            .iter()
            .map(|&ms| Duration::from_millis(ms))
            .collect();

        let mut gate = CadenceGate::new();
        let result = run(&mut gate, period, &dts);

        // Elapsed time (at each tick) when the gate opened.
        let mut elapsed = Duration::ZERO;
        let mut opened = Vec::new();
        for (dt, due) in dts.iter().zip(&result) {
            elapsed += *dt;
            if *due {
                opened.push((elapsed, *dt));
            }
        }

        assert!(opened.len() >= 2);
        for pair in opened.windows(2) {
            let (prev, _) = pair[0];
            let (next, dt) = pair[1];
            assert!(next - prev >= period - dt);
        }
    }

    #[test]
    fn test_not_due_deducts_elapsed() {
        let mut gate = CadenceGate::new();
        gate.reset(5 * SEC);
        assert!(!gate.should_sample(2 * SEC));
        assert_eq!(gate.remaining(), 3 * SEC);
    }

    #[test]
    fn test_due_leaves_remaining_until_reset() {
        let mut gate = CadenceGate::new();
        gate.reset(SEC);
        assert!(gate.should_sample(2 * SEC));
        assert_eq!(gate.remaining(), SEC);
    }

    #[test]
    fn test_effective_period() {
        assert_eq!(effective_period(SEC, 5 * SEC), 5 * SEC);
        assert_eq!(effective_period(10 * SEC, 5 * SEC), 10 * SEC);
        assert_eq!(effective_period(SEC, Duration::ZERO), SEC);
    }
}
