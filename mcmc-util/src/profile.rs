use log::info;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Accumulated wall time per named step.
#[derive(Debug, Clone, Default)]
pub struct StepTimer {
    steps: BTreeMap<&'static str, (usize, Duration)>,
}

impl StepTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one call of `step` that started at `start`.
    pub fn record(&mut self, step: &'static str, start: Instant) {
        self.add(step, start.elapsed());
    }

    pub fn add(&mut self, step: &'static str, elapsed: Duration) {
        let entry = self.steps.entry(step).or_insert((0, Duration::ZERO));
        entry.0 += 1;
        entry.1 += elapsed;
    }

    /// `(step, calls, total)` sorted by step name
    pub fn summary(&self) -> Vec<(&'static str, usize, Duration)> {
        self.steps
            .iter()
            .map(|(&name, &(calls, total))| (name, calls, total))
            .collect()
    }

    /// Log totals, call counts and mean duration of every step.
    pub fn report(&self) {
        let grand_total: Duration = self.steps.values().map(|&(_, t)| t).sum();
        for (name, calls, total) in self.summary() {
            let share = if grand_total.is_zero() {
                0.0
            } else {
                100.0 * total.as_secs_f64() / grand_total.as_secs_f64()
            };
            info!(
                "{:<20} {:>8} calls, total {:.3?}, mean {:.3?}, {:.1}%",
                name,
                calls,
                total,
                total / calls.max(1) as u32,
                share
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_by_step() {
        let mut timer = StepTimer::new();
        assert!(timer.summary().is_empty());
        timer.add("b_step", Duration::from_millis(5));
        timer.add("a_step", Duration::from_millis(2));
        timer.add("b_step", Duration::from_millis(7));
        timer.record("a_step", Instant::now());

        let summary = timer.summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].0, "a_step");
        assert_eq!(summary[0].1, 2);
        assert!(summary[0].2 >= Duration::from_millis(2));
        assert_eq!(summary[1], ("b_step", 2, Duration::from_millis(12)));
        timer.report();
    }
}
