//! # Tick Statistics
//!
//! Timing of the `Stepping` phase: step, pose computation and publish.

use std::time::Duration;

use tracing::debug;

/// Tick timing statistics.
#[derive(Clone, Copy, Debug)]
pub struct TickStats {
    /// Wall-clock budget of one tick.
    pub budget: Duration,
    /// Minimum tick duration observed.
    pub min_tick_us: u64,
    /// Maximum tick duration observed.
    pub max_tick_us: u64,
    /// Average tick duration (rolling).
    pub avg_tick_us: u64,
    /// Late ticks: steps that took longer than the budget, plus ticks
    /// dropped because the thread was busy.
    pub late_ticks: u64,
    /// Total ticks measured.
    pub total_ticks: u64,
}

impl TickStats {
    /// Creates empty statistics for the given per-tick budget.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: duration_us(budget),
            late_ticks: 0,
            total_ticks: 0,
        }
    }

    /// Records one tick.
    pub fn record(&mut self, duration: Duration) {
        let tick_us = duration_us(duration);

        self.total_ticks += 1;
        self.min_tick_us = self.min_tick_us.min(tick_us);
        self.max_tick_us = self.max_tick_us.max(tick_us);

        // Rolling average
        self.avg_tick_us = self.avg_tick_us.saturating_mul(15).saturating_add(tick_us) / 16;

        if duration > self.budget {
            self.late_ticks += 1;
            debug!(
                tick_us,
                budget_us = duration_us(self.budget),
                "physics tick over budget"
            );
        }
    }

    /// Records how late a tick was picked up. Every full budget of delay is
    /// one tick the timer dropped, counted as late.
    pub fn record_delay(&mut self, delay: Duration) {
        let budget_ns = self.budget.as_nanos().max(1);
        let missed = u64::try_from(delay.as_nanos() / budget_ns).unwrap_or(u64::MAX);
        if missed > 0 {
            self.late_ticks = self.late_ticks.saturating_add(missed);
            debug!(
                missed,
                delay_us = duration_us(delay),
                "physics ticks dropped"
            );
        }
    }

    /// Resets statistics, keeping the budget.
    pub fn reset(&mut self) {
        *self = Self::new(self.budget);
    }
}

fn duration_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_tracking() {
        let mut stats = TickStats::new(Duration::from_micros(16_666));
        assert_eq!(stats.avg_tick_us, 16_666);

        stats.record(Duration::from_micros(100));
        stats.record(Duration::from_micros(300));

        assert_eq!(stats.total_ticks, 2);
        assert_eq!(stats.min_tick_us, 100);
        assert_eq!(stats.max_tick_us, 300);
        assert_eq!(stats.late_ticks, 0);
        assert!(stats.min_tick_us <= stats.max_tick_us);
    }

    #[test]
    fn test_late_ticks_counted() {
        let mut stats = TickStats::new(Duration::from_millis(1));
        stats.record(Duration::from_millis(2));
        stats.record(Duration::from_micros(10));
        assert_eq!(stats.late_ticks, 1);

        stats.reset();
        assert_eq!(stats.total_ticks, 0);
        assert_eq!(stats.late_ticks, 0);
        assert_eq!(stats.budget, Duration::from_millis(1));
    }

    #[test]
    fn test_dropped_ticks_counted_from_delay() {
        let mut stats = TickStats::new(Duration::from_millis(1));
        stats.record_delay(Duration::from_micros(400));
        assert_eq!(stats.late_ticks, 0);

        stats.record_delay(Duration::from_micros(3_500));
        assert_eq!(stats.late_ticks, 3);
        assert_eq!(stats.total_ticks, 0);
    }
}
