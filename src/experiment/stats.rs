//! Acceptance metrics across repeated scheduling requests.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Usable Rate | usable results / requests |
//! | Acceptance Rate | accepted workloads / offered workloads |
//! | Priority-Weighted Rate | accepted priority / offered priority |
//! | Per-Priority Rate | accepted / offered, per priority level |
//! | Max Sched Time | slowest request |
//!
//! Unusable results count toward the offered totals but contribute no
//! acceptances.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::thermal::thermal_losses;
use crate::ga::SelectionResult;
use crate::models::Workload;

/// Accumulated acceptance statistics for one algorithm.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AcceptanceStats {
    /// Algorithm name.
    pub algorithm: String,
    /// Requests recorded.
    pub request_count: usize,
    /// Requests that returned a usable result.
    pub usable_count: usize,
    /// Workloads offered across all requests.
    pub workload_count: usize,
    /// Workloads accepted across usable requests.
    pub accepted_count: usize,
    /// Summed priority of offered workloads.
    pub total_priority: i64,
    /// Summed priority of accepted workloads.
    pub accepted_priority: i64,
    /// Offered workloads per priority.
    pub count_per_priority: BTreeMap<i32, usize>,
    /// Accepted workloads per priority.
    pub accepted_per_priority: BTreeMap<i32, usize>,
    /// Slowest request.
    pub max_sched_time: Duration,
    /// Running average site temperature over usable requests (°C).
    pub avg_temperature: f64,
    /// Running average performance loss.
    pub avg_performance_loss: f64,
    /// Running average power overhead (%).
    pub avg_power_overhead_pct: f64,
    temperature_samples: usize,
}

impl AcceptanceStats {
    /// Empty statistics for `algorithm`.
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            ..Self::default()
        }
    }

    /// Records one request over `offered` and its result.
    pub fn record(&mut self, offered: &[Workload], result: &SelectionResult, elapsed: Duration) {
        self.request_count += 1;
        self.max_sched_time = self.max_sched_time.max(elapsed);
        self.workload_count += offered.len();
        for w in offered {
            self.total_priority += i64::from(w.priority);
            *self.count_per_priority.entry(w.priority).or_default() += 1;
        }
        if !result.usable {
            return;
        }
        self.usable_count += 1;
        for a in result.accepted_workloads() {
            self.accepted_count += 1;
            self.accepted_priority += i64::from(a.priority);
            *self.accepted_per_priority.entry(a.priority).or_default() += 1;
        }
    }

    /// Folds a site temperature into the running thermal averages.
    pub fn record_temperature(&mut self, temperature_c: f64) {
        let losses = thermal_losses(temperature_c);
        let n = self.temperature_samples as f64;
        let running = |avg: f64, x: f64| (avg * n + x) / (n + 1.0);
        self.avg_temperature = running(self.avg_temperature, temperature_c);
        self.avg_performance_loss = running(self.avg_performance_loss, losses.performance_loss);
        self.avg_power_overhead_pct =
            running(self.avg_power_overhead_pct, losses.power_overhead_pct);
        self.temperature_samples += 1;
    }

    /// Fraction of requests with a usable result.
    pub fn usable_rate(&self) -> Option<f64> {
        ratio(self.usable_count as f64, self.request_count as f64)
    }

    /// Fraction of offered workloads that were accepted.
    pub fn acceptance_rate(&self) -> Option<f64> {
        ratio(self.accepted_count as f64, self.workload_count as f64)
    }

    /// Accepted priority over offered priority.
    pub fn priority_weighted_rate(&self) -> Option<f64> {
        ratio(self.accepted_priority as f64, self.total_priority as f64)
    }

    /// Acceptance rate of one priority level.
    pub fn priority_rate(&self, priority: i32) -> Option<f64> {
        let offered = self.count_per_priority.get(&priority).copied().unwrap_or(0);
        let accepted = self.accepted_per_priority.get(&priority).copied().unwrap_or(0);
        ratio(accepted as f64, offered as f64)
    }
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    (den > 0.0).then(|| num / den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::AcceptedWorkload;

    fn result(entries: &[(&str, i32, bool)]) -> SelectionResult {
        let accepted: Vec<AcceptedWorkload> = entries
            .iter()
            .map(|&(id, priority, accepted)| AcceptedWorkload {
                id: id.to_string(),
                priority,
                accepted,
            })
            .collect();
        let usable = accepted.iter().any(|a| a.accepted);
        SelectionResult { accepted, usable }
    }

    fn offered() -> Vec<Workload> {
        vec![
            Workload::new("a").with_priority(2),
            Workload::new("b").with_priority(8),
            Workload::new("c").with_priority(8),
        ]
    }

    #[test]
    fn test_stats_basic() {
        let mut s = AcceptanceStats::new("Amaga");
        s.record(
            &offered(),
            &result(&[("a", 2, false), ("b", 8, true), ("c", 8, true)]),
            Duration::from_millis(30),
        );
        s.record(&offered(), &SelectionResult::unusable(), Duration::from_millis(50));

        assert!((s.usable_rate().unwrap() - 0.5).abs() < 1e-10);
        assert!((s.acceptance_rate().unwrap() - 2.0 / 6.0).abs() < 1e-10);
        assert!((s.priority_weighted_rate().unwrap() - 16.0 / 36.0).abs() < 1e-10);
        assert!((s.priority_rate(8).unwrap() - 0.5).abs() < 1e-10);
        assert_eq!(s.priority_rate(2), Some(0.0));
        assert_eq!(s.max_sched_time, Duration::from_millis(50));
    }

    #[test]
    fn test_stats_empty() {
        let s = AcceptanceStats::new("CompRand");
        assert_eq!(s.usable_rate(), None);
        assert_eq!(s.acceptance_rate(), None);
        assert_eq!(s.priority_weighted_rate(), None);
        assert_eq!(s.priority_rate(5), None);
    }

    #[test]
    fn test_temperature_running_average() {
        let mut s = AcceptanceStats::new("Mtdp");
        s.record_temperature(22.0);
        s.record_temperature(30.0);
        assert!((s.avg_temperature - 26.0).abs() < 1e-10);
        // 30 °C: excess 5 → 2.5 + 0.5 = 3 %
        assert!((s.avg_power_overhead_pct - 1.5).abs() < 1e-10);
    }
}
