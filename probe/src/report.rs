//! Summary statistics and the persisted shape of a run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProbeRun;

/// Round trip statistics, every field in microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyReport {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl LatencyReport {
    /// Summarizes the given latencies.
    ///
    /// # Returns
    /// `None` if there are no samples.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        Some(Self {
            mean,
            median,
            min: sorted[0],
            max: sorted[n - 1],
        })
    }
}

impl fmt::Display for LatencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean {:.2}us, median {:.2}us, min {:.2}us, max {:.2}us",
            self.mean, self.median, self.min, self.max
        )
    }
}

/// The predictions and round trip times of a run, index `i` belonging to frame `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub filter_preds: Vec<Vec<f64>>,
    pub rt_times_us: Vec<f64>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rt_times_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rt_times_us.is_empty()
    }

    /// Summarizes `rt_times_us`, `None` for an empty run.
    pub fn latency_report(&self) -> Option<LatencyReport> {
        LatencyReport::from_samples(&self.rt_times_us)
    }
}

impl From<ProbeRun> for ResultSet {
    fn from(run: ProbeRun) -> Self {
        let rt_times_us = run
            .latencies
            .iter()
            .map(|record| record.duration().as_secs_f64() * 1e6)
            .collect();

        Self {
            filter_preds: run.predictions,
            rt_times_us,
        }
    }
}
