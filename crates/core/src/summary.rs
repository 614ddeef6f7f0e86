//! Numerically-stable online aggregation over every evaluated metric.
//!
//! Each worker owns one [`SummaryAccumulator`] and folds its own metrics
//! into it with no locking. Accumulators merge associatively and
//! commutatively (Welford's parallel-merge formula), so the collector's
//! final statistics are invariant under how work was interleaved across
//! workers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAccumulator {
    count: u64,
    mean: f64,
    m2: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one evaluated metric into the running statistics.
    pub fn push(&mut self, metric: f64) {
        self.count += 1;
        let delta = metric - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = metric - self.mean;
        self.m2 += delta * delta2;

        self.min = Some(self.min.map_or(metric, |m| m.min(metric)));
        self.max = Some(self.max.map_or(metric, |m| m.max(metric)));
    }

    /// Merge another accumulator's statistics into this one. Associative and
    /// commutative: the result does not depend on merge order.
    pub fn merge(&mut self, other: &SummaryAccumulator) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }

        let total = self.count + other.count;
        let delta = other.mean - self.mean;
        let new_mean = self.mean + delta * (other.count as f64) / (total as f64);
        let new_m2 = self.m2
            + other.m2
            + delta * delta * (self.count as f64) * (other.count as f64) / (total as f64);

        self.mean = new_mean;
        self.m2 = new_m2;
        self.count = total;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, None) => a,
            (None, b) => b,
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, None) => a,
            (None, b) => b,
        };
    }

    pub fn finish(&self, hits_found: u64, timed_out: bool) -> Summary {
        Summary {
            total_evaluated: self.count,
            hits_found,
            min_metric: self.min,
            max_metric: self.max,
            mean_metric: if self.count == 0 { None } else { Some(self.mean) },
            timed_out,
        }
    }
}

/// Aggregate statistics over every metric evaluated in a scan (not just hits).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_evaluated: u64,
    pub hits_found: u64,
    /// `None` when no nonces were evaluated (empty range).
    pub min_metric: Option<f64>,
    pub max_metric: Option<f64>,
    pub mean_metric: Option<f64>,
    pub timed_out: bool,
}
