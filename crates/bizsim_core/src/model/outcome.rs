//! Outcome sets produced by the engine

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::stats::{
    ConfidenceInterval, Histogram, Statistics, check_level, check_percentile, percentile_sorted,
    sorted_copy,
};

/// The scalar results of a Monte Carlo run.
///
/// Derived quantities are order-invariant. The sorted copy and the summary
/// statistics are computed on first use and cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawOutcomes")]
pub struct OutcomeSet {
    values: Vec<f64>,
    #[serde(skip)]
    sorted: OnceLock<Vec<f64>>,
    #[serde(skip)]
    statistics: OnceLock<Statistics>,
}

impl OutcomeSet {
    /// Wrap raw outcomes. At least one value is required.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(SimulationError::InvalidArgument(
                "an outcome set needs at least one value".to_string(),
            ));
        }
        Ok(Self {
            values,
            sorted: OnceLock::new(),
            statistics: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ascending copy of the outcomes
    #[must_use]
    pub fn sorted(&self) -> &[f64] {
        self.sorted.get_or_init(|| sorted_copy(&self.values))
    }

    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        self.statistics
            .get_or_init(|| Statistics::compute(&self.values, self.sorted()))
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.statistics().mean
    }

    #[must_use]
    pub fn median(&self) -> f64 {
        self.statistics().median
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.statistics().std_dev
    }

    /// Interpolated percentile, `percentile` in `[0, 100]`
    pub fn percentile(&self, percentile: f64) -> Result<f64> {
        check_percentile(percentile)?;
        Ok(percentile_sorted(self.sorted(), percentile))
    }

    /// Central interval covering `level` (a fraction in `(0, 1)`) of the outcomes
    pub fn confidence_interval(&self, level: f64) -> Result<ConfidenceInterval> {
        check_level(level, "confidence level")?;
        Ok(ConfidenceInterval::from_sorted(self.sorted(), level))
    }

    /// Share of outcomes strictly greater than `threshold`
    #[must_use]
    pub fn probability_above(&self, threshold: f64) -> f64 {
        self.fraction(|v| v > threshold)
    }

    /// Share of outcomes strictly less than `threshold`
    #[must_use]
    pub fn probability_below(&self, threshold: f64) -> f64 {
        self.fraction(|v| v < threshold)
    }

    /// Share of outcomes in the closed interval `[low, high]`
    #[must_use]
    pub fn probability_between(&self, low: f64, high: f64) -> f64 {
        self.fraction(|v| v >= low && v <= high)
    }

    fn fraction(&self, predicate: impl Fn(f64) -> bool) -> f64 {
        let hits = self.values.iter().filter(|&&v| predicate(v)).count();
        hits as f64 / self.values.len() as f64
    }

    /// Value at risk at `confidence` (e.g. 0.95).
    ///
    /// Outcomes are taken as-is with low values as the adverse side, so this
    /// is the `(1 - confidence)` percentile of the outcomes. A loss shows up
    /// as a negative number.
    pub fn value_at_risk(&self, confidence: f64) -> Result<f64> {
        check_level(confidence, "confidence")?;
        Ok(percentile_sorted(self.sorted(), (1.0 - confidence) * 100.0))
    }

    /// Expected shortfall: mean of all outcomes at or below the VaR threshold.
    ///
    /// Never greater than [`Self::value_at_risk`] at the same confidence.
    pub fn conditional_value_at_risk(&self, confidence: f64) -> Result<f64> {
        let threshold = self.value_at_risk(confidence)?;
        let sorted = self.sorted();
        let tail_len = sorted.partition_point(|&v| v <= threshold);
        // VaR interpolates between order statistics, so the smallest outcome is always in the tail
        let tail = &sorted[..tail_len.max(1)];
        Ok(tail.iter().sum::<f64>() / tail.len() as f64)
    }

    /// Equal-width histogram with `bins` buckets
    pub fn histogram(&self, bins: usize) -> Result<Histogram> {
        Histogram::build(&self.values, bins)
    }
}

#[derive(Deserialize)]
struct RawOutcomes {
    values: Vec<f64>,
}

impl TryFrom<RawOutcomes> for OutcomeSet {
    type Error = SimulationError;

    fn try_from(raw: RawOutcomes) -> Result<Self> {
        Self::new(raw.values)
    }
}

impl PartialEq for OutcomeSet {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}
