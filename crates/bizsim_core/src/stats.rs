//! Descriptive statistics over outcome vectors.
//!
//! Everything here works on plain slices and is order-invariant; the cached
//! per-run view lives in [`crate::model::OutcomeSet`].

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Sort a copy of `values` ascending.
///
/// NaN sorts after +inf whatever its sign bit, so it can only reach the upper
/// percentiles and never the low, adverse tail read by VaR and CVaR.
#[must_use]
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.is_nan().cmp(&b.is_nan()).then_with(|| a.total_cmp(b)));
    sorted
}

/// Linearly interpolated percentile of an ascending slice.
///
/// `percentile` is in `[0, 100]`; the rank is `percentile / 100 * (n - 1)`.
/// Returns NaN for an empty slice.
#[must_use]
pub fn percentile_sorted(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (percentile / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    let (lo, hi) = (sorted[lower], sorted[upper]);
    if lo == hi {
        // Avoids inf - inf when neighbouring outcomes are both infinite
        return lo;
    }
    lo + (hi - lo) * weight
}

pub(crate) fn check_percentile(percentile: f64) -> Result<()> {
    if (0.0..=100.0).contains(&percentile) {
        Ok(())
    } else {
        Err(SimulationError::InvalidArgument(format!(
            "percentile must be within [0, 100], got {percentile}"
        )))
    }
}

pub(crate) fn check_level(level: f64, what: &str) -> Result<()> {
    if level > 0.0 && level < 1.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidArgument(format!(
            "{what} must be within (0, 1), got {level}"
        )))
    }
}

/// Standard percentile set reported with every run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl Percentiles {
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Self {
        Self {
            p5: percentile_sorted(sorted, 5.0),
            p10: percentile_sorted(sorted, 10.0),
            p25: percentile_sorted(sorted, 25.0),
            p50: percentile_sorted(sorted, 50.0),
            p75: percentile_sorted(sorted, 75.0),
            p90: percentile_sorted(sorted, 90.0),
            p95: percentile_sorted(sorted, 95.0),
            p99: percentile_sorted(sorted, 99.0),
        }
    }

    /// All percentiles as `(percentile, value)` pairs, ascending
    #[must_use]
    pub fn pairs(&self) -> [(f64, f64); 8] {
        [
            (5.0, self.p5),
            (10.0, self.p10),
            (25.0, self.p25),
            (50.0, self.p50),
            (75.0, self.p75),
            (90.0, self.p90),
            (95.0, self.p95),
            (99.0, self.p99),
        ]
    }
}

/// Central interval holding `level` of the outcomes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Coverage as a fraction, e.g. 0.95
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Interval `[p((1-level)/2), p((1+level)/2)]` of an ascending slice
    #[must_use]
    pub fn from_sorted(sorted: &[f64], level: f64) -> Self {
        let tail = (1.0 - level) / 2.0 * 100.0;
        Self {
            level,
            lower: percentile_sorted(sorted, tail),
            upper: percentile_sorted(sorted, 100.0 - tail),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Summary statistics of an outcome vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    /// Sample variance (n - 1 denominator)
    pub variance: f64,
    pub population_std_dev: f64,
    pub population_variance: f64,
    /// Third standardized moment; 0 when the variance is 0
    pub skewness: f64,
    /// Excess kurtosis; 0 when the variance is 0
    pub kurtosis: f64,
    /// Sample std dev over |mean|; `None` when the mean is 0
    pub coefficient_of_variation: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    pub ci90: ConfidenceInterval,
    pub ci95: ConfidenceInterval,
    pub ci99: ConfidenceInterval,
}

impl Statistics {
    /// Compute statistics from raw values and their ascending copy.
    ///
    /// `values` must be non-empty.
    #[must_use]
    pub fn compute(values: &[f64], sorted: &[f64]) -> Self {
        let count = values.len();
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;

        let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &x| {
            let d = x - mean;
            let d2 = d * d;
            (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
        });

        let population_variance = m2 / n;
        let variance = if count > 1 { m2 / (n - 1.0) } else { 0.0 };
        let std_dev = variance.sqrt();

        let (skewness, kurtosis) = if population_variance > 0.0 {
            (
                (m3 / n) / population_variance.powf(1.5),
                (m4 / n) / (population_variance * population_variance) - 3.0,
            )
        } else {
            (0.0, 0.0)
        };

        let coefficient_of_variation = (mean != 0.0).then(|| std_dev / mean.abs());

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            count,
            mean,
            median: percentile_sorted(sorted, 50.0),
            std_dev,
            variance,
            population_std_dev: population_variance.sqrt(),
            population_variance,
            skewness,
            kurtosis,
            coefficient_of_variation,
            min,
            max,
            percentiles: Percentiles::from_sorted(sorted),
            ci90: ConfidenceInterval::from_sorted(sorted, 0.90),
            ci95: ConfidenceInterval::from_sorted(sorted, 0.95),
            ci99: ConfidenceInterval::from_sorted(sorted, 0.99),
        }
    }
}

/// One equal-width histogram bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram over the finite outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    /// Outcomes left out of the buckets because they are inf or NaN
    pub non_finite: usize,
}

impl Histogram {
    /// Bucket `values` into `bins` equal-width bins spanning `[min, max]`.
    ///
    /// When all finite values are equal a single bin holds them all.
    pub fn build(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(SimulationError::InvalidArgument(
                "histogram needs at least one bin".to_string(),
            ));
        }

        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let non_finite = values.len() - finite.len();

        if finite.is_empty() {
            return Ok(Self {
                bins: Vec::new(),
                non_finite,
            });
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if min == max {
            return Ok(Self {
                bins: vec![HistogramBin {
                    start: min,
                    end: max,
                    count: finite.len(),
                }],
                non_finite,
            });
        }

        let width = (max - min) / bins as f64;
        let mut result: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                start: min + width * i as f64,
                end: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        for value in finite {
            // The last bin is closed on the right so `max` lands in it
            let index = (((value - min) / width).floor() as usize).min(bins - 1);
            result[index].count += 1;
        }

        Ok(Self {
            bins: result,
            non_finite,
        })
    }

    /// Number of outcomes placed in buckets
    #[must_use]
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Share of the bucketed outcomes in each bin
    #[must_use]
    pub fn frequencies(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return vec![0.0; self.bins.len()];
        }
        self.bins
            .iter()
            .map(|b| b.count as f64 / total as f64)
            .collect()
    }
}
