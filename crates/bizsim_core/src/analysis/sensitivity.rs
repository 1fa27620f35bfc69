//! One-dimensional sensitivity sweep
//!
//! A single input is swept across a range in equally spaced steps and a
//! one-input formula is evaluated at every point. The resulting
//! `sensitivity_factor` is a finite-difference approximation of how strongly
//! the output responds to the input over the swept range. It is only
//! meaningful as an approximation, chiefly where the relationship is
//! monotonic or close to linear; it is not an analytic derivative.

use serde::{Deserialize, Serialize};

use crate::config::MAX_ITERATIONS;
use crate::error::{Result, SimulationError};
use crate::formula::Formula;

/// Range swept by [`analyze_sensitivity`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensitivityRange {
    /// Symmetric window `base ± |base * fraction|`, e.g. `fraction: 0.1` for ±10%
    PercentOfBase { fraction: f64 },
    Explicit { min: f64, max: f64 },
}

impl SensitivityRange {
    /// Lower and upper input bounds around `base_value`.
    pub fn bounds(&self, base_value: f64) -> Result<(f64, f64)> {
        let (min, max) = match *self {
            SensitivityRange::PercentOfBase { fraction } => {
                if !fraction.is_finite() || fraction <= 0.0 {
                    return Err(SimulationError::InvalidArgument(format!(
                        "percent-of-base fraction must be positive and finite, got {fraction}"
                    )));
                }
                let half_width = (base_value * fraction).abs();
                (base_value - half_width, base_value + half_width)
            }
            SensitivityRange::Explicit { min, max } => (min, max),
        };

        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(SimulationError::InvalidArgument(format!(
                "sensitivity range [{min}, {max}] is empty or inverted"
            )));
        }
        Ok((min, max))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub input: f64,
    pub output: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    pub base_value: f64,
    /// Formula output at `base_value`
    pub base_output: f64,
    pub points: Vec<SensitivityPoint>,
    /// `(max_output - min_output) / (max_input - min_input)`
    pub sensitivity_factor: f64,
}

impl SensitivityAnalysis {
    #[must_use]
    pub fn min_output(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.output)
            .fold(f64::INFINITY, f64::min)
    }

    #[must_use]
    pub fn max_output(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.output)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Sweep `{0}` of `formula` over `range` in `steps` equally spaced points.
///
/// Both ends are included and the last point is exactly the upper bound.
pub fn analyze_sensitivity(
    base_value: f64,
    range: SensitivityRange,
    formula: &str,
    steps: usize,
) -> Result<SensitivityAnalysis> {
    if !base_value.is_finite() {
        return Err(SimulationError::InvalidArgument(format!(
            "base value must be finite, got {base_value}"
        )));
    }
    if !(2..=MAX_ITERATIONS).contains(&steps) {
        return Err(SimulationError::InvalidArgument(format!(
            "steps must be between 2 and {MAX_ITERATIONS}, got {steps}"
        )));
    }
    let (min_input, max_input) = range.bounds(base_value)?;
    let formula = Formula::parse(formula)?;
    formula.check_arity(1)?;

    let step_size = (max_input - min_input) / (steps - 1) as f64;
    let mut stack = Vec::new();
    let points: Vec<SensitivityPoint> = (0..steps)
        .map(|i| {
            let input = if i == steps - 1 {
                max_input
            } else {
                min_input + step_size * i as f64
            };
            SensitivityPoint {
                input,
                output: formula.run(&[input], &mut stack),
            }
        })
        .collect();

    let base_output = formula.run(&[base_value], &mut stack);

    let mut analysis = SensitivityAnalysis {
        base_value,
        base_output,
        points,
        sensitivity_factor: 0.0,
    };
    analysis.sensitivity_factor =
        (analysis.max_output() - analysis.min_output()) / (max_input - min_input);

    tracing::debug!(
        formula = formula.source(),
        steps,
        min_input,
        max_input,
        factor = analysis.sensitivity_factor,
        "Sensitivity sweep complete"
    );

    Ok(analysis)
}
