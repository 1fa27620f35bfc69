//! Tornado analysis
//!
//! Each variable is swung between its low and high bound while every other
//! variable stays at its base value. Variables are ranked by the size of the
//! output swing they produce.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::formula::Formula;

/// A variable with its base value and pessimistic/optimistic bounds.
///
/// The variable's position fixes the placeholder it binds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TornadoVariable {
    pub name: String,
    pub base: f64,
    pub low: f64,
    pub high: f64,
}

impl TornadoVariable {
    pub fn new(name: impl Into<String>, base: f64, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            base,
            low,
            high,
        }
    }
}

/// Output swing produced by one variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TornadoImpact {
    pub name: String,
    pub low_input: f64,
    pub high_input: f64,
    pub low_output: f64,
    pub high_output: f64,
    /// `|high_output - low_output|`
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TornadoAnalysis {
    /// Output with every variable at its base value
    pub baseline: f64,
    /// Impacts, largest range first
    pub impacts: Vec<TornadoImpact>,
}

impl TornadoAnalysis {
    /// Impact of the variable called `name`
    #[must_use]
    pub fn impact(&self, name: &str) -> Option<&TornadoImpact> {
        self.impacts.iter().find(|i| i.name == name)
    }
}

/// Swing every variable independently and rank the impacts.
///
/// Ties keep declaration order. The baseline is reported but does not take
/// part in the ranking.
pub fn analyze_tornado(variables: &[TornadoVariable], formula: &str) -> Result<TornadoAnalysis> {
    if variables.is_empty() {
        return Err(SimulationError::InvalidArgument(
            "tornado analysis needs at least one variable".to_string(),
        ));
    }

    let mut seen = FxHashSet::default();
    for variable in variables {
        if !seen.insert(variable.name.as_str()) {
            return Err(SimulationError::InvalidArgument(format!(
                "duplicate variable name '{}'",
                variable.name
            )));
        }
        if !(variable.base.is_finite() && variable.low.is_finite() && variable.high.is_finite()) {
            return Err(SimulationError::InvalidArgument(format!(
                "variable '{}' has non-finite base or bounds",
                variable.name
            )));
        }
    }

    let formula = Formula::parse(formula)?;
    if formula.arity() > variables.len() {
        return Err(SimulationError::InvalidArgument(format!(
            "formula references {{{}}} but only {} variables are defined",
            formula.arity() - 1,
            variables.len()
        )));
    }

    let mut values: Vec<f64> = variables.iter().map(|v| v.base).collect();
    let mut stack = Vec::new();
    let baseline = formula.run(&values, &mut stack);

    let mut impacts: Vec<TornadoImpact> = variables
        .iter()
        .enumerate()
        .map(|(i, variable)| {
            values[i] = variable.low;
            let low_output = formula.run(&values, &mut stack);
            values[i] = variable.high;
            let high_output = formula.run(&values, &mut stack);
            values[i] = variable.base;

            TornadoImpact {
                name: variable.name.clone(),
                low_input: variable.low,
                high_input: variable.high,
                low_output,
                high_output,
                range: (high_output - low_output).abs(),
            }
        })
        .collect();

    // sort_by is stable; NaN swings rank last
    let rank = |range: f64| if range.is_nan() { f64::NEG_INFINITY } else { range };
    impacts.sort_by(|a, b| rank(b.range).total_cmp(&rank(a.range)));

    tracing::debug!(
        formula = formula.source(),
        variables = variables.len(),
        baseline,
        "Tornado analysis complete"
    );

    Ok(TornadoAnalysis { baseline, impacts })
}
