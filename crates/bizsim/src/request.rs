//! YAML analysis requests
//!
//! A request file names the analysis in its `type` field and carries the
//! formula plus whatever that analysis needs:
//!
//! ```yaml
//! type: simulation
//! formula: "{0} - {1}"
//! inputs:
//!   - name: revenue
//!     distribution: { type: normal, mean: 1000.0, std_dev: 100.0 }
//!   - name: costs
//!     distribution: { type: uniform, min: 600.0, max: 800.0 }
//! iterations: 10000
//! seed: 42
//! ```

use std::path::Path;

use bizsim_core::analysis::{
    Scenario, SensitivityRange, TornadoVariable, analyze_sensitivity, analyze_tornado,
    compare_scenarios,
};
use bizsim_core::config::{DEFAULT_ITERATIONS, SimulationConfig};
use bizsim_core::{Formula, SimulationInput, monte_carlo_simulate, resolve_seed};
use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};

use crate::report::{Report, ScenarioReport, SimulationReport};

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_steps() -> usize {
    11
}

fn default_histogram_bins() -> usize {
    20
}

fn default_confidence_levels() -> Vec<f64> {
    vec![0.90, 0.95, 0.99]
}

/// Reporting knobs for a simulation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Confidence levels at which VaR and CVaR are reported
    #[serde(default = "default_confidence_levels")]
    pub confidence_levels: Vec<f64>,
    /// Thresholds at which `P(outcome < t)` and `P(outcome > t)` are reported
    #[serde(default)]
    pub thresholds: Vec<f64>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            histogram_bins: default_histogram_bins(),
            confidence_levels: default_confidence_levels(),
            thresholds: Vec::new(),
        }
    }
}

/// One analysis to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisRequest {
    Simulation {
        formula: String,
        inputs: Vec<SimulationInput>,
        #[serde(default = "default_iterations")]
        iterations: usize,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        report: ReportOptions,
    },
    Sensitivity {
        formula: String,
        base_value: f64,
        range: SensitivityRange,
        #[serde(default = "default_steps")]
        steps: usize,
    },
    Tornado {
        formula: String,
        variables: Vec<TornadoVariable>,
    },
    Scenarios {
        formula: String,
        input_names: Vec<String>,
        scenarios: Vec<Scenario>,
        #[serde(default = "default_iterations")]
        iterations: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl AnalysisRequest {
    /// Parse a request from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Read and parse a request file
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read request file {}", path.display()))?;
        let request = Self::from_yaml(&content)
            .wrap_err_with(|| format!("Failed to parse request file {}", path.display()))?;
        tracing::debug!(path = %path.display(), kind = request.kind(), "Loaded request");
        Ok(request)
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisRequest::Simulation { .. } => "simulation",
            AnalysisRequest::Sensitivity { .. } => "sensitivity",
            AnalysisRequest::Tornado { .. } => "tornado",
            AnalysisRequest::Scenarios { .. } => "scenarios",
        }
    }

    /// Replace iterations and seed of Monte Carlo requests.
    ///
    /// Sensitivity and tornado requests are deterministic and ignore both.
    pub fn apply_overrides(
        &mut self,
        iterations_override: Option<usize>,
        seed_override: Option<u64>,
    ) {
        match self {
            AnalysisRequest::Simulation {
                iterations, seed, ..
            }
            | AnalysisRequest::Scenarios {
                iterations, seed, ..
            } => {
                if let Some(n) = iterations_override {
                    *iterations = n;
                }
                if seed_override.is_some() {
                    *seed = seed_override;
                }
            }
            AnalysisRequest::Sensitivity { .. } | AnalysisRequest::Tornado { .. } => {
                if iterations_override.is_some() || seed_override.is_some() {
                    tracing::warn!(
                        kind = self.kind(),
                        "Iteration and seed overrides do not apply to this analysis"
                    );
                }
            }
        }
    }

    /// Run the analysis and build its report
    pub fn execute(&self) -> bizsim_core::Result<Report> {
        let report = match self {
            AnalysisRequest::Simulation {
                formula,
                inputs,
                iterations,
                seed,
                report: options,
            } => {
                let formula = Formula::parse(formula)?;
                let config = SimulationConfig {
                    iterations: *iterations,
                    seed: *seed,
                };
                let config = config.with_seed(resolve_seed(*seed));
                let outcomes = monte_carlo_simulate(inputs, &formula, &config)?;
                Report::Simulation(SimulationReport::new(&outcomes, &config, options)?)
            }
            AnalysisRequest::Sensitivity {
                formula,
                base_value,
                range,
                steps,
            } => Report::Sensitivity(analyze_sensitivity(*base_value, *range, formula, *steps)?),
            AnalysisRequest::Tornado { formula, variables } => {
                Report::Tornado(analyze_tornado(variables, formula)?)
            }
            AnalysisRequest::Scenarios {
                formula,
                input_names,
                scenarios,
                iterations,
                seed,
            } => {
                let comparison = compare_scenarios(
                    input_names.as_slice(),
                    formula,
                    scenarios,
                    *iterations,
                    *seed,
                )?;
                Report::Scenarios(ScenarioReport::new(&comparison))
            }
        };
        tracing::info!(kind = self.kind(), "Analysis complete");
        Ok(report)
    }
}
