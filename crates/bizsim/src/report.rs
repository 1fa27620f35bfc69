//! Reports printed by the runner

use std::fs;
use std::io;
use std::path::Path;

use bizsim_core::{OutcomeSet, SimulationError};
use bizsim_core::analysis::{
    ScenarioComparison, ScenarioMetric, SensitivityAnalysis, TornadoAnalysis,
};
use bizsim_core::config::SimulationConfig;
use bizsim_core::stats::{Histogram, Statistics};
use color_eyre::eyre::{WrapErr, eyre};
use serde::Serialize;

use crate::request::ReportOptions;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMeasure {
    pub confidence: f64,
    pub value_at_risk: f64,
    pub conditional_value_at_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdProbability {
    pub threshold: f64,
    pub below: f64,
    pub above: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub iterations: usize,
    /// Seed the run used, drawn at random when the request had none
    pub seed: u64,
    pub statistics: Statistics,
    pub risk: Vec<RiskMeasure>,
    pub thresholds: Vec<ThresholdProbability>,
    pub histogram: Histogram,
}

impl SimulationReport {
    pub fn new(
        outcomes: &OutcomeSet,
        config: &SimulationConfig,
        options: &ReportOptions,
    ) -> bizsim_core::Result<Self> {
        let risk = options
            .confidence_levels
            .iter()
            .map(|&confidence| -> bizsim_core::Result<RiskMeasure> {
                Ok(RiskMeasure {
                    confidence,
                    value_at_risk: outcomes.value_at_risk(confidence)?,
                    conditional_value_at_risk: outcomes.conditional_value_at_risk(confidence)?,
                })
            })
            .collect::<bizsim_core::Result<Vec<_>>>()?;

        let thresholds = options
            .thresholds
            .iter()
            .map(|&threshold| ThresholdProbability {
                threshold,
                below: outcomes.probability_below(threshold),
                above: outcomes.probability_above(threshold),
            })
            .collect();

        let seed = config.seed.ok_or_else(|| {
            SimulationError::InvalidArgument("simulation report needs the seed the run used".into())
        })?;

        Ok(Self {
            iterations: outcomes.len(),
            seed,
            statistics: outcomes.statistics().clone(),
            risk,
            thresholds,
            histogram: outcomes.histogram(options.histogram_bins)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub statistics: Statistics,
}

/// Best and worst scenario for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricLeader {
    pub metric: &'static str,
    pub best: String,
    pub worst: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub iterations: usize,
    pub seed: u64,
    pub scenarios: Vec<ScenarioSummary>,
    pub leaders: Vec<MetricLeader>,
}

impl ScenarioReport {
    #[must_use]
    pub fn new(comparison: &ScenarioComparison) -> Self {
        let scenarios = comparison
            .results()
            .iter()
            .map(|result| ScenarioSummary {
                name: result.name.clone(),
                statistics: result.outcomes.statistics().clone(),
            })
            .collect();

        let leaders = ScenarioMetric::ALL
            .iter()
            .map(|&metric| MetricLeader {
                metric: metric.name(),
                best: comparison.best_scenario(metric).name.clone(),
                worst: comparison.worst_scenario(metric).name.clone(),
            })
            .collect();

        Self {
            iterations: comparison.iterations,
            seed: comparison.seed,
            scenarios,
            leaders,
        }
    }
}

/// Result of one analysis, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    Simulation(SimulationReport),
    Sensitivity(SensitivityAnalysis),
    Tornado(TornadoAnalysis),
    Scenarios(ScenarioReport),
}

impl Report {
    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }

    /// Write the report next to `path` first and rename it into place
    pub fn write(&self, path: &Path) -> color_eyre::Result<()> {
        let yaml = self
            .to_yaml()
            .map_err(|e| eyre!("Failed to serialize report: {e}"))?;
        write_atomic(path, &yaml)
            .wrap_err_with(|| format!("Failed to write report {}", path.display()))?;
        tracing::info!(path = %path.display(), "Report written");
        Ok(())
    }
}

fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let staging = path.with_extension("yaml.partial");
    fs::write(&staging, content)?;
    fs::rename(&staging, path)
}
