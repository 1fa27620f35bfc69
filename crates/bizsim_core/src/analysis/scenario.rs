//! Discrete scenario comparison
//!
//! Every scenario supplies one value per declared input, either fixed or
//! uncertain. All scenarios run through the Monte Carlo engine with the same
//! seed, so uncertain inputs see common random numbers and differences between
//! scenarios come from their values alone.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::formula::Formula;
use crate::model::{Distribution, OutcomeSet, SimulationInput};
use crate::simulation::{monte_carlo_simulate, resolve_seed, validate};

/// Value of one input within a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioValue {
    /// Same value every iteration
    Fixed(f64),
    Uncertain(Distribution),
}

impl ScenarioValue {
    fn to_distribution(&self) -> Result<Distribution> {
        match self {
            ScenarioValue::Fixed(value) => Distribution::fixed(*value),
            ScenarioValue::Uncertain(distribution) => Ok(distribution.clone()),
        }
    }
}

impl From<f64> for ScenarioValue {
    fn from(value: f64) -> Self {
        ScenarioValue::Fixed(value)
    }
}

impl From<Distribution> for ScenarioValue {
    fn from(distribution: Distribution) -> Self {
        ScenarioValue::Uncertain(distribution)
    }
}

/// A named, fully specified what-if case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub values: Vec<ScenarioValue>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, values: Vec<ScenarioValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Scenario made only of fixed values
    pub fn fixed(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(ScenarioValue::Fixed).collect())
    }

    /// Scenario made only of distributions
    pub fn uncertain(
        name: impl Into<String>,
        distributions: impl IntoIterator<Item = Distribution>,
    ) -> Self {
        Self::new(
            name,
            distributions
                .into_iter()
                .map(ScenarioValue::Uncertain)
                .collect(),
        )
    }
}

/// Statistic used to compare scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMetric {
    Mean,
    Median,
    P5,
    P95,
    /// Lower is better
    StdDev,
}

impl ScenarioMetric {
    pub const ALL: [ScenarioMetric; 5] = [
        ScenarioMetric::Mean,
        ScenarioMetric::Median,
        ScenarioMetric::P5,
        ScenarioMetric::P95,
        ScenarioMetric::StdDev,
    ];

    #[must_use]
    pub fn value(&self, outcomes: &OutcomeSet) -> f64 {
        let stats = outcomes.statistics();
        match self {
            ScenarioMetric::Mean => stats.mean,
            ScenarioMetric::Median => stats.median,
            ScenarioMetric::P5 => stats.percentiles.p5,
            ScenarioMetric::P95 => stats.percentiles.p95,
            ScenarioMetric::StdDev => stats.std_dev,
        }
    }

    /// Whether a smaller value is the better one
    #[must_use]
    pub fn lower_is_better(&self) -> bool {
        matches!(self, ScenarioMetric::StdDev)
    }

    /// Higher score is better; NaN scores worst
    fn score(&self, outcomes: &OutcomeSet) -> f64 {
        let value = self.value(outcomes);
        if value.is_nan() {
            f64::NEG_INFINITY
        } else if self.lower_is_better() {
            -value
        } else {
            value
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioMetric::Mean => "mean",
            ScenarioMetric::Median => "median",
            ScenarioMetric::P5 => "p5",
            ScenarioMetric::P95 => "p95",
            ScenarioMetric::StdDev => "std_dev",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub outcomes: OutcomeSet,
}

/// Outcomes of every scenario, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub input_names: Vec<String>,
    pub iterations: usize,
    /// Seed shared by all scenarios
    pub seed: u64,
    results: Vec<ScenarioResult>,
}

impl ScenarioComparison {
    #[must_use]
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    /// Outcomes of the scenario called `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OutcomeSet> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.outcomes)
    }

    /// Best scenario by `metric`; the earliest declared wins a tie
    #[must_use]
    pub fn best_scenario(&self, metric: ScenarioMetric) -> &ScenarioResult {
        self.extreme(metric, |candidate, current| candidate > current)
    }

    /// Worst scenario by `metric`; the earliest declared wins a tie
    #[must_use]
    pub fn worst_scenario(&self, metric: ScenarioMetric) -> &ScenarioResult {
        self.extreme(metric, |candidate, current| candidate < current)
    }

    /// All scenarios from best to worst by `metric`, ties in declaration order
    #[must_use]
    pub fn ranking(&self, metric: ScenarioMetric) -> Vec<&ScenarioResult> {
        let mut ranked: Vec<&ScenarioResult> = self.results.iter().collect();
        ranked.sort_by(|a, b| metric.score(&b.outcomes).total_cmp(&metric.score(&a.outcomes)));
        ranked
    }

    fn extreme(
        &self,
        metric: ScenarioMetric,
        replaces: impl Fn(f64, f64) -> bool,
    ) -> &ScenarioResult {
        let mut chosen = &self.results[0];
        let mut chosen_score = metric.score(&chosen.outcomes);
        for result in &self.results[1..] {
            let score = metric.score(&result.outcomes);
            if replaces(score, chosen_score) {
                chosen = result;
                chosen_score = score;
            }
        }
        chosen
    }
}

/// Run every scenario for `iterations_per_scenario` iterations and collect
/// the outcomes.
///
/// Everything is validated before the first scenario is sampled. With no
/// seed, one is drawn once and shared by all scenarios.
pub fn compare_scenarios<S: AsRef<str>>(
    input_names: &[S],
    formula: &str,
    scenarios: &[Scenario],
    iterations_per_scenario: usize,
    seed: Option<u64>,
) -> Result<ScenarioComparison> {
    if scenarios.is_empty() {
        return Err(SimulationError::InvalidArgument(
            "at least one scenario is required".to_string(),
        ));
    }

    let mut seen = FxHashSet::default();
    for scenario in scenarios {
        if !seen.insert(scenario.name.as_str()) {
            return Err(SimulationError::InvalidArgument(format!(
                "duplicate scenario name '{}'",
                scenario.name
            )));
        }
        if scenario.values.len() != input_names.len() {
            return Err(SimulationError::InvalidArgument(format!(
                "scenario '{}' has {} values but {} inputs are declared",
                scenario.name,
                scenario.values.len(),
                input_names.len()
            )));
        }
    }

    let formula = Formula::parse(formula)?;
    let mut config = SimulationConfig::new(iterations_per_scenario);

    let runs = scenarios
        .iter()
        .map(|scenario| -> Result<(&str, Vec<SimulationInput>)> {
            let inputs = input_names
                .iter()
                .zip(&scenario.values)
                .map(|(name, value)| -> Result<SimulationInput> {
                    Ok(SimulationInput::new(name.as_ref(), value.to_distribution()?))
                })
                .collect::<Result<Vec<_>>>()?;
            validate(&inputs, &formula, &config)?;
            Ok((scenario.name.as_str(), inputs))
        })
        .collect::<Result<Vec<_>>>()?;

    let seed = resolve_seed(seed);
    config.seed = Some(seed);

    tracing::debug!(
        scenarios = scenarios.len(),
        iterations = iterations_per_scenario,
        seed,
        "Comparing scenarios"
    );

    let results = runs
        .into_iter()
        .map(|(name, inputs)| -> Result<ScenarioResult> {
            let outcomes = monte_carlo_simulate(&inputs, &formula, &config)?;
            Ok(ScenarioResult {
                name: name.to_string(),
                outcomes,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ScenarioComparison {
        input_names: input_names.iter().map(|n| n.as_ref().to_string()).collect(),
        iterations: iterations_per_scenario,
        seed,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_cases() -> ScenarioComparison {
        compare_scenarios(
            &["revenue", "costs"],
            "{0} - {1}",
            &[
                Scenario::fixed("Base", [300.0, 200.0]),
                Scenario::fixed("Best", [350.0, 200.0]),
                Scenario::fixed("Worst", [250.0, 200.0]),
            ],
            50,
            Some(1),
        )
        .unwrap()
    }

    #[test]
    fn test_best_and_worst_by_mean() {
        let comparison = three_cases();
        assert_eq!(comparison.get("Base").unwrap().mean(), 100.0);
        assert_eq!(comparison.best_scenario(ScenarioMetric::Mean).name, "Best");
        assert_eq!(comparison.worst_scenario(ScenarioMetric::Mean).name, "Worst");

        let ranking: Vec<_> = comparison
            .ranking(ScenarioMetric::Mean)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(ranking, ["Best", "Base", "Worst"]);
    }

    #[test]
    fn test_fixed_values_repeat() {
        let comparison = three_cases();
        let best = comparison.get("Best").unwrap();
        assert_eq!(best.len(), 50);
        assert!(best.values().iter().all(|v| *v == 150.0));
        assert_eq!(best.std_dev(), 0.0);
    }

    #[test]
    fn test_ties_go_to_earlier_scenario() {
        // Every fixed scenario has zero dispersion
        let comparison = three_cases();
        assert_eq!(comparison.best_scenario(ScenarioMetric::StdDev).name, "Base");
        assert_eq!(comparison.worst_scenario(ScenarioMetric::StdDev).name, "Base");
    }

    #[test]
    fn test_std_dev_prefers_less_dispersion() {
        let comparison = compare_scenarios(
            &["x"],
            "{0}",
            &[
                Scenario::uncertain("Wide", [Distribution::normal(100.0, 30.0).unwrap()]),
                Scenario::uncertain("Narrow", [Distribution::normal(100.0, 5.0).unwrap()]),
            ],
            2_000,
            Some(11),
        )
        .unwrap();

        assert_eq!(comparison.best_scenario(ScenarioMetric::StdDev).name, "Narrow");
        assert_eq!(comparison.worst_scenario(ScenarioMetric::StdDev).name, "Wide");
        assert_eq!(comparison.worst_scenario(ScenarioMetric::P5).name, "Wide");
        assert_eq!(comparison.best_scenario(ScenarioMetric::P95).name, "Wide");
    }

    #[test]
    fn test_scenarios_share_random_numbers() {
        let shifted = compare_scenarios(
            &["demand", "price"],
            "{0} * {1}",
            &[
                Scenario::new(
                    "Low price",
                    vec![
                        Distribution::uniform(80.0, 120.0).unwrap().into(),
                        ScenarioValue::Fixed(10.0),
                    ],
                ),
                Scenario::new(
                    "High price",
                    vec![
                        Distribution::uniform(80.0, 120.0).unwrap().into(),
                        ScenarioValue::Fixed(12.0),
                    ],
                ),
            ],
            500,
            Some(21),
        )
        .unwrap();

        let low = shifted.get("Low price").unwrap().values();
        let high = shifted.get("High price").unwrap().values();
        for (l, h) in low.iter().zip(high) {
            assert!((h / l - 1.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_arguments() {
        let names = ["a", "b"];
        assert!(matches!(
            compare_scenarios(&names, "{0}", &[], 10, Some(1)),
            Err(SimulationError::InvalidArgument(_))
        ));
        assert!(matches!(
            compare_scenarios(&names, "{0}", &[Scenario::fixed("Short", [1.0])], 10, Some(1)),
            Err(SimulationError::InvalidArgument(_))
        ));
        assert!(matches!(
            compare_scenarios(
                &names,
                "{0}",
                &[
                    Scenario::fixed("Same", [1.0, 2.0]),
                    Scenario::fixed("Same", [3.0, 4.0])
                ],
                10,
                Some(1)
            ),
            Err(SimulationError::InvalidArgument(_))
        ));
        assert!(matches!(
            compare_scenarios(
                &["a", "a"],
                "{0}",
                &[Scenario::fixed("S", [1.0, 2.0])],
                10,
                Some(1)
            ),
            Err(SimulationError::InvalidArgument(_))
        ));
        assert!(matches!(
            compare_scenarios(
                &names,
                "{0}",
                &[Scenario::fixed("S", [1.0, 2.0])],
                0,
                Some(1)
            ),
            Err(SimulationError::InvalidArgument(_))
        ));
        assert!(matches!(
            compare_scenarios(
                &names,
                "{0}",
                &[Scenario::fixed("S", [f64::NAN, 2.0])],
                10,
                Some(1)
            ),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_values_deserialize_fixed_or_distribution() {
        let json =
            r#"{"name":"Mixed","values":[150.0,{"type":"normal","mean":10.0,"std_dev":1.0}]}"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.values[0], ScenarioValue::Fixed(150.0));
        assert!(matches!(scenario.values[1], ScenarioValue::Uncertain(_)));
    }
}
