//! What-if analyses built on the formula evaluator and the Monte Carlo engine
//!
//! - `sensitivity` - sweep a single input across a range
//! - `tornado` - swing each variable between its bounds and rank the impact
//! - `scenario` - run discrete scenarios and compare their outcome distributions

mod scenario;
mod sensitivity;
mod tornado;

pub use scenario::{
    Scenario, ScenarioComparison, ScenarioMetric, ScenarioResult, ScenarioValue,
    compare_scenarios,
};
pub use sensitivity::{SensitivityAnalysis, SensitivityPoint, SensitivityRange, analyze_sensitivity};
pub use tornado::{TornadoAnalysis, TornadoImpact, TornadoVariable, analyze_tornado};
