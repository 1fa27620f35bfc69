//! Simulation Builder
//!
//! The SimulationBuilder provides a fluent API for assembling a Monte Carlo
//! run. Inputs are registered by name in placeholder order; parameters are
//! only validated when [`SimulationBuilder::build`] is called, so a chain of
//! calls never has to be interrupted by error handling.
//!
//! # Example
//!
//! ```ignore
//! use bizsim_core::config::SimulationBuilder;
//! use bizsim_core::model::DistributionParams;
//!
//! let simulation = SimulationBuilder::new()
//!     // {0}
//!     .input("units", DistributionParams::Triangular { min: 800.0, mode: 1000.0, max: 1500.0 })
//!     // {1}
//!     .input("price", DistributionParams::Normal { mean: 25.0, std_dev: 2.0 })
//!     // {2}
//!     .fixed("fixed_costs", 12_000.0)
//!     .formula("{0} * {1} - {2}")
//!     .iterations(50_000)
//!     .seed(7)
//!     .build()?;
//!
//! let outcomes = simulation.run()?;
//! ```

use super::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::formula::Formula;
use crate::model::{Distribution, DistributionParams, SimulationInput};
use crate::simulation::Simulation;

/// Builder for a validated [`Simulation`]
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    config: SimulationConfig,
    formula: Option<String>,
    pending_inputs: Vec<PendingInput>,
}

#[derive(Debug, Clone)]
struct PendingInput {
    name: String,
    params: DistributionParams,
}

impl SimulationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an uncertain input; its position fixes its placeholder index
    #[must_use]
    pub fn input(mut self, name: impl Into<String>, params: DistributionParams) -> Self {
        self.pending_inputs.push(PendingInput {
            name: name.into(),
            params,
        });
        self
    }

    /// Add an already validated distribution
    #[must_use]
    pub fn distribution(self, name: impl Into<String>, distribution: &Distribution) -> Self {
        self.input(name, *distribution.params())
    }

    /// Add an input that takes the same value every iteration
    #[must_use]
    pub fn fixed(self, name: impl Into<String>, value: f64) -> Self {
        self.input(name, DistributionParams::Fixed { value })
    }

    #[must_use]
    pub fn formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    #[must_use]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Replace iterations and seed in one go
    #[must_use]
    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate every input, parse the formula and check the run is well formed.
    pub fn build(self) -> Result<Simulation> {
        let formula = self.formula.ok_or_else(|| {
            SimulationError::InvalidArgument("a formula is required".to_string())
        })?;
        let formula = Formula::parse(&formula)?;

        let inputs = self
            .pending_inputs
            .into_iter()
            .map(|pending| SimulationInput::from_params(pending.name, pending.params))
            .collect::<Result<Vec<_>>>()?;

        Simulation::new(inputs, formula, self.config)
    }
}
