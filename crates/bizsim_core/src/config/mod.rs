//! Run configuration
//!
//! [`SimulationConfig`] holds the knobs shared by every Monte Carlo run
//! (iteration count and seed). For an ergonomic way to assemble a complete
//! run, use the builder DSL:
//!
//! ```ignore
//! use bizsim_core::config::SimulationBuilder;
//! use bizsim_core::model::DistributionParams;
//!
//! let outcomes = SimulationBuilder::new()
//!     .input("revenue", DistributionParams::Normal { mean: 1000.0, std_dev: 100.0 })
//!     .input("costs", DistributionParams::Uniform { min: 600.0, max: 800.0 })
//!     .formula("{0} - {1}")
//!     .iterations(10_000)
//!     .seed(42)
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

pub mod builder;

pub use builder::SimulationBuilder;

/// Iterations used when none are given
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Upper bound on the iterations of a single run
pub const MAX_ITERATIONS: usize = 1_000_000;

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

/// Iteration count and seeding of a Monte Carlo run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Fixed seed for reproducible runs; drawn from the thread RNG when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: None,
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            seed: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the iteration count lies in `[1, MAX_ITERATIONS]`
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(SimulationError::InvalidArgument(format!(
                "iterations must be between 1 and {MAX_ITERATIONS}, got {}",
                self.iterations
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_bounds() {
        assert!(SimulationConfig::new(1).validate().is_ok());
        assert!(SimulationConfig::new(MAX_ITERATIONS).validate().is_ok());
        assert!(SimulationConfig::new(0).validate().is_err());
        assert!(SimulationConfig::new(MAX_ITERATIONS + 1).validate().is_err());
    }

    #[test]
    fn test_defaults_apply_when_deserializing() {
        let config: SimulationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.iterations, 10_000);
        assert_eq!(config.seed, None);

        let config: SimulationConfig =
            serde_json::from_str(r#"{"iterations":500,"seed":7}"#).unwrap();
        assert_eq!(config, SimulationConfig::new(500).with_seed(7));
    }
}
