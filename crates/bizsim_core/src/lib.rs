//! Monte Carlo simulation, sensitivity and scenario engine
//!
//! This crate samples uncertain business inputs from parametric
//! distributions, evaluates a small arithmetic formula against every draw and
//! summarizes the outcomes. It supports:
//! - Sixteen distribution families, validated at construction
//! - Formulas over positional placeholders (`{0} * ({1} - {2})`)
//! - Outcome statistics: percentiles, confidence intervals, VaR/CVaR, histograms
//! - One-dimensional sensitivity sweeps
//! - Tornado ranking of input impacts
//! - Comparison of discrete what-if scenarios
//!
//! # Builder DSL
//!
//! ```ignore
//! use bizsim_core::SimulationBuilder;
//! use bizsim_core::model::DistributionParams;
//!
//! let outcomes = SimulationBuilder::new()
//!     .input("revenue", DistributionParams::Normal { mean: 1000.0, std_dev: 100.0 })
//!     .input("costs", DistributionParams::Uniform { min: 600.0, max: 800.0 })
//!     .formula("{0} - {1}")
//!     .seed(42)
//!     .build()?
//!     .run()?;
//!
//! let var = outcomes.value_at_risk(0.95)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod error;
pub mod formula;
pub mod simulation;
pub mod stats;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{SimulationBuilder, SimulationConfig};
pub use error::{FormulaError, Result, SimulationError};
pub use formula::Formula;
pub use model::{Distribution, DistributionParams, OutcomeSet, SimulationInput};
pub use simulation::{Simulation, monte_carlo_simulate, resolve_seed};
