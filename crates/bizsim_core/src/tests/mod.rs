//! Integration tests for the bizsim simulation engine
//!
//! Tests are organized by topic:
//! - `distributions` - Sample moments of every family against theory
//! - `engine` - Engine properties: lengths, degenerate inputs, reproducibility
//! - `risk` - Probability queries, VaR/CVaR and histograms on simulated outcomes
//! - `analyses` - Sensitivity, tornado and scenario workflows end to end
//! - `builder_dsl` - Builder DSL for fluent simulation setup

mod analyses;
mod builder_dsl;
mod engine;
