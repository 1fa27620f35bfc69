//! Tests for the Builder DSL
//!
//! These tests demonstrate and verify the fluent builder API for creating simulations.

use crate::config::{SimulationBuilder, SimulationConfig};
use crate::error::SimulationError;
use crate::model::{Distribution, DistributionParams};
use crate::simulation::run;

/// Test basic SimulationBuilder usage
#[test]
fn test_simulation_builder_basic() {
    let simulation = SimulationBuilder::new()
        .input(
            "revenue",
            DistributionParams::Normal {
                mean: 1000.0,
                std_dev: 100.0,
            },
        )
        .input(
            "costs",
            DistributionParams::Uniform {
                min: 600.0,
                max: 800.0,
            },
        )
        .formula("{0} - {1}")
        .iterations(5_000)
        .seed(42)
        .build()
        .unwrap();

    let outcomes = simulation.run().unwrap();
    assert_eq!(outcomes.len(), 5_000);
    // 1000 - 700 on average
    assert!((outcomes.mean() - 300.0).abs() < 5.0);
}

/// The builder and the free function produce identical runs
#[test]
fn test_builder_matches_direct_run() {
    let simulation = SimulationBuilder::new()
        .input("units", DistributionParams::Geometric { probability: 0.2 })
        .fixed("price", 12.5)
        .formula("{0} * {1}")
        .iterations(777)
        .seed(99)
        .build()
        .unwrap();

    let direct = run(simulation.inputs(), "{0} * {1}", 777, Some(99)).unwrap();
    assert_eq!(simulation.run().unwrap(), direct);
}

/// Default configuration applies when iterations are not set
#[test]
fn test_builder_defaults() {
    let simulation = SimulationBuilder::new()
        .fixed("x", 1.0)
        .formula("{0} + 1")
        .build()
        .unwrap();

    assert_eq!(simulation.config(), &SimulationConfig::default());
    let outcomes = simulation.run().unwrap();
    assert_eq!(outcomes.len(), 10_000);
    assert!(outcomes.values().iter().all(|v| *v == 2.0));
}

/// Validated distributions can be passed straight in
#[test]
fn test_builder_with_distribution() {
    let churn = Distribution::new(DistributionParams::Beta {
        alpha: 2.0,
        beta: 18.0,
    })
    .unwrap();

    let simulation = SimulationBuilder::new()
        .fixed("customers", 10_000.0)
        .distribution("churn", &churn)
        .formula("{0} * (1 - {1})")
        .config(SimulationConfig::new(2_000).with_seed(1))
        .build()
        .unwrap();

    assert_eq!(simulation.inputs()[1].distribution, churn);
    let outcomes = simulation.run().unwrap();
    assert!(outcomes.values().iter().all(|v| (0.0..=10_000.0).contains(v)));
    // Mean churn is 0.1
    assert!((outcomes.mean() - 9_000.0).abs() < 80.0);
}

/// Duplicate input names are rejected at build time
#[test]
fn test_builder_rejects_duplicates() {
    let err = SimulationBuilder::new()
        .fixed("x", 1.0)
        .fixed("x", 2.0)
        .formula("{0} + {1}")
        .build()
        .unwrap_err();
    assert!(matches!(err, SimulationError::InvalidArgument(_)));
}
