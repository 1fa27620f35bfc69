//! Monte Carlo engine
//!
//! Iterations are grouped into batches of [`BATCH_SIZE`]. A master `StdRng`
//! seeded from the run seed hands every batch its own seed, and each batch
//! samples from a private `SmallRng`. Batches are merged in order, so a seed
//! produces the same outcomes whether batches run on the rayon pool or on
//! the calling thread.

use rand::rngs::{SmallRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::formula::Formula;
use crate::model::{OutcomeSet, SimulationInput};

/// Iterations drawn from a single batch PRNG
pub const BATCH_SIZE: usize = 100;

/// A validated run: inputs, formula and configuration
#[derive(Debug, Clone)]
pub struct Simulation {
    inputs: Vec<SimulationInput>,
    formula: Formula,
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(
        inputs: Vec<SimulationInput>,
        formula: Formula,
        config: SimulationConfig,
    ) -> Result<Self> {
        validate(&inputs, &formula, &config)?;
        Ok(Self {
            inputs,
            formula,
            config,
        })
    }

    #[must_use]
    pub fn inputs(&self) -> &[SimulationInput] {
        &self.inputs
    }

    #[must_use]
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(&self) -> Result<OutcomeSet> {
        monte_carlo_simulate(&self.inputs, &self.formula, &self.config)
    }
}

/// Check a run is well formed before anything is sampled.
pub fn validate(
    inputs: &[SimulationInput],
    formula: &Formula,
    config: &SimulationConfig,
) -> Result<()> {
    if inputs.is_empty() {
        return Err(SimulationError::InvalidArgument(
            "at least one input is required".to_string(),
        ));
    }

    let mut seen = FxHashSet::default();
    for input in inputs {
        if !seen.insert(input.name.as_str()) {
            return Err(SimulationError::InvalidArgument(format!(
                "duplicate input name '{}'",
                input.name
            )));
        }
    }

    if formula.arity() > inputs.len() {
        return Err(SimulationError::InvalidArgument(format!(
            "formula references {{{}}} but only {} inputs are defined",
            formula.arity() - 1,
            inputs.len()
        )));
    }

    config.validate()
}

/// Run `config.iterations` iterations, each drawing one sample per input (in
/// order) and evaluating `formula` against them.
///
/// Non-finite formula results (e.g. a division by zero) are kept as
/// outcomes. A non-finite sample is reported as [`SimulationError::Numeric`].
pub fn monte_carlo_simulate(
    inputs: &[SimulationInput],
    formula: &Formula,
    config: &SimulationConfig,
) -> Result<OutcomeSet> {
    validate(inputs, formula, config)?;

    let iterations = config.iterations;
    let seed = resolve_seed(config.seed);
    let num_batches = iterations.div_ceil(BATCH_SIZE);

    tracing::debug!(
        iterations,
        inputs = inputs.len(),
        formula = formula.source(),
        seed,
        "Starting Monte Carlo simulation"
    );

    let mut master = StdRng::seed_from_u64(seed);
    let batch_seeds: Vec<u64> = (0..num_batches).map(|_| master.next_u64()).collect();

    let batch_size = |i: usize| {
        if i == num_batches - 1 {
            iterations - i * BATCH_SIZE
        } else {
            BATCH_SIZE
        }
    };

    #[cfg(feature = "parallel")]
    let batches: Vec<Result<Vec<f64>>> = batch_seeds
        .par_iter()
        .enumerate()
        .map(|(i, &batch_seed)| simulate_batch(inputs, formula, batch_seed, batch_size(i)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let batches: Vec<Result<Vec<f64>>> = batch_seeds
        .iter()
        .enumerate()
        .map(|(i, &batch_seed)| simulate_batch(inputs, formula, batch_seed, batch_size(i)))
        .collect();

    let mut values = Vec::with_capacity(iterations);
    for batch in batches {
        values.extend(batch?);
    }

    let non_finite = values.iter().filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        tracing::warn!(
            non_finite,
            iterations,
            formula = formula.source(),
            "Formula produced non-finite outcomes"
        );
    }

    OutcomeSet::new(values)
}

/// Convenience wrapper: parse `formula` and run with the given iterations and seed.
pub fn run(
    inputs: &[SimulationInput],
    formula: &str,
    iterations: usize,
    seed: Option<u64>,
) -> Result<OutcomeSet> {
    let formula = Formula::parse(formula)?;
    let config = SimulationConfig { iterations, seed };
    monte_carlo_simulate(inputs, &formula, &config)
}

/// Use `seed` when given, otherwise draw one from the thread RNG and log it.
///
/// Callers that must report the seed a run used resolve it up front and pass
/// the result as an explicit seed.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed = rand::rng().random::<u64>();
        tracing::info!(seed, "No seed supplied, drew one from the thread RNG");
        seed
    })
}

fn simulate_batch(
    inputs: &[SimulationInput],
    formula: &Formula,
    seed: u64,
    size: usize,
) -> Result<Vec<f64>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut samples = vec![0.0; inputs.len()];
    let mut stack = Vec::new();
    let mut outcomes = Vec::with_capacity(size);

    for _ in 0..size {
        for (slot, input) in samples.iter_mut().zip(inputs) {
            let sample = input.distribution.sample(&mut rng);
            if !sample.is_finite() {
                return Err(SimulationError::Numeric(format!(
                    "input '{}' ({}) produced a non-finite sample",
                    input.name,
                    input.distribution.name()
                )));
            }
            *slot = sample;
        }
        outcomes.push(formula.run(&samples, &mut stack));
    }

    Ok(outcomes)
}
