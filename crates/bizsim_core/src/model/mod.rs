//! Data types shared by the engine and the analyzers

mod distribution;
mod input;
mod outcome;

pub use distribution::{Distribution, DistributionParams};
pub use input::SimulationInput;
pub use outcome::OutcomeSet;
