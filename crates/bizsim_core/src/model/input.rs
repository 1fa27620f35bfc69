use serde::{Deserialize, Serialize};

use super::distribution::{Distribution, DistributionParams};
use crate::error::Result;

/// A named uncertain input.
///
/// The position of an input within a run fixes the placeholder it binds to:
/// the first input is `{0}`, the second `{1}` and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub name: String,
    pub distribution: Distribution,
}

impl SimulationInput {
    pub fn new(name: impl Into<String>, distribution: Distribution) -> Self {
        Self {
            name: name.into(),
            distribution,
        }
    }

    /// Validate `params` and bind them to `name`
    pub fn from_params(name: impl Into<String>, params: DistributionParams) -> Result<Self> {
        Ok(Self::new(name, Distribution::new(params)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_params_validates() {
        let input = SimulationInput::from_params(
            "revenue",
            DistributionParams::Normal {
                mean: 1000.0,
                std_dev: 100.0,
            },
        )
        .unwrap();
        assert_eq!(input.name, "revenue");
        assert_eq!(input.distribution.name(), "normal");

        let inverted = DistributionParams::Uniform { min: 5.0, max: 1.0 };
        assert!(SimulationInput::from_params("costs", inverted).is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{"name":"churn","distribution":{"type":"beta","alpha":2.0,"beta":5.0}}"#;
        let input: SimulationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.name, "churn");
        assert_eq!(
            input.distribution.params(),
            &DistributionParams::Beta {
                alpha: 2.0,
                beta: 5.0
            }
        );

        let missing = r#"{"name":"churn","distribution":{"type":"beta","alpha":2.0}}"#;
        assert!(serde_json::from_str::<SimulationInput>(missing).is_err());
    }
}
