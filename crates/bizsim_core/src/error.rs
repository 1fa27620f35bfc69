use std::fmt;

/// Errors produced while parsing or evaluating a formula
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaError {
    /// The formula contains no tokens
    Empty,
    /// A character that is not part of the grammar
    UnexpectedChar { position: usize, found: char },
    /// A token that is valid on its own but not at this position
    UnexpectedToken { position: usize, found: String },
    /// The formula ended while an operand or `)` was still expected
    UnexpectedEnd,
    /// A numeric literal that could not be read as a number
    InvalidNumber { position: usize, text: String },
    /// A `{...}` placeholder whose contents are not a non-negative integer
    InvalidPlaceholder { position: usize, text: String },
    /// A placeholder refers to a value that was not supplied
    PlaceholderOutOfRange { index: usize, available: usize },
    /// Parentheses or unary operators nested beyond the supported depth
    TooDeep { limit: usize },
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaError::Empty => write!(f, "formula is empty"),
            FormulaError::UnexpectedChar { position, found } => {
                write!(f, "unexpected character '{found}' at position {position}")
            }
            FormulaError::UnexpectedToken { position, found } => {
                write!(f, "unexpected '{found}' at position {position}")
            }
            FormulaError::UnexpectedEnd => write!(f, "unexpected end of formula"),
            FormulaError::InvalidNumber { position, text } => {
                write!(f, "invalid number '{text}' at position {position}")
            }
            FormulaError::InvalidPlaceholder { position, text } => {
                write!(f, "invalid placeholder '{{{text}}}' at position {position}")
            }
            FormulaError::PlaceholderOutOfRange { index, available } => {
                write!(
                    f,
                    "placeholder {{{index}}} is out of range ({available} values supplied)"
                )
            }
            FormulaError::TooDeep { limit } => {
                write!(f, "formula nesting exceeds {limit} levels")
            }
        }
    }
}

impl std::error::Error for FormulaError {}

/// Errors returned by the simulation, sensitivity, tornado and scenario APIs
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A distribution parameter is outside its domain
    InvalidParameter {
        distribution: &'static str,
        reason: &'static str,
    },
    /// A call argument is unusable (counts, lengths, ranges, names)
    InvalidArgument(String),
    /// The formula could not be parsed or evaluated
    Formula(FormulaError),
    /// A sampler produced a non-finite value
    Numeric(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidParameter {
                distribution,
                reason,
            } => write!(f, "invalid {distribution} parameters: {reason}"),
            SimulationError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            SimulationError::Formula(e) => write!(f, "formula error: {e}"),
            SimulationError::Numeric(msg) => write!(f, "numeric error: {msg}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Formula(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormulaError> for SimulationError {
    fn from(err: FormulaError) -> Self {
        SimulationError::Formula(err)
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SimulationError::InvalidParameter {
            distribution: "normal",
            reason: "std_dev must be non-negative and finite",
        };
        assert_eq!(
            err.to_string(),
            "invalid normal parameters: std_dev must be non-negative and finite"
        );

        let err = SimulationError::from(FormulaError::PlaceholderOutOfRange {
            index: 3,
            available: 2,
        });
        assert_eq!(
            err.to_string(),
            "formula error: placeholder {3} is out of range (2 values supplied)"
        );
    }

    #[test]
    fn test_formula_error_is_source() {
        use std::error::Error;

        let err = SimulationError::Formula(FormulaError::UnexpectedEnd);
        assert!(err.source().is_some());
        assert!(SimulationError::Numeric("nan".into()).source().is_none());
    }
}
