use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Arithmetic operation supported by the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    /// Addition of both operands
    Sum,
    /// Subtraction of the second operand from the first
    Subtract,
    /// Multiplication of both operands
    Multiply,
    /// Division of the first operand by the second
    Divide,
}

impl OperationType {
    /// All operations in their canonical order
    pub const ALL: [OperationType; 4] = [Self::Sum, Self::Subtract, Self::Multiply, Self::Divide];

    /// Mathematical symbol of the operation
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Sum => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }

    /// Human readable name
    pub fn description(&self) -> &'static str {
        match self {
            Self::Sum => "Addition",
            Self::Subtract => "Subtraction",
            Self::Multiply => "Multiplication",
            Self::Divide => "Division",
        }
    }

    /// Wire tag used when transmitting the operation
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Subtract => "SUBTRACT",
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.symbol())
    }
}

/// Operation name could not be recognized
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

impl FromStr for OperationType {
    type Err = UnknownOperation;

    /// Parses both the wire tag and the lowercase route name (e.g. `SUM` or `sum`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|operation| operation.tag().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownOperation(s.to_owned()))
    }
}

/// Operation as it has been received over the wire
///
/// Tags which are not part of [`OperationType`] are retained so that they can be
/// reported back to the requesting party instead of failing to decode the whole message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationTag {
    /// Operation supported by this version
    Known(OperationType),
    /// Any other tag
    Unknown(String),
}

impl From<OperationType> for OperationTag {
    fn from(operation: OperationType) -> Self {
        Self::Known(operation)
    }
}

impl fmt::Display for OperationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(operation) => write!(f, "{}", operation.tag()),
            Self::Unknown(tag) => write!(f, "{}", tag),
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serialize_screaming_tags() {
        assert_eq!(
            serde_json::to_string(&OperationType::Multiply).unwrap(),
            "\"MULTIPLY\""
        );
        assert_eq!(
            serde_json::from_str::<OperationType>("\"SUBTRACT\"").unwrap(),
            OperationType::Subtract
        );
    }

    #[test]
    fn keep_unknown_tags() {
        assert_eq!(
            serde_json::from_str::<OperationTag>("\"DIVIDE\"").unwrap(),
            OperationTag::Known(OperationType::Divide)
        );
        assert_eq!(
            serde_json::from_str::<OperationTag>("\"MODULO\"").unwrap(),
            OperationTag::Unknown("MODULO".into())
        );
    }

    #[test]
    fn parse_route_names() {
        assert_eq!("sum".parse(), Ok(OperationType::Sum));
        assert_eq!("DIVIDE".parse(), Ok(OperationType::Divide));
        assert_eq!(
            "power".parse::<OperationType>(),
            Err(UnknownOperation("power".into()))
        );
    }

    #[test]
    fn display_with_symbol() {
        assert_eq!(OperationType::Sum.to_string(), "Addition (+)");
        assert_eq!(OperationType::Divide.to_string(), "Division (/)");
        assert_eq!(OperationTag::from(OperationType::Sum).to_string(), "SUM");
    }
}
