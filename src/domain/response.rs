use super::decimal;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::Error;

const UNKNOWN_FAILURE: &str = "Unknown error";

/// Result of a calculation
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationOutcome {
    /// Calculation succeeded with the contained value
    Success(BigDecimal),
    /// Calculation failed for the contained reason
    Failure(String),
}

/// Response to a [`CalculationRequest`](super::CalculationRequest)
///
/// On the wire it carries either a `result` or an `error` field, never both and never neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResponseFrame", into = "ResponseFrame")]
pub struct CalculationResponse {
    /// Identifier copied from the originating request
    pub request_id: String,

    /// Result or error message
    pub outcome: CalculationOutcome,
}

impl CalculationResponse {
    /// Creates a successful response
    pub fn success(request_id: impl Into<String>, result: BigDecimal) -> Self {
        Self {
            request_id: request_id.into(),
            outcome: CalculationOutcome::Success(result),
        }
    }

    /// Creates a failed response, substituting a generic message if the given one is blank
    pub fn failure(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNKNOWN_FAILURE.to_owned()
        } else {
            message
        };

        Self {
            request_id: request_id.into(),
            outcome: CalculationOutcome::Failure(message),
        }
    }

    /// Value of a successful calculation
    pub fn result(&self) -> Option<&BigDecimal> {
        match &self.outcome {
            CalculationOutcome::Success(result) => Some(result),
            CalculationOutcome::Failure(_) => None,
        }
    }

    /// Message of a failed calculation
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            CalculationOutcome::Success(_) => None,
            CalculationOutcome::Failure(message) => Some(message),
        }
    }

    /// Converts the outcome into a [`Result`]
    pub fn into_result(self) -> Result<BigDecimal, String> {
        match self.outcome {
            CalculationOutcome::Success(result) => Ok(result),
            CalculationOutcome::Failure(message) => Err(message),
        }
    }
}

/// Wire representation of a [`CalculationResponse`]
#[derive(Serialize, Deserialize)]
struct ResponseFrame {
    request_id: String,

    #[serde(with = "decimal::option", default, skip_serializing_if = "Option::is_none")]
    result: Option<BigDecimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Response carried both or neither of its outcome fields
#[derive(Debug, Error, PartialEq, Eq)]
#[error("response must carry exactly one of result or error")]
pub struct AmbiguousResponse;

impl TryFrom<ResponseFrame> for CalculationResponse {
    type Error = AmbiguousResponse;

    fn try_from(frame: ResponseFrame) -> Result<Self, Self::Error> {
        let error = frame.error.filter(|message| !message.is_empty());

        let outcome = match (frame.result, error) {
            (Some(result), None) => CalculationOutcome::Success(result),
            (None, Some(message)) => CalculationOutcome::Failure(message),
            _ => return Err(AmbiguousResponse),
        };

        Ok(Self {
            request_id: frame.request_id,
            outcome,
        })
    }
}

impl From<CalculationResponse> for ResponseFrame {
    fn from(response: CalculationResponse) -> Self {
        let (result, error) = match response.outcome {
            CalculationOutcome::Success(result) => (Some(result), None),
            CalculationOutcome::Failure(message) => (None, Some(message)),
        };

        Self {
            request_id: response.request_id,
            result,
            error,
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn encode_success_without_error_field() {
        let response = CalculationResponse::success("r-1", 15.into());

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "request_id": "r-1", "result": "15" })
        );
    }

    #[test]
    fn encode_failure_without_result_field() {
        let response = CalculationResponse::failure("r-1", "Division by zero is not allowed");

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "request_id": "r-1", "error": "Division by zero is not allowed" })
        );
    }

    #[test]
    fn reject_ambiguous_payloads() {
        let both = json!({ "request_id": "r-1", "result": "1", "error": "boom" });
        let neither = json!({ "request_id": "r-1" });
        let blank_error = json!({ "request_id": "r-1", "error": "" });

        assert!(serde_json::from_value::<CalculationResponse>(both).is_err());
        assert!(serde_json::from_value::<CalculationResponse>(neither).is_err());
        assert!(serde_json::from_value::<CalculationResponse>(blank_error).is_err());
    }

    #[test]
    fn accept_null_for_absent_fields() {
        let response: CalculationResponse =
            serde_json::from_value(json!({ "request_id": "r-1", "result": "2.5", "error": null }))
                .unwrap();

        assert_eq!(response.result().map(|r| r.to_plain_string()), Some("2.5".into()));
        assert_eq!(response.error(), None);
    }

    #[test]
    fn never_carry_blank_errors() {
        let response = CalculationResponse::failure("r-1", "  ");

        assert_eq!(response.error(), Some(UNKNOWN_FAILURE));
        assert_eq!(response.into_result(), Err(UNKNOWN_FAILURE.to_owned()));
    }
}
