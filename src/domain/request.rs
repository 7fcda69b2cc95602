use super::{decimal, CalculationResponse, OperationTag, OperationType};
use crate::constants::{QUEUE_CALCULATION_REQUESTS, QUEUE_LIMIT};
use crate::library::communication::event::{Notification, QueueDescriptor};
use crate::library::communication::request::Request;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to apply an arithmetic operation to two operands
///
/// The `request_id` is used for tracing a calculation across services. It is unrelated to
/// the [`CorrelationId`](crate::library::communication::request::CorrelationId) which
/// matches replies on the message bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationRequest {
    /// Identifier for end-to-end tracing
    pub request_id: String,

    /// Operation to apply
    pub operation: OperationTag,

    /// First operand
    #[serde(with = "decimal::operand")]
    pub a: BigDecimal,

    /// Second operand
    #[serde(with = "decimal::operand")]
    pub b: BigDecimal,
}

impl CalculationRequest {
    /// Creates a new instance from raw parts
    pub fn new(
        request_id: impl Into<String>,
        operation: OperationType,
        a: BigDecimal,
        b: BigDecimal,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            operation: operation.into(),
            a,
            b,
        }
    }

    /// Creates a new instance with a random request identifier
    pub fn with_random_id(operation: OperationType, a: BigDecimal, b: BigDecimal) -> Self {
        Self::new(Uuid::new_v4().to_string(), operation, a, b)
    }
}

impl Notification for CalculationRequest {
    fn queue() -> QueueDescriptor {
        QueueDescriptor::new(QUEUE_CALCULATION_REQUESTS.into(), QUEUE_LIMIT)
    }
}

impl Request for CalculationRequest {
    type Response = CalculationResponse;
}
