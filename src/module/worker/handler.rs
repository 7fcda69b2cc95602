use crate::domain::{CalculationRequest, CalculationResponse, Calculator};
use crate::library::communication::request::RequestProcessor;
use crate::library::helpers::panic_message;
use async_trait::async_trait;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::task;
use tracing::{info, info_span, warn};

const ABORTED: &str = "Calculation aborted unexpectedly";

/// Facade between the message bus and the [`Calculator`]
///
/// Every failure, including panics raised while calculating, is converted into a
/// failed [`CalculationResponse`] so nothing escapes towards the transport.
#[derive(Debug, Default, Clone)]
pub struct CalculationRequestHandler {
    calculator: Calculator,
}

impl CalculationRequestHandler {
    /// Creates a new handler using the given engine
    pub fn new(calculator: Calculator) -> Self {
        Self { calculator }
    }

    /// Evaluates the request and wraps the outcome into a response
    pub fn handle(&self, request: &CalculationRequest) -> CalculationResponse {
        info!(operation = %request.operation, a = %request.a, b = %request.b, "Processing calculation");

        let evaluation = catch_unwind(AssertUnwindSafe(|| {
            self.calculator
                .evaluate(&request.operation, &request.a, &request.b)
        }));

        match evaluation {
            Ok(Ok(result)) => {
                info!(%result, "Calculation successful");
                CalculationResponse::success(request.request_id.clone(), result)
            }
            Ok(Err(error)) => {
                warn!(%error, "Calculation failed");
                CalculationResponse::failure(request.request_id.clone(), error.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref())
                    .unwrap_or_else(|| ABORTED.to_owned());
                warn!(error = %message, "Calculation panicked");
                CalculationResponse::failure(request.request_id.clone(), message)
            }
        }
    }
}

#[async_trait]
impl RequestProcessor for CalculationRequestHandler {
    type Request = CalculationRequest;

    async fn process(&self, request: CalculationRequest) -> CalculationResponse {
        let span = info_span!("calculate", request_id = %request.request_id);
        let request_id = request.request_id.clone();
        let handler = self.clone();

        // Cost grows with the operand digits, keep it off the async workers
        match task::spawn_blocking(move || span.in_scope(|| handler.handle(&request))).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "Calculation task failed");
                CalculationResponse::failure(request_id, ABORTED.to_owned())
            }
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::{decimal, CalculationOutcome, OperationTag, OperationType};
    use bigdecimal::BigDecimal;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn request(operation: OperationType, a: &str, b: &str) -> CalculationRequest {
        CalculationRequest::new(
            "r-1",
            operation,
            BigDecimal::from_str(a).unwrap(),
            BigDecimal::from_str(b).unwrap(),
        )
    }

    fn result(response: CalculationResponse) -> String {
        decimal::to_text(&response.into_result().unwrap())
    }

    #[test]
    fn answer_every_operation() {
        let handler = CalculationRequestHandler::default();

        assert_eq!(result(handler.handle(&request(OperationType::Sum, "10", "5"))), "15");
        assert_eq!(result(handler.handle(&request(OperationType::Subtract, "10", "5"))), "5");
        assert_eq!(result(handler.handle(&request(OperationType::Multiply, "10", "5"))), "50");
        assert_eq!(result(handler.handle(&request(OperationType::Divide, "10", "4"))), "2.5");
    }

    #[test]
    fn keep_request_id() {
        let handler = CalculationRequestHandler::default();
        let response = handler.handle(&request(OperationType::Divide, "1", "0"));

        assert_eq!(response.request_id, "r-1");
    }

    #[test]
    fn report_division_by_zero() {
        let handler = CalculationRequestHandler::default();
        let response = handler.handle(&request(OperationType::Divide, "10", "0"));

        assert_eq!(
            response.outcome,
            CalculationOutcome::Failure("Division by zero is not allowed".into())
        );
        assert_eq!(response.result(), None);
    }

    #[test]
    fn report_unsupported_operations() {
        let handler = CalculationRequestHandler::default();
        let mut request = request(OperationType::Sum, "1", "2");
        request.operation = OperationTag::Unknown("POWER".into());

        assert_eq!(
            handler.handle(&request).error(),
            Some("Unsupported operation: POWER")
        );
    }

    #[tokio::test]
    async fn process_through_trait() {
        let handler = CalculationRequestHandler::default();
        let response = handler
            .process(request(OperationType::Multiply, "999999999999", "999999999999"))
            .await;

        assert_eq!(result(response), "999999999998000000000001");
    }

    #[tokio::test]
    async fn process_huge_exponents_off_the_async_workers() {
        let handler = CalculationRequestHandler::default();

        let sum = handler
            .process(request(OperationType::Sum, "1e1000000000", "1"))
            .await;
        let product = handler
            .process(request(OperationType::Multiply, "1e1000000000", "1"))
            .await;

        assert_eq!(result(sum), "1e1000000000");
        assert_eq!(result(product), "1e1000000000");
    }
}
