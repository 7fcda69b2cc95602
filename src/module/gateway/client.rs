use crate::domain::{CalculationRequest, OperationType};
use crate::library::communication::request::{RequestError, Requestor};
use bigdecimal::BigDecimal;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Outcome of a calculation that did not produce a result
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalculationFailure {
    /// The calculator processed the request and reported an error, or the request could not be sent
    #[error("{0}")]
    Failed(String),
    /// No reply arrived in time
    #[error("Calculator service did not respond in time")]
    Timeout,
}

impl From<RequestError> for CalculationFailure {
    fn from(error: RequestError) -> Self {
        match error {
            RequestError::Timeout(_) => Self::Timeout,
            RequestError::SendingFailure(cause) => {
                Self::Failed(format!("Failed to process calculation: {}", cause))
            }
            RequestError::RegistrationFailed(cause) => {
                Self::Failed(format!("Failed to process calculation: {}", cause))
            }
        }
    }
}

/// Synchronous facade for calculations performed by remote workers
pub struct CalculatorClient<R> {
    requestor: R,
    timeout: Duration,
}

impl<R> CalculatorClient<R>
where
    R: Requestor<CalculationRequest> + Send + Sync,
{
    /// Creates a new client which waits at most `timeout` for each reply
    pub fn new(requestor: R, timeout: Duration) -> Self {
        Self { requestor, timeout }
    }

    /// Calculates `a <operation> b` using a random request identifier
    pub async fn calculate(
        &self,
        operation: OperationType,
        a: BigDecimal,
        b: BigDecimal,
    ) -> Result<BigDecimal, CalculationFailure> {
        self.call(CalculationRequest::with_random_id(operation, a, b))
            .await
    }

    /// Sends the request and waits for its result using the default timeout
    pub async fn call(&self, request: CalculationRequest) -> Result<BigDecimal, CalculationFailure> {
        self.call_within(request, self.timeout).await
    }

    /// Sends the request and waits at most `timeout` for its result
    pub async fn call_within(
        &self,
        request: CalculationRequest,
        timeout: Duration,
    ) -> Result<BigDecimal, CalculationFailure> {
        debug!(request_id = %request.request_id, operation = %request.operation, "Requesting calculation");

        let response = self
            .requestor
            .request(&request, timeout)
            .await
            .map_err(|error| {
                warn!(request_id = %request.request_id, %error, "Calculation request failed");
                CalculationFailure::from(error)
            })?;

        response.into_result().map_err(CalculationFailure::Failed)
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::CalculationResponse;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    enum Behaviour {
        Answer,
        Refuse,
        Ignore,
        Unreachable,
    }

    struct StubRequestor {
        behaviour: Behaviour,
        seen: Mutex<Vec<CalculationRequest>>,
    }

    impl StubRequestor {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Requestor<CalculationRequest> for StubRequestor {
        async fn request(
            &self,
            request: &CalculationRequest,
            timeout: Duration,
        ) -> Result<CalculationResponse, RequestError> {
            self.seen.lock().unwrap().push(request.clone());
            let id = request.request_id.clone();

            match self.behaviour {
                Behaviour::Answer => Ok(CalculationResponse::success(id, 42.into())),
                Behaviour::Refuse => Ok(CalculationResponse::failure(id, "nope")),
                Behaviour::Ignore => Err(RequestError::Timeout(timeout)),
                Behaviour::Unreachable => Err(RequestError::SendingFailure("bus is down".into())),
            }
        }
    }

    fn client(behaviour: Behaviour) -> CalculatorClient<StubRequestor> {
        CalculatorClient::new(StubRequestor::new(behaviour), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn return_results() {
        let client = client(Behaviour::Answer);
        let result = client
            .calculate(OperationType::Sum, 40.into(), 2.into())
            .await;

        assert_eq!(result, Ok(BigDecimal::from(42)));

        let seen = client.requestor.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].request_id.is_empty());
    }

    #[tokio::test]
    async fn forward_worker_errors() {
        let result = client(Behaviour::Refuse)
            .calculate(OperationType::Divide, 1.into(), 0.into())
            .await;

        assert_eq!(result, Err(CalculationFailure::Failed("nope".into())));
    }

    #[tokio::test]
    async fn distinguish_timeouts() {
        let result = client(Behaviour::Ignore)
            .calculate(OperationType::Sum, 1.into(), 2.into())
            .await;

        assert_eq!(result, Err(CalculationFailure::Timeout));
        assert_eq!(
            CalculationFailure::Timeout.to_string(),
            "Calculator service did not respond in time"
        );
    }

    #[tokio::test]
    async fn report_sending_failures() {
        let result = client(Behaviour::Unreachable)
            .calculate(OperationType::Sum, 1.into(), 2.into())
            .await;

        assert_eq!(
            result,
            Err(CalculationFailure::Failed(
                "Failed to process calculation: bus is down".into()
            ))
        );
    }
}
