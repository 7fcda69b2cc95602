use super::{CalculationFailure, CalculatorClient};
use crate::constants::REQUEST_ID_HEADER;
use crate::domain::{decimal, CalculationRequest, OperationType};
use crate::library::communication::request::Requestor;
use crate::library::EmptyResult;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use jatsl::{Job, JobManager};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// HTTP interface exposing the calculator
pub struct ServerJob<R> {
    port: u16,
    service: &'static str,
    client: Arc<CalculatorClient<R>>,
}

impl<R> ServerJob<R> {
    /// Creates a new job serving on `port`, reporting `service` as its name in health info
    pub fn new(port: u16, service: &'static str, client: CalculatorClient<R>) -> Self {
        Self {
            port,
            service,
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl<R> Job for ServerJob<R>
where
    R: Requestor<CalculationRequest> + Send + Sync + 'static,
{
    const NAME: &'static str = module_path!();
    const SUPPORTS_GRACEFUL_TERMINATION: bool = true;

    async fn execute(&self, manager: JobManager) -> EmptyResult {
        let source_addr: SocketAddr = ([0, 0, 0, 0], self.port).into();
        let (addr, server) = warp::serve(routes(self.client.clone(), self.service))
            .try_bind_with_graceful_shutdown(source_addr, manager.termination_signal())?;

        info!(?addr, "Serving calculator API");
        manager.ready().await;
        server.await;

        Ok(())
    }
}

/// Builds all routes served by the gateway
pub fn routes<R>(
    client: Arc<CalculatorClient<R>>,
    service: &'static str,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    R: Requestor<CalculationRequest> + Send + Sync + 'static,
{
    let health_route = warp::get()
        .and(warp::path("health"))
        .and(warp::path::end())
        .map(|| warp::reply::json(&json!({ "status": "UP" })))
        .with(warp::trace::named("health"));

    let info_route = warp::get()
        .and(warp::path!("health" / "info"))
        .map(move || {
            warp::reply::json(&json!({
                "status": "UP",
                "service": service,
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": Utc::now().to_rfc3339(),
            }))
        })
        .with(warp::trace::named("info"));

    let client = warp::any().map(move || client.clone());
    let calculation_route = warp::get()
        .and(warp::path::param::<OperationType>())
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::header::optional::<String>(REQUEST_ID_HEADER))
        .and(client)
        .and_then(calculate::<R>)
        .with(warp::trace::named("calculate"));

    health_route
        .or(info_route)
        .or(calculation_route)
        .with(warp::trace::request())
}

async fn calculate<R>(
    operation: OperationType,
    query: HashMap<String, String>,
    request_id: Option<String>,
    client: Arc<CalculatorClient<R>>,
) -> Result<impl Reply, Infallible>
where
    R: Requestor<CalculationRequest> + Send + Sync,
{
    let request_id = request_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = info_span!("request", %request_id, %operation);
    let (status, body) = evaluate(operation, &query, request_id.clone(), &client)
        .instrument(span)
        .await;

    let reply = warp::reply::with_status(warp::reply::json(&body), status);
    Ok(warp::reply::with_header(reply, REQUEST_ID_HEADER, request_id))
}

async fn evaluate<R>(
    operation: OperationType,
    query: &HashMap<String, String>,
    request_id: String,
    client: &CalculatorClient<R>,
) -> (StatusCode, Value)
where
    R: Requestor<CalculationRequest> + Send + Sync,
{
    let operands = operand(query, "a").and_then(|a| Ok((a, operand(query, "b")?)));
    let (a, b) = match operands {
        Ok(operands) => operands,
        Err(message) => {
            info!(error = %message, "Rejecting malformed request");
            return (StatusCode::BAD_REQUEST, json!({ "error": message }));
        }
    };

    let request = CalculationRequest::new(request_id, operation, a, b);

    match client.call(request).await {
        Ok(result) => {
            info!(%result, "Calculation completed");
            (StatusCode::OK, json!({ "result": decimal::to_text(&result) }))
        }
        Err(failure @ CalculationFailure::Failed(_)) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": failure.to_string() }),
        ),
        Err(failure @ CalculationFailure::Timeout) => (
            StatusCode::GATEWAY_TIMEOUT,
            json!({ "error": failure.to_string() }),
        ),
    }
}

fn operand(query: &HashMap<String, String>, name: &str) -> Result<BigDecimal, String> {
    let value = query
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("Missing required parameter: {}", name))?;

    let value = BigDecimal::from_str(value)
        .map_err(|_| format!("Invalid value for parameter '{}': must be a valid number", name))?;

    decimal::as_operand(value).ok_or_else(|| {
        format!(
            "Invalid value for parameter '{}': exponent exceeds {}",
            name,
            decimal::OPERAND_EXPONENT_LIMIT
        )
    })
}
