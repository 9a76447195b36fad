//! REST adapter
//!
//! Translates HTTP requests into dispatch-service calls. Responses are JSON
//! with HTTP 200 on the happy path; the embedded `code` carries the
//! business-level status. A handler always writes a response: dispatch errors
//! become a fixed 500 body instead of a silently dropped reply.

use crate::domain::models::ChainRequest;
use crate::services::dispatch::WalletService;
use crate::shared::logging::LoggingUtils;
use crate::shared::metrics::{outcome, Metrics};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use warp::filters::BoxedFilter;
use warp::http::{header::CONTENT_TYPE, StatusCode};
use warp::reply::{Reply, Response};
use warp::Filter;

/// Liveness endpoint path
pub const HEALTH_PATH: &str = "health";

/// Fixed body emitted when response serialization fails
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Fixed body emitted when a request exceeds its processing budget
pub const REQUEST_TIMEOUT: &str = "Request timeout";

const TRANSPORT: &str = "rest";

/// Build the REST router: `/health`, `/api/v1/support_chain`, and
/// `/api/v1/wallet_address`.
pub fn routes(
    svc: Arc<dyn WalletService>,
    metrics: Arc<Metrics>,
    request_timeout: Duration,
) -> BoxedFilter<(Response,)> {
    let health = warp::path(HEALTH_PATH)
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handle_health);

    let support_chain = warp::path!("api" / "v1" / "support_chain")
        .and(warp::get())
        .and(warp::query::<ChainRequest>())
        .and(with_service(svc.clone()))
        .and(with_metrics(metrics.clone()))
        .and(with_timeout(request_timeout))
        .and_then(handle_support_chain);

    let wallet_address = warp::path!("api" / "v1" / "wallet_address")
        .and(warp::get())
        .and(warp::query::<ChainRequest>())
        .and(with_service(svc))
        .and(with_metrics(metrics))
        .and(with_timeout(request_timeout))
        .and_then(handle_wallet_address);

    health
        .or(support_chain)
        .unify()
        .or(wallet_address)
        .unify()
        .boxed()
}

/// Serialize `data` as a JSON response with the given transport status.
///
/// On serialization failure the underlying error is logged and a fixed
/// plain-text 500 body is written instead.
pub(crate) fn json_response<T: Serialize>(data: &T, status: StatusCode) -> Response {
    match serde_json::to_string(data) {
        Ok(body) => {
            let reply = warp::reply::with_header(body, CONTENT_TYPE, "application/json");
            warp::reply::with_status(reply, status).into_response()
        }
        Err(err) => {
            error!(error = %err, "Error writing response");
            internal_error_response()
        }
    }
}

pub(crate) fn internal_error_response() -> Response {
    warp::reply::with_status(INTERNAL_SERVER_ERROR, StatusCode::INTERNAL_SERVER_ERROR)
        .into_response()
}

fn timeout_response() -> Response {
    warp::reply::with_status(REQUEST_TIMEOUT, StatusCode::GATEWAY_TIMEOUT).into_response()
}

fn with_service(
    svc: Arc<dyn WalletService>,
) -> impl Filter<Extract = (Arc<dyn WalletService>,), Error = Infallible> + Clone {
    warp::any().map(move || svc.clone())
}

fn with_metrics(
    metrics: Arc<Metrics>,
) -> impl Filter<Extract = (Arc<Metrics>,), Error = Infallible> + Clone {
    warp::any().map(move || metrics.clone())
}

fn with_timeout(
    timeout: Duration,
) -> impl Filter<Extract = (Duration,), Error = Infallible> + Clone {
    warp::any().map(move || timeout)
}

async fn handle_health() -> Result<Response, warp::Rejection> {
    let body = serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    Ok(json_response(&body, StatusCode::OK))
}

/// Handle `GET /api/v1/support_chain?chain=&network=`
async fn handle_support_chain(
    req: ChainRequest,
    svc: Arc<dyn WalletService>,
    metrics: Arc<Metrics>,
    timeout: Duration,
) -> Result<Response, warp::Rejection> {
    const METHOD: &str = "support_chain";
    let request_id = LoggingUtils::generate_request_id();
    LoggingUtils::log_request(&request_id, TRANSPORT, METHOD, &req.chain, &req.network);

    match tokio::time::timeout(timeout, svc.get_support_coins(&req)).await {
        Ok(Ok(resp)) => {
            metrics.record_request(TRANSPORT, METHOD, outcome::OK);
            Ok(json_response(&resp, StatusCode::OK))
        }
        Ok(Err(err)) => {
            LoggingUtils::log_error(&request_id, METHOD, &err);
            metrics.record_request(TRANSPORT, METHOD, outcome::ERROR);
            Ok(internal_error_response())
        }
        Err(_) => {
            LoggingUtils::log_timeout(&request_id, METHOD);
            metrics.record_request(TRANSPORT, METHOD, outcome::TIMEOUT);
            Ok(timeout_response())
        }
    }
}

/// Handle `GET /api/v1/wallet_address?chain=&network=`
async fn handle_wallet_address(
    req: ChainRequest,
    svc: Arc<dyn WalletService>,
    metrics: Arc<Metrics>,
    timeout: Duration,
) -> Result<Response, warp::Rejection> {
    const METHOD: &str = "wallet_address";
    let request_id = LoggingUtils::generate_request_id();
    LoggingUtils::log_request(&request_id, TRANSPORT, METHOD, &req.chain, &req.network);

    match tokio::time::timeout(timeout, svc.get_wallet_address(&req)).await {
        Ok(Ok(resp)) => {
            let result = if resp.code == crate::domain::models::CODE_SUCCESS {
                outcome::OK
            } else {
                outcome::BUSINESS_FAIL
            };
            metrics.record_request(TRANSPORT, METHOD, result);
            Ok(json_response(&resp, StatusCode::OK))
        }
        Ok(Err(err)) => {
            LoggingUtils::log_error(&request_id, METHOD, &err);
            metrics.record_request(TRANSPORT, METHOD, outcome::ERROR);
            Ok(internal_error_response())
        }
        Err(_) => {
            LoggingUtils::log_timeout(&request_id, METHOD);
            metrics.record_request(TRANSPORT, METHOD, outcome::TIMEOUT);
            Ok(timeout_response())
        }
    }
}
