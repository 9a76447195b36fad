//! JSON-RPC adapter
//!
//! Frames the two wallet operations as JSON-RPC 2.0 methods over a single
//! POST endpoint. Business-level failures still produce an RPC-level success
//! envelope; only transport problems (unknown method, malformed params,
//! dispatch errors) produce a JSON-RPC error object.

use crate::domain::models::{ChainRequest, SupportCoinsResponse, CODE_SUCCESS, MSG_SUCCESS};
use crate::services::dispatch::WalletService;
use crate::services::rest::json_response;
use crate::shared::logging::LoggingUtils;
use crate::shared::metrics::{outcome, Metrics};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::error;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Filter;

/// Support-check method name
pub const METHOD_GET_SUPPORT_COINS: &str = "GetSupportCoins";

/// Address-retrieval method name
pub const METHOD_GET_WALLET_ADDRESS: &str = "GetWalletAddress";

const TRANSPORT: &str = "rpc";
const MAX_REQUEST_SIZE: u64 = 64 * 1024;

/// JSON-RPC request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// JSON-RPC response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(result: Value, id: Option<Value>) -> Self {
        Self {
            jsonrpc: default_jsonrpc_version(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(error: JsonRpcError, id: Option<Value>) -> Self {
        Self {
            jsonrpc: default_jsonrpc_version(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
        }
    }

    pub fn invalid_params(reason: &str) -> Self {
        Self {
            code: -32602,
            message: format!("Invalid params: {}", reason),
        }
    }

    pub fn internal_error(reason: &str) -> Self {
        Self {
            code: -32603,
            message: format!("Internal error: {}", reason),
        }
    }
}

fn default_jsonrpc_version() -> String {
    "2.0".to_string()
}

/// Build the JSON-RPC router: a single POST endpoint at `/`.
pub fn routes(svc: Arc<dyn WalletService>, metrics: Arc<Metrics>) -> BoxedFilter<(Response,)> {
    warp::path::end()
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_REQUEST_SIZE))
        .and(warp::body::json())
        .and(with_service(svc))
        .and(with_metrics(metrics))
        .and_then(handle_rpc_request)
        .boxed()
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

async fn handle_rpc_request(
    request: JsonRpcRequest,
    svc: Arc<dyn WalletService>,
    metrics: Arc<Metrics>,
) -> Result<Response, warp::Rejection> {
    let request_id = LoggingUtils::generate_request_id();
    let id = request.id.clone();

    let params: ChainRequest = match request.params.clone() {
        Some(value) => match serde_json::from_value(value) {
            Ok(params) => params,
            Err(err) => {
                metrics.record_request(TRANSPORT, &request.method, outcome::ERROR);
                return Ok(rpc_reply(JsonRpcResponse::error(
                    JsonRpcError::invalid_params(&err.to_string()),
                    id,
                )));
            }
        },
        None => ChainRequest::default(),
    };
    LoggingUtils::log_request(
        &request_id,
        TRANSPORT,
        &request.method,
        &params.chain,
        &params.network,
    );

    match request.method.as_str() {
        METHOD_GET_SUPPORT_COINS => {
            match svc.get_support_coins(&params).await {
                Ok(resp) => {
                    metrics.record_request(TRANSPORT, METHOD_GET_SUPPORT_COINS, outcome::OK);
                    let result = SupportCoinsResponse {
                        code: CODE_SUCCESS.to_string(),
                        msg: MSG_SUCCESS.to_string(),
                        support: resp.support,
                    };
                    Ok(success_reply(&result, id))
                }
                Err(err) => {
                    LoggingUtils::log_error(&request_id, METHOD_GET_SUPPORT_COINS, &err);
                    metrics.record_request(TRANSPORT, METHOD_GET_SUPPORT_COINS, outcome::ERROR);
                    Ok(rpc_reply(JsonRpcResponse::error(
                        JsonRpcError::internal_error(&err.to_string()),
                        id,
                    )))
                }
            }
        }
        METHOD_GET_WALLET_ADDRESS => {
            match svc.get_wallet_address(&params).await {
                Ok(resp) => {
                    let result = if resp.code == CODE_SUCCESS {
                        outcome::OK
                    } else {
                        outcome::BUSINESS_FAIL
                    };
                    metrics.record_request(TRANSPORT, METHOD_GET_WALLET_ADDRESS, result);
                    Ok(success_reply(&resp, id))
                }
                Err(err) => {
                    LoggingUtils::log_error(&request_id, METHOD_GET_WALLET_ADDRESS, &err);
                    metrics.record_request(TRANSPORT, METHOD_GET_WALLET_ADDRESS, outcome::ERROR);
                    Ok(rpc_reply(JsonRpcResponse::error(
                        JsonRpcError::internal_error(&err.to_string()),
                        id,
                    )))
                }
            }
        }
        other => {
            metrics.record_request(TRANSPORT, "unknown", outcome::ERROR);
            Ok(rpc_reply(JsonRpcResponse::error(
                JsonRpcError::method_not_found(other),
                id,
            )))
        }
    }
}

fn success_reply<T: Serialize>(result: &T, id: Option<Value>) -> Response {
    match serde_json::to_value(result) {
        Ok(value) => rpc_reply(JsonRpcResponse::success(value, id)),
        Err(err) => {
            error!(error = %err, "Failed to serialize RPC result");
            rpc_reply(JsonRpcResponse::error(
                JsonRpcError::internal_error("result serialization failed"),
                id,
            ))
        }
    }
}

fn rpc_reply(response: JsonRpcResponse) -> Response {
    // RPC-level status is always 200; failures live in the envelope.
    json_response(&response, StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dispatch::test_support::{dispatch_with, FailingDeriver, FixedDeriver};
    use std::time::Duration;

    fn test_routes(deriver: Arc<dyn crate::domain::AddressDeriver>) -> BoxedFilter<(Response,)> {
        let svc = Arc::new(dispatch_with(deriver));
        let metrics = Arc::new(Metrics::new().unwrap());
        routes(svc, metrics)
    }

    fn rpc_body(method: &str, chain: &str, network: &str) -> Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": {"chain": chain, "network": network},
            "id": 1,
        })
    }

    async fn call(routes: &BoxedFilter<(Response,)>, body: Value) -> (StatusCode, Value) {
        let res = warp::test::request()
            .method("POST")
            .path("/")
            .json(&body)
            .reply(routes)
            .await;
        let status = res.status();
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_get_support_coins_supported() {
        let routes = test_routes(Arc::new(FixedDeriver));
        let (status, body) =
            call(&routes, rpc_body("GetSupportCoins", "Bitcoin", "MainNet")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["code"], "200");
        assert_eq!(body["result"]["support"], true);
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn test_get_support_coins_unsupported_is_rpc_success() {
        let routes = test_routes(Arc::new(FixedDeriver));
        let (status, body) =
            call(&routes, rpc_body("GetSupportCoins", "Dogecoin", "MainNet")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("error").is_none());
        assert_eq!(body["result"]["support"], false);
    }

    #[tokio::test]
    async fn test_get_wallet_address_success() {
        let routes = test_routes(Arc::new(FixedDeriver));
        let (status, body) =
            call(&routes, rpc_body("GetWalletAddress", "Ethereum", "MainNet")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["code"], "200");
        assert_eq!(
            body["result"]["address"],
            "0x1111111111111111111111111111111111111111"
        );
        assert_eq!(body["result"]["publicKey"], "04deadbeef");
    }

    #[tokio::test]
    async fn test_get_wallet_address_derivation_failure_is_rpc_success() {
        let routes = test_routes(Arc::new(FailingDeriver));
        let (status, body) =
            call(&routes, rpc_body("GetWalletAddress", "Ethereum", "MainNet")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("error").is_none());
        assert_eq!(body["result"]["code"], "400");
        assert_eq!(body["result"]["msg"], "create address fail");
        assert_eq!(body["result"]["address"], "");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let routes = test_routes(Arc::new(FixedDeriver));
        let (status, body) = call(&routes, rpc_body("GetBalance", "Bitcoin", "MainNet")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_missing_params_defaults_to_unsupported() {
        let routes = test_routes(Arc::new(FixedDeriver));
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "GetSupportCoins",
            "id": 7,
        });
        let (status, body) = call(&routes, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["support"], false);
        assert_eq!(body["id"], 7);
    }

    #[tokio::test]
    async fn test_malformed_params_is_invalid_params_error() {
        let routes = test_routes(Arc::new(FixedDeriver));
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "GetSupportCoins",
            "params": "not an object",
            "id": 2,
        });
        let (status, body) = call(&routes, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_concurrent_rpc_calls() {
        let routes = Arc::new(test_routes(Arc::new(FixedDeriver)));
        let mut handles = Vec::new();
        for i in 0..16 {
            let routes = routes.clone();
            handles.push(tokio::spawn(async move {
                let method = if i % 2 == 0 {
                    "GetSupportCoins"
                } else {
                    "GetWalletAddress"
                };
                call(routes.as_ref(), rpc_body(method, "Bitcoin", "MainNet")).await
            }));
        }
        for handle in handles {
            let (status, body) =
                tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
            assert_eq!(status, StatusCode::OK);
            assert!(body.get("error").is_none());
        }
    }
}
