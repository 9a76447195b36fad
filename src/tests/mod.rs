//! End-to-end tests over real sockets
//!
//! Unlike the per-module tests, these start actual listeners on ephemeral
//! ports and drive them through real HTTP clients.

use crate::config::AppConfig;
use crate::server::{Api, ManagedServer};
use crate::services::dispatch::test_support::{dispatch_with, FixedDeriver};
use crate::services::{rest, rpc, WalletClient};
use crate::shared::metrics::Metrics;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const STOP_GRACE: Duration = Duration::from_secs(5);

async fn start_rest_server() -> ManagedServer {
    let svc = Arc::new(dispatch_with(Arc::new(FixedDeriver)));
    let metrics = Arc::new(Metrics::new().unwrap());
    let routes = rest::routes(svc, metrics, Duration::from_secs(12));
    let (server, _fatal) =
        ManagedServer::start("127.0.0.1:0".parse().unwrap(), routes, Vec::new())
            .await
            .unwrap();
    server
}

async fn start_rpc_server() -> ManagedServer {
    let svc = Arc::new(dispatch_with(Arc::new(FixedDeriver)));
    let metrics = Arc::new(Metrics::new().unwrap());
    let routes = rpc::routes(svc, metrics);
    let (server, _fatal) =
        ManagedServer::start("127.0.0.1:0".parse().unwrap(), routes, Vec::new())
            .await
            .unwrap();
    server
}

fn ephemeral_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.http_server.port = 0;
    cfg.rpc_server.port = 0;
    cfg.metrics_server.port = 0;
    cfg
}

#[tokio::test]
async fn test_rest_support_chain_over_socket() {
    let server = start_rest_server().await;
    let url = format!(
        "http://{}/api/v1/support_chain?chain=Ethereum&network=TestNet",
        server.addr()
    );

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["support"], true);

    server.stop(STOP_GRACE).await.unwrap();
}

#[tokio::test]
async fn test_rest_health_over_socket() {
    let server = start_rest_server().await;
    let url = format!("http://{}/health", server.addr());

    let body: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(body["status"], "healthy");

    server.stop(STOP_GRACE).await.unwrap();
}

#[tokio::test]
async fn test_rest_server_refuses_after_stop() {
    let server = start_rest_server().await;
    let url = format!("http://{}/health", server.addr());
    server.stop(STOP_GRACE).await.unwrap();
    assert!(server.closed());

    assert!(reqwest::get(&url).await.is_err());
}

#[tokio::test]
async fn test_wallet_client_round_trip() {
    let server = start_rest_server().await;
    let client = WalletClient::new(format!("http://{}", server.addr())).unwrap();

    assert!(client.get_support_coins("Bitcoin", "MainNet").await.unwrap());
    assert!(!client.get_support_coins("Dogecoin", "MainNet").await.unwrap());

    let address = client.get_wallet_address("Ethereum", "MainNet").await.unwrap();
    assert_eq!(address.code, "200");
    assert_eq!(address.msg, "success");
    assert_eq!(address.address, "0x1111111111111111111111111111111111111111");
    assert_eq!(address.public_key, "04deadbeef");

    server.stop(STOP_GRACE).await.unwrap();
}

#[tokio::test]
async fn test_wallet_client_surfaces_http_errors() {
    let server = start_rest_server().await;
    // Point the client at a path prefix the server does not serve.
    let client = WalletClient::new(format!("http://{}/missing", server.addr())).unwrap();

    let err = client.get_support_coins("Bitcoin", "MainNet").await;
    assert!(err.is_err());

    server.stop(STOP_GRACE).await.unwrap();
}

#[tokio::test]
async fn test_rpc_get_support_coins_over_socket() {
    let server = start_rpc_server().await;
    let url = format!("http://{}/", server.addr());

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .json(&json!({
            "jsonrpc": "2.0",
            "method": "GetSupportCoins",
            "params": {"chain": "Bitcoin", "network": "MainNet"},
            "id": 1
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["support"], true);
    assert_eq!(body["result"]["code"], "200");

    server.stop(STOP_GRACE).await.unwrap();
}

#[tokio::test]
async fn test_rpc_get_wallet_address_over_socket() {
    let server = start_rpc_server().await;
    let url = format!("http://{}/", server.addr());

    let client = reqwest::Client::new();
    let body: Value = client
        .post(&url)
        .json(&json!({
            "jsonrpc": "2.0",
            "method": "GetWalletAddress",
            "params": {"chain": "Ethereum", "network": "TestNet"},
            "id": 2
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["result"]["code"], "200");
    assert_eq!(
        body["result"]["address"],
        "0x1111111111111111111111111111111111111111"
    );
    assert_eq!(body["result"]["publicKey"], "04deadbeef");

    server.stop(STOP_GRACE).await.unwrap();
}

#[tokio::test]
async fn test_full_service_over_ephemeral_ports() {
    let api = Api::new(&ephemeral_config()).await.unwrap();
    let rest_addr = api.rest_addr().unwrap();
    let metrics_addr = api.metrics_addr().unwrap();

    // Production deriver generates a fresh secp256k1 key per request.
    let client = WalletClient::new(format!("http://{}", rest_addr)).unwrap();
    let address = client.get_wallet_address("Ethereum", "MainNet").await.unwrap();
    assert_eq!(address.code, "200");
    assert!(address.address.starts_with("0x"));
    assert_eq!(address.address.len(), 42);
    assert_eq!(address.public_key.len(), 128);

    // The request above must be visible on the metrics listener.
    let metrics_body = reqwest::get(format!("http://{}/metrics", metrics_addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics_body.contains("wallet_requests_total"));

    api.stop(STOP_GRACE).await.unwrap();
    assert!(api.stopped());
}
