//! Process orchestrator
//!
//! Wires the database, dispatch service, and the three managed listeners
//! (REST, JSON-RPC, metrics) together, and owns their combined lifecycle.
//! Teardown never stops at the first failure: every component is asked to
//! stop and the failures are aggregated into one error.

use crate::config::AppConfig;
use crate::database::Database;
use crate::domain::{ChainValidator, Secp256k1Deriver};
use crate::server::managed::{ManagedServer, ServerOption};
use crate::services::dispatch::{DispatchService, WalletService};
use crate::services::{rest, rpc};
use crate::shared::error::{AppError, AppResult};
use crate::shared::metrics::Metrics;
use futures::future::select_all;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info};
use warp::filters::BoxedFilter;
use warp::http::header::CONTENT_TYPE;
use warp::reply::{Reply, Response};
use warp::Filter;

/// Teardown grace applied when startup fails partway through
const INIT_STOP_GRACE: Duration = Duration::from_secs(5);

/// Top-level service handle owning every long-lived component
pub struct Api {
    db: Option<Database>,
    rest_server: Option<ManagedServer>,
    rpc_server: Option<ManagedServer>,
    metrics_server: Option<ManagedServer>,
    fatal_rx: Vec<oneshot::Receiver<AppError>>,
    stopped: AtomicBool,
}

impl Api {
    /// Initialize every component from the configuration: database handle
    /// first, then the routers, then the listeners. When any step fails the
    /// components started so far are torn down and the startup error is
    /// returned together with any teardown failures.
    pub async fn new(cfg: &AppConfig) -> AppResult<Api> {
        let mut api = Api {
            db: None,
            rest_server: None,
            rpc_server: None,
            metrics_server: None,
            fatal_rx: Vec::new(),
            stopped: AtomicBool::new(false),
        };

        if let Err(err) = api.init_from_config(cfg).await {
            let mut errors = vec![err];
            if let Err(stop_err) = api.stop(INIT_STOP_GRACE).await {
                errors.push(stop_err);
            }
            return Err(AppError::aggregate(errors)
                .unwrap_or_else(|| AppError::Internal("initialization failed".to_string())));
        }

        Ok(api)
    }

    async fn init_from_config(&mut self, cfg: &AppConfig) -> AppResult<()> {
        self.db = Some(Database::connect(&cfg.database)?);
        info!("Database handle initialized");

        let metrics = Arc::new(Metrics::new()?);
        let svc = self.build_dispatch(cfg)?;

        let rest_routes = rest::routes(
            svc.clone(),
            metrics.clone(),
            Duration::from_secs(cfg.request_timeout_secs),
        );
        let rpc_routes = rpc::routes(svc, metrics.clone());
        let metrics_routes = metrics_routes(metrics);

        let rest = self
            .start_server("REST", &cfg.http_server.socket_addr()?, rest_routes)
            .await?;
        self.rest_server = Some(rest);

        let rpc = self
            .start_server("RPC", &cfg.rpc_server.socket_addr()?, rpc_routes)
            .await?;
        self.rpc_server = Some(rpc);

        let metrics = self
            .start_server("metrics", &cfg.metrics_server.socket_addr()?, metrics_routes)
            .await?;
        self.metrics_server = Some(metrics);

        Ok(())
    }

    fn build_dispatch(&self, cfg: &AppConfig) -> AppResult<Arc<dyn WalletService>> {
        let db = self
            .db
            .as_ref()
            .ok_or_else(|| AppError::Internal("database not initialized".to_string()))?;
        let validator = ChainValidator::from_config(&cfg.supported);
        Ok(Arc::new(DispatchService::new(
            validator,
            Arc::new(Secp256k1Deriver),
            db.keys(),
        )))
    }

    async fn start_server(
        &mut self,
        name: &str,
        addr: &SocketAddr,
        routes: BoxedFilter<(Response,)>,
    ) -> AppResult<ManagedServer> {
        let opts: Vec<ServerOption> = Vec::new();
        let (server, fatal) = ManagedServer::start(*addr, routes, opts).await?;
        info!(server = name, addr = %server.addr(), "Listener started");
        self.fatal_rx.push(fatal);
        Ok(server)
    }

    /// Stop every component, bounding each server shutdown by `timeout`.
    ///
    /// All components are stopped regardless of individual failures and the
    /// stopped flag is set unconditionally; the collected failures come back
    /// as a single aggregated error.
    pub async fn stop(&self, timeout: Duration) -> AppResult<()> {
        let mut errors = Vec::new();

        for (name, server) in [
            ("REST", &self.rest_server),
            ("RPC", &self.rpc_server),
            ("metrics", &self.metrics_server),
        ] {
            if let Some(server) = server {
                if let Err(err) = server.stop(timeout).await {
                    errors.push(AppError::Shutdown(format!(
                        "Failed to stop {} server: {}",
                        name, err
                    )));
                }
            }
        }

        if let Some(db) = &self.db {
            if let Err(err) = db.close().await {
                errors.push(err);
            }
        }

        self.stopped.store(true, Ordering::SeqCst);

        match AppError::aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Whether a stop attempt has completed, successfully or not
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Bound address of the REST listener, when running
    pub fn rest_addr(&self) -> Option<SocketAddr> {
        self.rest_server.as_ref().map(|s| s.addr())
    }

    /// Bound address of the JSON-RPC listener, when running
    pub fn rpc_addr(&self) -> Option<SocketAddr> {
        self.rpc_server.as_ref().map(|s| s.addr())
    }

    /// Bound address of the metrics listener, when running
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_server.as_ref().map(|s| s.addr())
    }

    /// Wait until any serve loop exits without a shutdown request.
    ///
    /// Resolves to the first fatal error reported by a listener. Pends
    /// forever when no listener ever fails.
    pub async fn wait_fatal(&mut self) -> AppError {
        let mut receivers: Vec<oneshot::Receiver<AppError>> = self.fatal_rx.drain(..).collect();
        loop {
            if receivers.is_empty() {
                futures::future::pending::<()>().await;
            }
            let (result, _index, rest) = select_all(receivers).await;
            receivers = rest;
            if let Ok(err) = result {
                error!(error = %err, "Listener reported a fatal error");
                return err;
            }
            // A dropped sender means that server stopped cleanly; keep
            // waiting on the remaining listeners.
        }
    }
}

/// Metrics listener router: `GET /metrics` in Prometheus text format
fn metrics_routes(metrics: Arc<Metrics>) -> BoxedFilter<(Response,)> {
    warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || metrics.clone()))
        .and_then(handle_metrics)
        .boxed()
}

async fn handle_metrics(metrics: Arc<Metrics>) -> Result<Response, warp::Rejection> {
    match metrics.render() {
        Ok(body) => Ok(warp::reply::with_header(
            body,
            CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )
        .into_response()),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            Ok(rest::internal_error_response())
        }
    }
}
