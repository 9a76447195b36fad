//! Metrics module
//!
//! Request counters for both transports, exported in Prometheus text format
//! by the metrics listener.

use crate::shared::error::{AppError, AppResult};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Request outcome label values
pub mod outcome {
    pub const OK: &str = "ok";
    pub const BUSINESS_FAIL: &str = "business_fail";
    pub const ERROR: &str = "error";
    pub const TIMEOUT: &str = "timeout";
}

/// Application metrics backed by a dedicated Prometheus registry
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
}

impl Metrics {
    /// Create a new metrics instance with its own registry
    pub fn new() -> AppResult<Self> {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            Opts::new(
                "wallet_requests_total",
                "Total wallet requests by transport, method, and outcome",
            ),
            &["transport", "method", "outcome"],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create request counter: {}", e)))?;
        registry
            .register(Box::new(requests.clone()))
            .map_err(|e| AppError::Internal(format!("Failed to register request counter: {}", e)))?;

        Ok(Self { registry, requests })
    }

    /// Record a completed request
    pub fn record_request(&self, transport: &str, method: &str, outcome: &str) {
        self.requests
            .with_label_values(&[transport, method, outcome])
            .inc();
    }

    /// Render all registered metrics in Prometheus text exposition format
    pub fn render(&self) -> AppResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;
        String::from_utf8(buffer)
            .map_err(|e| AppError::Internal(format!("Metrics output was not UTF-8: {}", e)))
    }
}
