//! Logging utilities module
//!
//! This module provides centralized logging initialization and helpers.

use tracing::{error, info, warn};

/// Logging utilities for the application
pub struct LoggingUtils;

impl LoggingUtils {
    /// Initialize logging with the specified default level.
    ///
    /// `RUST_LOG` takes precedence over the configured level when set.
    pub fn initialize(level: &str) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            crate::shared::error::AppError::Internal(format!("Failed to initialize logging: {}", e))
        })?;

        Ok(())
    }

    /// Log an inbound wallet request with structured data
    pub fn log_request(request_id: &str, transport: &str, method: &str, chain: &str, network: &str) {
        info!(
            request_id = %request_id,
            transport = %transport,
            method = %method,
            chain = %chain,
            network = %network,
            "Processing wallet request"
        );
    }

    /// Log a failed request
    pub fn log_error(request_id: &str, method: &str, error: &crate::shared::error::AppError) {
        error!(
            request_id = %request_id,
            method = %method,
            error = %error,
            "Request failed"
        );
    }

    /// Log a request that exceeded its processing budget
    pub fn log_timeout(request_id: &str, method: &str) {
        warn!(
            request_id = %request_id,
            method = %method,
            "Request timed out"
        );
    }

    /// Generate a unique request ID
    pub fn generate_request_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
