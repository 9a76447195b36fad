//! Wallet RPC server binary
//!
//! Loads configuration, starts the service, and runs until a shutdown signal
//! arrives or a listener fails fatally.

use std::time::Duration;
use tracing::{error, info};
use wallet_rpc_server::shared::logging::LoggingUtils;
use wallet_rpc_server::{Api, AppConfig};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = LoggingUtils::initialize("info") {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting wallet RPC server...");

    let config = match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut api = match Api::new(&config).await {
        Ok(api) => {
            info!("Service initialized successfully");
            api
        }
        Err(e) => {
            error!("Failed to initialize service: {}", e);
            std::process::exit(1);
        }
    };

    let mut fatal = false;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        err = api.wait_fatal() => {
            error!("Fatal server error: {}", err);
            fatal = true;
        }
    }

    if let Err(e) = api.stop(SHUTDOWN_GRACE).await {
        error!("Shutdown finished with errors: {}", e);
        std::process::exit(1);
    }

    info!("Service shutdown complete");
    if fatal {
        std::process::exit(1);
    }
}
