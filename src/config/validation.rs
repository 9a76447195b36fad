//! Configuration validation module
//!
//! This module provides additional validation logic for configuration
//! beyond the basic validator crate validation.

use crate::config::AppConfig;
use crate::shared::error::AppError;

/// Configuration validator for cross-field validation logic
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the complete configuration
    pub fn validate_config(config: &AppConfig) -> crate::Result<()> {
        Self::validate_listener_ports(config)?;
        Self::validate_supported_sets(config)?;
        Ok(())
    }

    /// The three listeners must not share a port on the same host.
    fn validate_listener_ports(config: &AppConfig) -> crate::Result<()> {
        let listeners = [
            ("http_server", &config.http_server),
            ("rpc_server", &config.rpc_server),
            ("metrics_server", &config.metrics_server),
        ];
        for (i, (name_a, a)) in listeners.iter().enumerate() {
            for (name_b, b) in listeners.iter().skip(i + 1) {
                // Port 0 is ephemeral and never collides.
                if a.port != 0 && a.port == b.port && a.host == b.host {
                    return Err(AppError::Validation(format!(
                        "{} and {} are both configured for {}:{}",
                        name_a, name_b, a.host, a.port
                    )));
                }
            }
        }
        Ok(())
    }

    /// Supported chain/network entries must be non-empty strings.
    fn validate_supported_sets(config: &AppConfig) -> crate::Result<()> {
        if config.supported.chains.iter().any(|c| c.trim().is_empty()) {
            return Err(AppError::Validation(
                "Supported chain names must be non-empty".to_string(),
            ));
        }
        if config.supported.networks.iter().any(|n| n.trim().is_empty()) {
            return Err(AppError::Validation(
                "Supported network names must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}
