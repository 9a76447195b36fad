//! Error handling module
//!
//! This module provides centralized error handling for the application.

use thiserror::Error;

/// Application error types
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Derivation error: {0}")]
    Derivation(String),

    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Server option error: {0}")]
    ServerOption(String),

    #[error("Shutdown error: {0}")]
    Shutdown(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON serialization error: {0}")]
    Json(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("{}", format_aggregate(.0))]
    Aggregate(Vec<AppError>),
}

impl AppError {
    /// Combine a list of errors into a single error value.
    ///
    /// Returns `None` when the list is empty, the error itself when there is
    /// exactly one, and an [`AppError::Aggregate`] otherwise. Used at the
    /// orchestrator boundary where several teardown steps may each fail and
    /// none of the failures may be dropped.
    pub fn aggregate(errors: Vec<AppError>) -> Option<AppError> {
        let mut errors: Vec<AppError> = errors
            .into_iter()
            .flat_map(|e| match e {
                AppError::Aggregate(inner) => inner,
                other => vec![other],
            })
            .collect();
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(AppError::Aggregate(errors)),
        }
    }
}

fn format_aggregate(errors: &[AppError]) -> String {
    let parts: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    format!("multiple errors: {}", parts.join("; "))
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
