//! Wallet RPC Server - a wallet-information query service
//!
//! This library exposes a small wallet query API over two transports (a
//! REST/JSON API and a JSON-RPC endpoint), backed by a chain/network
//! validator and an address-derivation step. Both transports share a single
//! dispatch service, and every listening socket is owned by a managed
//! server with explicit lifecycle control.

pub mod config;
pub mod database;
pub mod domain;
pub mod server;
pub mod services;
pub mod shared;

#[cfg(test)]
pub mod tests;

pub use config::AppConfig;
pub use server::{Api, ManagedServer};
pub use shared::error::{AppError, AppResult};

/// Application result type
pub type Result<T> = std::result::Result<T, shared::error::AppError>;
