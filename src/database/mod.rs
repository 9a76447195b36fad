//! Database collaborator
//!
//! The dispatch layer only sees the [`KeysView`] trait; the Postgres pool
//! behind it is an external collaborator whose query mechanics are not part
//! of this service's core. The pool connects lazily, so constructing the
//! handle validates the URL without touching the network.

use crate::config::DatabaseConfig;
use crate::shared::error::{AppError, AppResult};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Stored key material for a (chain, network) pair
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeyRecord {
    pub chain: String,
    pub network: String,
    pub private_key: String,
}

/// Read-only view over stored key material
#[async_trait]
pub trait KeysView: Send + Sync {
    /// Fetch the most recent key record for the pair, if any
    async fn key_for(&self, chain: &str, network: &str) -> AppResult<Option<KeyRecord>>;
}

/// Postgres-backed database handle
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a lazily connecting pool from the configuration
    pub fn connect(cfg: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy(&cfg.url())
            .map_err(|e| AppError::Database(format!("Failed to create pool: {}", e)))?;
        Ok(Self { pool })
    }

    /// Key-material view handed to the dispatch layer
    pub fn keys(&self) -> Arc<dyn KeysView> {
        Arc::new(PgKeysView {
            pool: self.pool.clone(),
        })
    }

    /// Close the pool, waiting for checked-out connections to be returned
    pub async fn close(&self) -> AppResult<()> {
        self.pool.close().await;
        info!("Database pool closed");
        Ok(())
    }
}

struct PgKeysView {
    pool: PgPool,
}

#[async_trait]
impl KeysView for PgKeysView {
    async fn key_for(&self, chain: &str, network: &str) -> AppResult<Option<KeyRecord>> {
        sqlx::query_as::<_, KeyRecord>(
            "SELECT chain, network, private_key FROM keys \
             WHERE chain = $1 AND network = $2 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(chain)
        .bind(network)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Key lookup failed: {}", e)))
    }
}
