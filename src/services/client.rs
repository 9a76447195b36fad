//! Outbound wallet client
//!
//! HTTP client wrapper for downstream consumers of the REST API. Mirrors the
//! two wallet operations; any HTTP status >= 400 is surfaced as an error
//! before the body is interpreted.

use crate::domain::models::{SupportChainResponse, WalletAddressResponse};
use crate::shared::error::{AppError, AppResult};
use std::time::Duration;

const SUPPORT_CHAIN_PATH: &str = "/api/v1/support_chain";
const WALLET_ADDRESS_PATH: &str = "/api/v1/wallet_address";

/// Client for the wallet REST API
pub struct WalletClient {
    http: reqwest::Client,
    base_url: String,
}

impl WalletClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Whether the service supports the given chain and network
    pub async fn get_support_coins(&self, chain: &str, network: &str) -> AppResult<bool> {
        let resp: SupportChainResponse = self.get_json(SUPPORT_CHAIN_PATH, chain, network).await?;
        Ok(resp.support)
    }

    /// Fetch a wallet address for the given chain and network.
    ///
    /// The embedded `code` carries the business outcome; callers must branch
    /// on it rather than on the returned error.
    pub async fn get_wallet_address(
        &self,
        chain: &str,
        network: &str,
    ) -> AppResult<WalletAddressResponse> {
        self.get_json(WALLET_ADDRESS_PATH, chain, network).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        chain: &str,
        network: &str,
    ) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(&[("chain", chain), ("network", network)])
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(AppError::Http(format!(
                "{} cannot GET {}",
                status.as_u16(),
                url
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Json(format!("Failed to decode response from {}: {}", url, e)))
    }
}
