//! Dispatch service
//!
//! Composes the chain validator, the address-derivation collaborator, and the
//! key-material view into the two wallet operations shared by both protocol
//! adapters.

use crate::database::KeysView;
use crate::domain::models::{ChainRequest, SupportChainResponse, WalletAddressResponse};
use crate::domain::{AddressDeriver, ChainValidator};
use crate::shared::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Shared wallet operations consumed by every protocol adapter
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Whether the given chain and network are supported.
    ///
    /// The error channel is reserved; the current implementation always
    /// succeeds and expresses absence of support as `support = false`.
    async fn get_support_coins(&self, req: &ChainRequest) -> AppResult<SupportChainResponse>;

    /// Derive a wallet address for the given chain and network.
    ///
    /// Derivation failure is reported in-band: the returned payload carries
    /// code 400 with empty address fields and the call still returns `Ok`.
    /// Callers must branch on the embedded code, not on the error.
    async fn get_wallet_address(&self, req: &ChainRequest) -> AppResult<WalletAddressResponse>;
}

/// Production dispatch service
pub struct DispatchService {
    validator: ChainValidator,
    deriver: Arc<dyn AddressDeriver>,
    // Reserved for key-material lookups; derivation currently generates a
    // fresh key per request and nothing is persisted in this layer.
    #[allow(dead_code)]
    keys: Arc<dyn KeysView>,
}

impl DispatchService {
    pub fn new(
        validator: ChainValidator,
        deriver: Arc<dyn AddressDeriver>,
        keys: Arc<dyn KeysView>,
    ) -> Self {
        Self {
            validator,
            deriver,
            keys,
        }
    }
}

#[async_trait]
impl WalletService for DispatchService {
    async fn get_support_coins(&self, req: &ChainRequest) -> AppResult<SupportChainResponse> {
        Ok(SupportChainResponse {
            support: self.validator.is_supported(&req.chain, &req.network),
        })
    }

    async fn get_wallet_address(&self, req: &ChainRequest) -> AppResult<WalletAddressResponse> {
        match self.deriver.create_address_from_private_key() {
            Ok(addr) => Ok(WalletAddressResponse::success(addr.address, addr.public_key)),
            Err(err) => {
                warn!(
                    chain = %req.chain,
                    network = %req.network,
                    error = %err,
                    "Address derivation failed"
                );
                Ok(WalletAddressResponse::derivation_failed())
            }
        }
    }
}
