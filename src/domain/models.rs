//! Wallet wire models
//!
//! Business-level status lives inside the payload (`code`/`msg`), not on the
//! transport status line: the transport answers 200/OK on the happy path and
//! callers branch on the embedded code.

use serde::{Deserialize, Serialize};

/// Embedded business code for a successful operation
pub const CODE_SUCCESS: &str = "200";

/// Embedded business code for a failed derivation
pub const CODE_FAIL: &str = "400";

/// Message accompanying [`CODE_SUCCESS`]
pub const MSG_SUCCESS: &str = "success";

/// Message accompanying a failed address derivation
pub const MSG_CREATE_ADDRESS_FAIL: &str = "create address fail";

/// Inbound (chain, network) pair, constructed per request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainRequest {
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub network: String,
}

/// REST support-check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportChainResponse {
    pub support: bool,
}

/// RPC support-check response, carrying the embedded status pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportCoinsResponse {
    pub code: String,
    pub msg: String,
    pub support: bool,
}

/// Wallet address response shared by both transports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAddressResponse {
    pub code: String,
    pub msg: String,
    pub address: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

impl WalletAddressResponse {
    /// Successful derivation payload
    pub fn success(address: String, public_key: String) -> Self {
        Self {
            code: CODE_SUCCESS.to_string(),
            msg: MSG_SUCCESS.to_string(),
            address,
            public_key,
        }
    }

    /// Failed derivation payload; the transport still reports success and
    /// callers branch on the embedded code.
    pub fn derivation_failed() -> Self {
        Self {
            code: CODE_FAIL.to_string(),
            msg: MSG_CREATE_ADDRESS_FAIL.to_string(),
            address: String::new(),
            public_key: String::new(),
        }
    }
}
