//! Domain layer
//!
//! Wire models, the chain/network validator, and the address-derivation
//! collaborator.

pub mod derivation;
pub mod models;
pub mod validator;

pub use derivation::{Address, AddressDeriver, Secp256k1Deriver};
pub use models::{ChainRequest, SupportChainResponse, SupportCoinsResponse, WalletAddressResponse};
pub use validator::ChainValidator;
