//! Address derivation collaborator
//!
//! The dispatch layer consumes derivation as an opaque operation returning an
//! address/public-key pair or failing. The default implementation generates a
//! fresh secp256k1 key and derives a Keccak-256 based address from the
//! uncompressed public key.

use crate::shared::error::{AppError, AppResult};
use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

/// A derived wallet address and its public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub address: String,
    pub public_key: String,
}

/// Opaque private-key-to-address derivation
pub trait AddressDeriver: Send + Sync {
    /// Derive a wallet address and public key from a freshly generated
    /// private key.
    fn create_address_from_private_key(&self) -> AppResult<Address>;
}

/// secp256k1 deriver producing 20-byte Keccak-256 addresses
#[derive(Debug, Default)]
pub struct Secp256k1Deriver;

impl AddressDeriver for Secp256k1Deriver {
    fn create_address_from_private_key(&self) -> AppResult<Address> {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = signing_key.verifying_key();

        let point = verifying_key.to_encoded_point(false);
        let bytes = point.as_bytes();
        if bytes.len() != 65 {
            return Err(AppError::Derivation(format!(
                "Unexpected public key encoding length: {}",
                bytes.len()
            )));
        }
        // Drop the 0x04 uncompressed-point prefix before hashing.
        let public_key = &bytes[1..];

        let hash = Keccak256::digest(public_key);
        let address = format!("0x{}", hex::encode(&hash[12..]));

        Ok(Address {
            address,
            public_key: hex::encode(public_key),
        })
    }
}
