//! Service layer
//!
//! The dispatch service implements the shared wallet contract; the REST and
//! RPC adapters are thin transport wrappers over it. The client module is the
//! outbound counterpart consumed by downstream services.

pub mod client;
pub mod dispatch;
pub mod rest;
pub mod rpc;

pub use client::WalletClient;
pub use dispatch::{DispatchService, WalletService};
