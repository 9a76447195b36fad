//! Server lifecycle layer
//!
//! [`managed`] wraps a single listener and serve loop; [`api`] orchestrates
//! the full set of listeners plus the database behind one handle.

pub mod api;
pub mod managed;

pub use api::Api;
pub use managed::{with_nodelay, with_timeouts, HttpTimeouts, ManagedServer, ServerOption};
