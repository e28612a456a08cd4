//! Key-value persistence for per-browser state.
//!
//! The storefront keeps exactly two pieces of state per browser profile, each
//! as a JSON string under a fixed key (see [`crate::models::session_keys`]):
//!
//! - `"cart"` - the ordered list of line items
//! - `"auth"` - the authentication session
//!
//! [`KeyValueStore`] is the only way the cart and auth services touch that
//! state. Production handlers use [`SessionStore`], which writes through the
//! request's `tower-sessions` session; tests and tooling use [`MemoryStore`].

pub mod memory;
pub mod session;

pub use memory::MemoryStore;
pub use session::SessionStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session backend failed to load or record a value.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A value could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the operation.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Durable string storage keyed by name.
///
/// A `set` that returns `Ok` must be visible to the next `get` of the same
/// key through any handle on the same backing store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}
