//! Domain models for storefront.

pub mod account;
pub mod session;

pub use account::Account;
pub use session::keys as session_keys;
