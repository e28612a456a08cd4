//! Session-related constants.

/// Keys of the per-browser key-value state.
pub mod keys {
    /// Key for the serialized cart (ordered list of line items).
    pub const CART: &str = "cart";

    /// Key for the serialized authentication session.
    pub const AUTH: &str = "auth";
}
