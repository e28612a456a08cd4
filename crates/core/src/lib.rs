//! Tee-Shirt Core - Shared types library.
//!
//! This crate provides the domain types used by the storefront binary and the
//! CLI:
//! - `storefront` - Public-facing shop (landing, dashboard, profile, cart)
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. Persistence of the cart and the auth session is the
//! storefront's job; this crate only defines what gets persisted and the
//! invariants every mutation keeps.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, roles and variants
//! - [`cart`] - Line items and the ordered cart with its mutation operations
//! - [`session`] - The persisted authentication session

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod session;
pub mod types;

pub use cart::{Cart, CartDecodeError, LineItem, NewLineItem};
pub use session::{AuthSession, SessionUser};
pub use types::*;
