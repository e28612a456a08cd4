//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Account registration, password login and the `"auth"` session
//! - `cart` - The persisted cart of one browser
//! - `variant_editor` - Staged color/size edits of one cart line
//! - `catalog` - Products offered on the dashboard

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod variant_editor;

pub use cart::CartStore;
pub use catalog::{CatalogError, Product, ProductCatalog};
pub use variant_editor::VariantEditor;
