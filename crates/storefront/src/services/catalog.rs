//! Product catalog shown on the dashboard.
//!
//! Loaded once at startup from a JSON file of `[{id, name, image, price}]`
//! and shared read-only through [`crate::state::AppState`].

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use teeshirt_core::{Price, ProductId};

/// Errors raised while loading the product catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),

    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// A product offered on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Product {
    /// Unit price in the storefront currency.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::local(self.price)
    }
}

/// All products, in file order.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: Arc<Vec<Product>>,
}

impl ProductCatalog {
    /// Load the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or any error
    /// from [`ProductCatalog::from_json`].
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), products = catalog.len(), "Loaded product catalog");
        Ok(catalog)
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON,
    /// `CatalogError::DuplicateId` if two products share an id and
    /// `CatalogError::NegativePrice` for a price below zero.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;

        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if product.price.is_sign_negative() && !product.price.is_zero() {
                return Err(CatalogError::NegativePrice(product.id.clone()));
            }
            if !seen.insert(&product.id) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        Ok(Self {
            products: Arc::new(products),
        })
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": "classic", "name": "Classic Tee", "image": "/static/img/classic.svg", "price": 399},
        {"id": "oversized", "name": "Oversized Tee", "price": 549.5}
    ]"#;

    #[test]
    fn test_from_json_keeps_order() {
        let catalog = ProductCatalog::from_json(SAMPLE).unwrap();
        let ids: Vec<_> = catalog.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["classic", "oversized"]);
        assert_eq!(catalog.products()[1].image, "");
    }

    #[test]
    fn test_get_by_id() {
        let catalog = ProductCatalog::from_json(SAMPLE).unwrap();
        let product = catalog.get(&ProductId::new("oversized")).unwrap();
        assert_eq!(product.price, Decimal::new(5495, 1));
        assert_eq!(product.unit_price().display(), "₱ 549.50");
        assert!(catalog.get(&ProductId::new("hoodie")).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"[{"id":"a","name":"A","price":1},{"id":"a","name":"B","price":2}]"#;
        assert!(matches!(
            ProductCatalog::from_json(json),
            Err(CatalogError::DuplicateId(id)) if id.as_str() == "a"
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let json = r#"[{"id":"a","name":"A","price":-1}]"#;
        assert!(matches!(
            ProductCatalog::from_json(json),
            Err(CatalogError::NegativePrice(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ProductCatalog::load(Path::new("/nonexistent/products.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("content/products.json");
        let catalog = ProductCatalog::load(&path).unwrap();
        assert!(!catalog.is_empty());
    }
}
