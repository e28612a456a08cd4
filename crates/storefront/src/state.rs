//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use teeshirt_core::VariantCatalog;

use crate::config::StorefrontConfig;
use crate::services::ProductCatalog;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration. Nothing in
/// it changes after startup; per-browser state lives in the session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    products: ProductCatalog,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `products` - Products offered on the dashboard
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, products: ProductCatalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                products,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn products(&self) -> &ProductCatalog {
        &self.inner.products
    }

    /// Colors and sizes offered by the variant pickers.
    #[must_use]
    pub fn variants(&self) -> &VariantCatalog {
        &self.inner.config.variant_catalog
    }
}
