//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartRegistry;
use crate::config::StorefrontConfig;
use crate::magento::{CatalogClient, CatalogError};
use crate::middleware::session::SESSION_IDLE_TIMEOUT;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog client, the cart registry and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    carts: CartRegistry,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let catalog = CatalogClient::new(&config.magento)?;
        // Carts expire on the same idle timeout as the session holding their id.
        let carts = CartRegistry::new(SESSION_IDLE_TIMEOUT);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                carts,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the per-visitor cart registry.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }
}
