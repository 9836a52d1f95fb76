//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::cookie::Key;

use crate::config::{ConfigError, StoreConfig};
use crate::db::DocumentStore;
use crate::services::catalog::{CatalogCache, new_catalog_cache};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the document store, catalog cache and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StoreConfig,
    store: DocumentStore,
    catalog_cache: CatalogCache,
    session_key: Key,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session secret cannot key the cookie signer.
    pub fn new(config: StoreConfig, store: DocumentStore) -> Result<Self, ConfigError> {
        let session_key = config.session_key()?;
        let catalog_cache = new_catalog_cache(config.catalog_cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                catalog_cache,
                session_key,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.inner.store
    }

    /// Get a reference to the shared product cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &CatalogCache {
        &self.inner.catalog_cache
    }

    /// Key used to sign the session cookie.
    #[must_use]
    pub fn session_key(&self) -> &Key {
        &self.inner.session_key
    }
}
