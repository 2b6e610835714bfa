//! Application state shared across handlers.

use std::sync::Arc;

use crate::appwrite::{AppwriteClient, AppwriteError};
use crate::config::{AdminConfig, StoreBackend};
use crate::store::{MemoryProductStore, ProductStore};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Appwrite store selected but not configured")]
    MissingAppwriteConfig,
    #[error("appwrite client: {0}")]
    Appwrite(#[from] AppwriteError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Arc<dyn ProductStore>,
}

impl AppState {
    /// Create application state with the store selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Appwrite client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, StateError> {
        let store: Arc<dyn ProductStore> = match config.store {
            StoreBackend::Appwrite => {
                let appwrite = config
                    .appwrite
                    .as_ref()
                    .ok_or(StateError::MissingAppwriteConfig)?;
                Arc::new(AppwriteClient::new(appwrite)?)
            }
            StoreBackend::Memory => Arc::new(MemoryProductStore::new()),
        };

        Ok(Self::with_store(config, store))
    }

    /// Create application state around an existing store.
    #[must_use]
    pub fn with_store(config: AdminConfig, store: Arc<dyn ProductStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the product store.
    #[must_use]
    pub fn store(&self) -> &dyn ProductStore {
        self.inner.store.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
