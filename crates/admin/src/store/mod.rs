//! The product collection seam.
//!
//! The form controller only ever talks to a [`ProductStore`]. Production
//! uses [`AppwriteClient`](crate::appwrite::AppwriteClient); local
//! development and tests use [`MemoryProductStore`].

mod memory;

pub use memory::MemoryProductStore;

use async_trait::async_trait;
use product_manager_core::{Product, ProductDraft, ProductId};
use thiserror::Error;

use crate::appwrite::AppwriteError;

/// A failed store call.
///
/// Deliberately opaque: callers report "the remote call failed" and log the
/// cause, they never branch on it.
#[derive(Debug, Error)]
#[error("product store request failed: {0}")]
pub struct StoreError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

impl From<AppwriteError> for StoreError {
    fn from(err: AppwriteError) -> Self {
        Self::new(err)
    }
}

/// Remote product collection operations.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product in the collection.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Store a new product; the store assigns the identifier.
    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, StoreError>;

    /// Overwrite every editable field of an existing product.
    async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, StoreError>;

    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError>;

    /// Whether the store is reachable.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
