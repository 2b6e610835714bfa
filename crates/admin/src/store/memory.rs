//! In-process product store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use product_manager_core::{Product, ProductDraft, ProductId};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ProductStore, StoreError};

/// A product collection held in memory, in insertion order.
///
/// Clones share the same collection. [`set_unavailable`](Self::set_unavailable)
/// makes every call fail, to simulate the remote service being down.
#[derive(Debug, Clone, Default)]
pub struct MemoryProductStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    products: Mutex<Vec<Product>>,
    unavailable: AtomicBool,
    requests: AtomicUsize,
}

impl MemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing records.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                products: Mutex::new(products),
                ..MemoryInner::default()
            }),
        }
    }

    /// Toggle simulated outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of store calls made so far, failed ones included.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.inner.requests.load(Ordering::SeqCst)
    }

    /// Current contents, bypassing the outage switch.
    pub async fn snapshot(&self) -> Vec<Product> {
        self.inner.products.lock().await.clone()
    }

    fn begin_request(&self) -> Result<(), StoreError> {
        self.inner.requests.fetch_add(1, Ordering::SeqCst);
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::new("memory store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.begin_request()?;
        Ok(self.inner.products.lock().await.clone())
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, StoreError> {
        self.begin_request()?;
        let id = ProductId::new(Uuid::new_v4().simple().to_string());
        let mut product = draft.clone().into_product(id).map_err(StoreError::new)?;
        product.updated_at = Some(Utc::now());

        self.inner.products.lock().await.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, StoreError> {
        self.begin_request()?;
        let mut updated = draft.clone().into_product(id.clone()).map_err(StoreError::new)?;
        updated.updated_at = Some(Utc::now());

        let mut products = self.inner.products.lock().await;
        let slot = products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::new(format!("product {id} not found")))?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        self.begin_request()?;
        let mut products = self.inner.products.lock().await;
        let before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == before {
            return Err(StoreError::new(format!("product {id} not found")));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.begin_request()
    }
}
