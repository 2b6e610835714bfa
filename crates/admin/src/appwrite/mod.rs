//! Appwrite Databases client for the product collection.
//!
//! Talks to the REST API directly with reqwest; the collection is addressed
//! by the fixed project/database/collection IDs from [`AppwriteConfig`].
//!
//! # API Reference
//!
//! - List: `GET /databases/{db}/collections/{col}/documents`
//! - Create: `POST /databases/{db}/collections/{col}/documents`
//! - Update: `PATCH /databases/{db}/collections/{col}/documents/{id}`
//! - Delete: `DELETE /databases/{db}/collections/{col}/documents/{id}`
//! - Authentication: `X-Appwrite-Project` plus optional `X-Appwrite-Key`

mod error;
pub mod types;

pub use error::{ApiErrorResponse, AppwriteError};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use product_manager_core::{Product, ProductDraft, ProductId};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::AppwriteConfig;
use crate::store::{ProductStore, StoreError};
use types::{
    CreateDocumentRequest, DocumentList, HealthVersion, ProductData, ProductDocument, Query,
    UNIQUE_ID, UpdateDocumentRequest,
};

/// Documents requested per list page (Appwrite's default is 25).
const PAGE_SIZE: u64 = 100;

/// Request timeout for every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Appwrite API client scoped to one collection.
#[derive(Clone)]
pub struct AppwriteClient {
    inner: Arc<AppwriteClientInner>,
}

struct AppwriteClientInner {
    client: reqwest::Client,
    /// `{endpoint}/databases/{db}/collections/{col}/documents`
    documents_url: String,
    /// `{endpoint}/health/version`
    health_url: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client.
    ///
    /// # Errors
    ///
    /// Returns error if a header value is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: &AppwriteConfig) -> Result<Self, AppwriteError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "X-Appwrite-Project",
            HeaderValue::from_str(config.project_id.as_str())
                .map_err(|e| AppwriteError::Config(format!("Invalid project ID: {e}")))?,
        );

        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(api_key.expose_secret())
                .map_err(|e| AppwriteError::Config(format!("Invalid API key format: {e}")))?;
            value.set_sensitive(true);
            headers.insert("X-Appwrite-Key", value);
        }

        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let endpoint = config.endpoint.as_str().trim_end_matches('/');

        Ok(Self {
            inner: Arc::new(AppwriteClientInner {
                client,
                documents_url: format!(
                    "{endpoint}/databases/{}/collections/{}/documents",
                    config.database_id, config.collection_id
                ),
                health_url: format!("{endpoint}/health/version"),
            }),
        })
    }

    fn document_url(&self, id: &ProductId) -> String {
        format!("{}/{id}", self.inner.documents_url)
    }

    /// Fetch every document in the collection, walking pages until the
    /// reported total is reached or a short page comes back.
    ///
    /// # Errors
    ///
    /// Returns error if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_documents(&self) -> Result<Vec<Product>, AppwriteError> {
        let mut products = Vec::new();
        let mut offset = 0_u64;
        let limit = encode_query(&Query::limit(PAGE_SIZE))?;

        loop {
            let response = self
                .inner
                .client
                .get(&self.inner.documents_url)
                .query(&[
                    ("queries[]", limit.clone()),
                    ("queries[]", encode_query(&Query::offset(offset))?),
                ])
                .send()
                .await?;
            let page: DocumentList<ProductDocument> = handle_response(response).await?;

            let fetched = page.documents.len() as u64;
            products.extend(page.documents.into_iter().map(Product::from));
            offset += fetched;

            if fetched < PAGE_SIZE || offset >= page.total {
                debug!(count = products.len(), total = page.total, "Listed documents");
                return Ok(products);
            }
        }
    }

    /// Create a document with a server-generated ID.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::Parse` if the draft is invalid, otherwise any
    /// request/API failure.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_document(&self, draft: &ProductDraft) -> Result<Product, AppwriteError> {
        let price = draft
            .validate()
            .map_err(|e| AppwriteError::Parse(e.to_string()))?;
        let body = CreateDocumentRequest {
            document_id: UNIQUE_ID,
            data: ProductData::new(draft, price),
        };

        let response = self
            .inner
            .client
            .post(&self.inner.documents_url)
            .json(&body)
            .send()
            .await?;
        let doc: ProductDocument = handle_response(response).await?;

        debug!(document_id = %doc.id, "Document created");
        Ok(Product::from(doc))
    }

    /// Replace the collection attributes of an existing document.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::NotFound` if the document is gone, otherwise
    /// any request/API failure.
    #[instrument(skip(self, draft), fields(document_id = %id))]
    pub async fn update_document(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, AppwriteError> {
        let price = draft
            .validate()
            .map_err(|e| AppwriteError::Parse(e.to_string()))?;
        let body = UpdateDocumentRequest {
            data: ProductData::new(draft, price),
        };

        let response = self
            .inner
            .client
            .patch(self.document_url(id))
            .json(&body)
            .send()
            .await?;
        let doc: ProductDocument = handle_response(response).await?;

        debug!("Document updated");
        Ok(Product::from(doc))
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns `AppwriteError::NotFound` if the document is gone, otherwise
    /// any request/API failure.
    #[instrument(skip(self), fields(document_id = %id))]
    pub async fn delete_document(&self, id: &ProductId) -> Result<(), AppwriteError> {
        let response = self
            .inner
            .client
            .delete(self.document_url(id))
            .send()
            .await?;

        if response.status().is_success() {
            debug!("Document deleted");
            return Ok(());
        }

        Err(parse_error(response).await)
    }

    /// Fetch the server version. Public endpoint, used for readiness.
    ///
    /// # Errors
    ///
    /// Returns error if the server is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<String, AppwriteError> {
        let response = self.inner.client.get(&self.inner.health_url).send().await?;
        let health: HealthVersion = handle_response(response).await?;
        Ok(health.version)
    }
}

impl std::fmt::Debug for AppwriteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteClient")
            .field("documents_url", &self.inner.documents_url)
            .finish_non_exhaustive()
    }
}

/// Handle API response and parse JSON.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppwriteError> {
    if response.status().is_success() {
        return response
            .json()
            .await
            .map_err(|e| AppwriteError::Parse(format!("Failed to parse response: {e}")));
    }

    Err(parse_error(response).await)
}

/// Encode a list query, reporting failure as a parse error.
fn encode_query(query: &Query) -> Result<String, AppwriteError> {
    query
        .encode()
        .map_err(|e| AppwriteError::Parse(format!("Failed to encode query: {e}")))
}

/// Parse an error response from Appwrite.
async fn parse_error(response: reqwest::Response) -> AppwriteError {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return AppwriteError::RateLimited(retry_after);
    }

    let body = response.text().await.unwrap_or_default();
    let (error_type, message) = serde_json::from_str::<ApiErrorResponse>(&body).map_or_else(
        |_| (String::new(), body.clone()),
        |parsed| (parsed.error_type, parsed.message),
    );

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppwriteError::Unauthorized(message),
        StatusCode::NOT_FOUND => AppwriteError::NotFound(message),
        _ => AppwriteError::Api {
            status: status.as_u16(),
            error_type,
            message,
        },
    }
}

#[async_trait]
impl ProductStore for AppwriteClient {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.list_documents().await?)
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, StoreError> {
        Ok(self.create_document(draft).await?)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, StoreError> {
        Ok(self.update_document(id, draft).await?)
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        Ok(self.delete_document(id).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.health().await?;
        Ok(())
    }
}
