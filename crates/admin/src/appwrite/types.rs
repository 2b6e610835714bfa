//! Appwrite Databases wire types.
//!
//! Documents carry system attributes prefixed with `$` next to the
//! collection's own attributes (`name`, `price`, `description`, `category`,
//! `inStock`).

use chrono::{DateTime, Utc};
use product_manager_core::{Price, Product, ProductDraft, ProductId};
use serde::{Deserialize, Serialize};

/// Ask Appwrite to generate the document ID.
pub const UNIQUE_ID: &str = "unique()";

/// Response of the list-documents endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

/// A product document as stored in the collection.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "inStock", default)]
    pub in_stock: Option<bool>,
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        // Another client may have written a value the form would reject;
        // show it as free rather than failing the whole list.
        let price = doc.price.map_or(Price::ZERO, |value| {
            Price::from_f64(value).unwrap_or_else(|e| {
                tracing::warn!(document_id = %doc.id, error = %e, "Invalid price in document");
                Price::ZERO
            })
        });

        Self {
            id: ProductId::new(doc.id),
            name: doc.name,
            price,
            description: doc.description.filter(|s| !s.is_empty()),
            category: doc.category.filter(|s| !s.is_empty()),
            in_stock: doc.in_stock.unwrap_or(false),
            updated_at: doc
                .updated_at
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc)),
        }
    }
}

/// Collection attributes written on create and update.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductData<'a> {
    pub name: &'a str,
    pub price: f64,
    pub description: &'a str,
    pub category: &'a str,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
}

impl<'a> ProductData<'a> {
    /// Build the attribute payload from a validated draft.
    #[must_use]
    pub fn new(draft: &'a ProductDraft, price: Price) -> Self {
        Self {
            name: &draft.name,
            price: price.to_f64(),
            description: &draft.description,
            category: &draft.category,
            in_stock: draft.in_stock,
        }
    }
}

/// Body of the create-document request.
#[derive(Debug, Serialize)]
pub struct CreateDocumentRequest<'a, T> {
    #[serde(rename = "documentId")]
    pub document_id: &'a str,
    pub data: T,
}

/// Body of the update-document request.
#[derive(Debug, Serialize)]
pub struct UpdateDocumentRequest<T> {
    pub data: T,
}

/// Response of `GET /health/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthVersion {
    pub version: String,
}

/// A JSON-encoded list query (Appwrite 1.5+ query syntax).
#[derive(Debug, Serialize)]
pub struct Query {
    pub method: &'static str,
    pub values: Vec<u64>,
}

impl Query {
    #[must_use]
    pub fn limit(limit: u64) -> Self {
        Self {
            method: "limit",
            values: vec![limit],
        }
    }

    #[must_use]
    pub fn offset(offset: u64) -> Self {
        Self {
            method: "offset",
            values: vec![offset],
        }
    }

    /// Encode for a `queries[]` parameter.
    ///
    /// # Errors
    ///
    /// Returns error if the query cannot be serialized.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
