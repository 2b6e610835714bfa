//! Product records and drafts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::{Price, PriceError};
use super::status::StockStatus;

/// Reasons a draft can't be sent to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("product name is required")]
    EmptyName,
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// A persisted product.
///
/// Identity is the server-assigned `id`; every other field is mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    pub category: Option<String>,
    pub in_stock: bool,
    /// Last modification as reported by the server. Display only.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    #[must_use]
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::from(self.in_stock)
    }

    /// True if every user-editable field equals the draft's.
    ///
    /// Missing optional text compares equal to an empty string.
    #[must_use]
    pub fn matches_draft(&self, draft: &ProductDraft) -> bool {
        self.name == draft.name
            && self.price.amount() == draft.price
            && self.description.as_deref().unwrap_or_default() == draft.description
            && self.category.as_deref().unwrap_or_default() == draft.category
            && self.in_stock == draft.in_stock
    }
}

/// An unsaved product: every field of [`Product`] except the identifier.
///
/// `price` holds whatever the form produced and may be negative until
/// [`ProductDraft::validate`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub category: String,
    pub in_stock: bool,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            price: Decimal::ZERO,
            description: String::new(),
            category: String::new(),
            in_stock: true,
        }
    }
}

impl ProductDraft {
    /// Check the draft can be stored, returning its validated price.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::EmptyName` if the name is blank and
    /// `ProductError::Price` if the price is negative.
    pub fn validate(&self) -> Result<Price, ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        Ok(Price::new(self.price)?)
    }

    /// Attach an identifier, producing a stored record.
    ///
    /// Empty optional text becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns the validation error if the draft is not storable.
    pub fn into_product(self, id: ProductId) -> Result<Product, ProductError> {
        let price = self.validate()?;
        Ok(Product {
            id,
            name: self.name,
            price,
            description: non_empty(self.description),
            category: non_empty(self.category),
            in_stock: self.in_stock,
            updated_at: None,
        })
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.amount(),
            description: product.description.clone().unwrap_or_default(),
            category: product.category.clone().unwrap_or_default(),
            in_stock: product.in_stock,
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}
