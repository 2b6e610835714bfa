//! Posted form fields.

use product_manager_core::{ProductDraft, parse_price_input};
use serde::Deserialize;

/// The product form as submitted by the browser.
///
/// Every field is optional on the wire: a checkbox is only sent when ticked
/// and a stripped-down client may omit text fields entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFormInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Present (usually `"on"`) when the box is ticked.
    #[serde(default)]
    pub in_stock: Option<String>,
}

impl ProductFormInput {
    /// Overwrite the draft's fields with the submitted values.
    ///
    /// Unparseable price text becomes zero.
    pub fn apply_to(&self, draft: &mut ProductDraft) {
        draft.name.clone_from(&self.name);
        draft.price = parse_price_input(&self.price);
        draft.description.clone_from(&self.description);
        draft.category.clone_from(&self.category);
        draft.in_stock = self.in_stock.is_some();
    }
}
