//! The product form controller.
//!
//! One [`ProductForm`] mirrors the remote collection for one browser
//! session. It holds the last fetched list, the draft being composed, the
//! record being edited (if any) and the message to show. Every mutation is a
//! single store call followed by a full [`ProductForm::refresh`]; there are no
//! optimistic updates and no retries.
//!
//! Store failures are collapsed into one static [`FormMessage`] per
//! operation and logged; the form stays usable afterwards.

mod input;

pub use input::ProductFormInput;

use product_manager_core::{PriceError, Product, ProductDraft, ProductError, ProductId};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::store::ProductStore;

/// Session key the form is stored under.
pub const SESSION_KEY: &str = "product_form";

/// User-facing message. One static string per failure condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMessage {
    FetchFailed,
    CreateFailed,
    UpdateFailed,
    DeleteFailed,
    NameRequired,
    NegativePrice,
}

impl FormMessage {
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::FetchFailed => "Failed to fetch products.",
            Self::CreateFailed => "Failed to add product.",
            Self::UpdateFailed => "Failed to update product.",
            Self::DeleteFailed => "Failed to delete product.",
            Self::NameRequired => "Product name is required.",
            Self::NegativePrice => "Price cannot be negative.",
        }
    }
}

impl From<&ProductError> for FormMessage {
    fn from(err: &ProductError) -> Self {
        match err {
            ProductError::EmptyName => Self::NameRequired,
            ProductError::Price(PriceError::Negative(_) | PriceError::NotFinite) => {
                Self::NegativePrice
            }
        }
    }
}

/// Which operation a submit will run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// An existing record being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingProduct {
    pub id: ProductId,
    pub fields: ProductDraft,
}

/// Whether the user confirmed a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Declined
        }
    }
}

/// Form state for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    products: Vec<Product>,
    draft: ProductDraft,
    editing: Option<EditingProduct>,
    message: Option<FormMessage>,
}

impl ProductForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub const fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    #[must_use]
    pub const fn editing(&self) -> Option<&EditingProduct> {
        self.editing.as_ref()
    }

    #[must_use]
    pub const fn message(&self) -> Option<FormMessage> {
        self.message
    }

    #[must_use]
    pub const fn mode(&self) -> FormMode {
        if self.editing.is_some() {
            FormMode::Edit
        } else {
            FormMode::Create
        }
    }

    /// Whether the form holds nothing a new form would not rebuild.
    ///
    /// The list is refetched whenever a form is created, and a fetch failure
    /// is reported again by that fetch, so neither counts as state.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.editing.is_none()
            && self.draft == ProductDraft::default()
            && matches!(self.message, None | Some(FormMessage::FetchFailed))
    }

    /// Fields currently shown in the form: the edited record or the draft.
    #[must_use]
    pub fn fields(&self) -> &ProductDraft {
        self.editing.as_ref().map_or(&self.draft, |e| &e.fields)
    }

    /// Replace the list with the store's full contents.
    ///
    /// On failure the previous list is kept.
    ///
    /// # Errors
    ///
    /// Returns `FormMessage::FetchFailed` (also stored as the message).
    #[instrument(skip_all)]
    pub async fn refresh(&mut self, store: &dyn ProductStore) -> Result<(), FormMessage> {
        match store.list_products().await {
            Ok(products) => {
                self.products = products;
                if self.message == Some(FormMessage::FetchFailed) {
                    self.message = None;
                }
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch products");
                Err(self.fail(FormMessage::FetchFailed))
            }
        }
    }

    /// Copy the posted fields into the active context (edited record or draft).
    pub fn apply_input(&mut self, input: &ProductFormInput) {
        match &mut self.editing {
            Some(editing) => input.apply_to(&mut editing.fields),
            None => input.apply_to(&mut self.draft),
        }
    }

    /// Apply the posted fields, then update or create depending on mode.
    ///
    /// # Errors
    ///
    /// Returns the message describing why the submit failed.
    pub async fn submit(
        &mut self,
        store: &dyn ProductStore,
        input: &ProductFormInput,
    ) -> Result<(), FormMessage> {
        self.apply_input(input);
        match self.mode() {
            FormMode::Edit => self.update(store).await,
            FormMode::Create => self.create(store).await,
        }
    }

    /// Send the draft to the store.
    ///
    /// On success the draft is reset and the list refreshed; on failure the
    /// draft and list are left as they were.
    ///
    /// # Errors
    ///
    /// Returns a validation message or `FormMessage::CreateFailed`.
    #[instrument(skip_all, fields(name = %self.draft.name))]
    pub async fn create(&mut self, store: &dyn ProductStore) -> Result<(), FormMessage> {
        self.message = None;
        if let Err(e) = self.draft.validate() {
            return Err(self.fail(FormMessage::from(&e)));
        }

        match store.create_product(&self.draft).await {
            Ok(product) => {
                info!(product_id = %product.id, "Product created");
                self.draft = ProductDraft::default();
                // A failed refresh sets its own message; the create itself stands.
                let _ = self.refresh(store).await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to add product");
                Err(self.fail(FormMessage::CreateFailed))
            }
        }
    }

    /// Start editing a copy of `product`, replacing any edit in progress.
    pub fn begin_edit(&mut self, product: &Product) {
        self.editing = Some(EditingProduct {
            id: product.id.clone(),
            fields: ProductDraft::from(product),
        });
    }

    /// Send the edited record to the store.
    ///
    /// Does nothing when no record is being edited. On success the edit ends
    /// and the list is refreshed; on failure the edit is kept.
    ///
    /// # Errors
    ///
    /// Returns a validation message or `FormMessage::UpdateFailed`.
    #[instrument(skip_all)]
    pub async fn update(&mut self, store: &dyn ProductStore) -> Result<(), FormMessage> {
        let Some(editing) = &self.editing else {
            return Ok(());
        };
        self.message = None;
        if let Err(e) = editing.fields.validate() {
            return Err(self.fail(FormMessage::from(&e)));
        }

        match store.update_product(&editing.id, &editing.fields).await {
            Ok(product) => {
                info!(product_id = %product.id, "Product updated");
                self.editing = None;
                let _ = self.refresh(store).await;
                Ok(())
            }
            Err(e) => {
                error!(product_id = %editing.id, error = %e, "Failed to update product");
                Err(self.fail(FormMessage::UpdateFailed))
            }
        }
    }

    /// Drop the edit in progress, discarding unsaved changes.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Delete a record once the user has confirmed.
    ///
    /// A declined confirmation makes no store call. On success the list is
    /// refreshed, and an edit of the deleted record is dropped.
    ///
    /// # Errors
    ///
    /// Returns `FormMessage::DeleteFailed`.
    #[instrument(skip(self, store, id), fields(product_id = %id))]
    pub async fn delete(
        &mut self,
        store: &dyn ProductStore,
        id: &ProductId,
        confirmation: Confirmation,
    ) -> Result<(), FormMessage> {
        if confirmation == Confirmation::Declined {
            return Ok(());
        }
        self.message = None;

        match store.delete_product(id).await {
            Ok(()) => {
                info!("Product deleted");
                if self.editing.as_ref().is_some_and(|e| &e.id == id) {
                    self.editing = None;
                }
                let _ = self.refresh(store).await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to delete product");
                Err(self.fail(FormMessage::DeleteFailed))
            }
        }
    }

    fn fail(&mut self, message: FormMessage) -> FormMessage {
        self.message = Some(message);
        message
    }
}
