//! Product form route handlers.
//!
//! Every handler loads the session's [`ProductForm`], runs one form operation,
//! saves the form back and renders the full page. A form with nothing worth
//! keeping is not stored, so sessions only exist for browsers mid-task.
//! Operation failures are already on the form as a message, so handlers only
//! fail on session or lookup errors.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use product_manager_core::{Product, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::AppError,
    form::{Confirmation, FormMode, ProductForm, ProductFormInput, SESSION_KEY},
    state::AppState,
};

const UNCATEGORIZED: &str = "Uncategorized";
const NO_DESCRIPTION: &str = "No description provided.";

/// Product card for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub category: String,
    pub description: String,
    pub stock_label: &'static str,
    pub stock_class: &'static str,
    pub updated: Option<String>,
}

impl ProductView {
    fn new(product: &Product, currency_symbol: &str) -> Self {
        let status = product.stock_status();
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display(currency_symbol),
            category: product
                .category
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            description: product
                .description
                .clone()
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            stock_label: status.label(),
            stock_class: status.css_class(),
            updated: product
                .updated_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
        }
    }
}

/// The add/edit form panel.
#[derive(Debug, Clone)]
pub struct FormView {
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub editing: bool,
    pub name: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub in_stock: bool,
}

impl From<&ProductForm> for FormView {
    fn from(form: &ProductForm) -> Self {
        let (heading, submit_label, editing) = match form.mode() {
            FormMode::Create => ("Add New Product", "Add Product", false),
            FormMode::Edit => ("Edit Product", "Update Product", true),
        };
        let fields = form.fields();

        Self {
            heading,
            submit_label,
            editing,
            name: fields.name.clone(),
            price: fields.price.normalize().to_string(),
            description: fields.description.clone(),
            category: fields.category.clone(),
            in_stock: fields.in_stock,
        }
    }
}

/// Product manager page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub message: Option<&'static str>,
    pub form: FormView,
    pub products: Vec<ProductView>,
}

impl ProductsIndexTemplate {
    fn new(state: &AppState, form: &ProductForm) -> Self {
        let symbol = &state.config().currency_symbol;
        Self {
            message: form.message().map(|m| m.text()),
            form: FormView::from(form),
            products: form
                .products()
                .iter()
                .map(|p| ProductView::new(p, symbol))
                .collect(),
        }
    }
}

/// Delete confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub product: ProductView,
}

/// Delete form body.
///
/// `confirm` is absent on the first post from the product card, then `yes`
/// or `no` from the confirmation page.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub confirm: Option<String>,
}

impl DeleteForm {
    fn confirmation(&self) -> Option<Confirmation> {
        self.confirm
            .as_deref()
            .map(|answer| Confirmation::from(answer == "yes"))
    }
}

/// Delete handler response: the page, or the question.
pub enum DeleteResponse {
    Page(ProductsIndexTemplate),
    Confirm(ConfirmDeleteTemplate),
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Page(page) => page.into_response(),
            Self::Confirm(confirm) => confirm.into_response(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The form stored in the session, if any.
async fn stored_form(session: &Session) -> Result<Option<ProductForm>, AppError> {
    Ok(session.get::<ProductForm>(SESSION_KEY).await?)
}

/// The session's form, or a new one with the list fetched as on page load.
async fn load_form(session: &Session, state: &AppState) -> Result<ProductForm, AppError> {
    if let Some(form) = stored_form(session).await? {
        return Ok(form);
    }
    let mut form = ProductForm::new();
    let _ = form.refresh(state.store()).await;
    Ok(form)
}

/// Keep the form in the session only while it holds something a new form
/// would not rebuild, so plain page views never create a stored session.
async fn save_form(session: &Session, form: &ProductForm) -> Result<(), AppError> {
    if !form.is_pristine() {
        session.insert(SESSION_KEY, form).await?;
    } else if session.id().is_some() {
        session.remove_value(SESSION_KEY).await?;
    }
    Ok(())
}

/// Find a listed record, refetching the list once if it is not there.
async fn find_product(
    form: &mut ProductForm,
    state: &AppState,
    id: &ProductId,
) -> Result<Product, AppError> {
    if form.product(id).is_none() {
        let _ = form.refresh(state.store()).await;
    }
    form.product(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the page, loading the list from the store.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
) -> Result<ProductsIndexTemplate, AppError> {
    let mut form = stored_form(&session).await?.unwrap_or_default();
    // A failure is shown as the fetch message.
    let _ = form.refresh(state.store()).await;
    save_form(&session, &form).await?;

    Ok(ProductsIndexTemplate::new(&state, &form))
}

/// Create or update, depending on whether a record is being edited.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<ProductFormInput>,
) -> Result<ProductsIndexTemplate, AppError> {
    let mut form = load_form(&session, &state).await?;
    let _ = form.submit(state.store(), &input).await;
    save_form(&session, &form).await?;

    Ok(ProductsIndexTemplate::new(&state, &form))
}

/// Load a listed record into the form.
#[instrument(skip(state, session))]
pub async fn begin_edit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<ProductsIndexTemplate, AppError> {
    let id = ProductId::new(id);
    let mut form = load_form(&session, &state).await?;
    let product = find_product(&mut form, &state, &id).await?;
    form.begin_edit(&product);
    save_form(&session, &form).await?;

    Ok(ProductsIndexTemplate::new(&state, &form))
}

/// Leave edit mode.
#[instrument(skip_all)]
pub async fn cancel(
    State(state): State<AppState>,
    session: Session,
) -> Result<ProductsIndexTemplate, AppError> {
    let mut form = load_form(&session, &state).await?;
    form.cancel_edit();
    save_form(&session, &form).await?;

    Ok(ProductsIndexTemplate::new(&state, &form))
}

/// Ask for confirmation, then delete.
#[instrument(skip(state, session, body))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(body): Form<DeleteForm>,
) -> Result<DeleteResponse, AppError> {
    let id = ProductId::new(id);
    let mut form = load_form(&session, &state).await?;

    let Some(confirmation) = body.confirmation() else {
        let product = find_product(&mut form, &state, &id).await?;
        return Ok(DeleteResponse::Confirm(ConfirmDeleteTemplate {
            product: ProductView::new(&product, &state.config().currency_symbol),
        }));
    };

    let _ = form.delete(state.store(), &id, confirmation).await;
    save_form(&session, &form).await?;

    Ok(DeleteResponse::Page(ProductsIndexTemplate::new(&state, &form)))
}
