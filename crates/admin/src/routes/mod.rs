//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Redirect to /products
//!
//! # Products (backed by the product store)
//! GET  /products                  - Fetch the list and show the page
//! POST /products                  - Create, or update the record being edited
//! POST /products/cancel           - Leave edit mode
//! POST /products/{id}/edit        - Load a record into the form
//! POST /products/{id}/delete      - Confirm, then delete
//! ```
//!
//! Health endpoints and static files are mounted in [`crate::app`].

pub mod products;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .route("/products", get(products::index).post(products::submit))
        .route("/products/cancel", post(products::cancel))
        .route("/products/{id}/edit", post(products::begin_edit))
        .route("/products/{id}/delete", post(products::delete))
}
