//! Integration tests for the product manager.
//!
//! # Running Tests
//!
//! ```bash
//! # Form flow and Appwrite wire tests (self-contained)
//! cargo test -p product-manager-integration-tests
//!
//! # Live Appwrite project (needs APPWRITE_* env vars)
//! cargo test -p product-manager-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `product_form` - the admin server over HTTP, backed by the in-memory store
//! - `appwrite_client` - the Appwrite client against a local fake server
//! - `appwrite_live` - the Appwrite client against a real project

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Arc;

use product_manager_admin::config::AdminConfig;
use product_manager_admin::state::AppState;
use product_manager_admin::store::MemoryProductStore;
use reqwest::{Client, StatusCode};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Bind an ephemeral port on loopback and serve `router` on it.
pub async fn spawn_router(router: axum::Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    (addr, handle)
}

/// A running admin server with its own cookie-keeping client.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub store: MemoryProductStore,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server over an empty in-memory store.
    pub async fn start() -> Self {
        Self::with_store(MemoryProductStore::new()).await
    }

    /// Start a server over `store`.
    pub async fn with_store(store: MemoryProductStore) -> Self {
        let state = AppState::with_store(AdminConfig::in_memory(), Arc::new(store.clone()));
        let (addr, handle) = spawn_router(product_manager_admin::app(state)).await;

        Self {
            base_url: format!("http://{addr}"),
            client: new_browser(),
            store,
            handle,
        }
    }

    /// A second browser against the same server, with its own session.
    #[must_use]
    pub fn other_browser(&self) -> Client {
        new_browser()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a page and return status and body.
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET");
        let status = resp.status();
        (status, resp.text().await.expect("Failed to read body"))
    }

    /// POST a form and return status and body.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> (StatusCode, String) {
        let resp = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to send POST");
        let status = resp.status();
        (status, resp.text().await.expect("Failed to read body"))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn new_browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
