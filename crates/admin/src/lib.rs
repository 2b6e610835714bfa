//! Product Manager admin library.
//!
//! A server-rendered form for listing, creating, editing and deleting the
//! documents of one Appwrite collection. The binary in `main.rs` only loads
//! configuration, installs logging and serves [`app`]; everything else lives
//! here so it can be driven from tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod appwrite;
pub mod config;
pub mod error;
pub mod form;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{create_session_layer, security_headers_middleware};
use crate::state::AppState;

/// Directory the stylesheet is served from.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router.
///
/// Layers are applied so that Sentry sees every request first, then tracing,
/// then the session, then the security headers.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the product store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AdminConfig;
    use crate::store::MemoryProductStore;

    fn test_app(store: &MemoryProductStore) -> Router {
        app(AppState::with_store(
            AdminConfig::in_memory(),
            Arc::new(store.clone()),
        ))
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response")
    }

    #[tokio::test]
    async fn test_health() {
        let response = get(test_app(&MemoryProductStore::new()), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_follows_store() {
        let store = MemoryProductStore::new();
        let response = get(test_app(&store), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::OK);

        store.set_unavailable(true);
        let response = get(test_app(&store), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_root_redirects_to_products() {
        let response = get(test_app(&MemoryProductStore::new()), "/").await;
        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).expect("location"),
            "/products"
        );
    }

    #[tokio::test]
    async fn test_products_page_has_security_headers() {
        let response = get(test_app(&MemoryProductStore::new()), "/products").await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).expect("xfo"), "DENY");
        assert!(
            headers
                .get(header::CONTENT_SECURITY_POLICY)
                .expect("csp")
                .to_str()
                .expect("ascii")
                .contains("default-src 'none'")
        );
    }

    #[tokio::test]
    async fn test_anonymous_page_views_store_no_session() {
        let store = MemoryProductStore::new();
        let app = test_app(&store);

        for _ in 0..50 {
            let response = get(app.clone(), "/products").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(header::SET_COOKIE).is_none());
        }
        assert_eq!(store.request_count(), 50);
    }

    #[tokio::test]
    async fn test_form_with_state_gets_a_session() {
        let response = test_app(&MemoryProductStore::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/products")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=&price=abc"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .expect("ascii");
        assert!(cookie.starts_with(middleware::SESSION_COOKIE_NAME));
    }

    #[tokio::test]
    async fn test_edit_unknown_product_is_not_found() {
        let response = test_app(&MemoryProductStore::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/products/missing/edit")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
