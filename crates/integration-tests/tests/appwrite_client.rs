//! Integration tests for the Appwrite client.
//!
//! A small axum app stands in for the Databases REST API so the tests can
//! check paths, headers, request bodies and paging without a real project.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use product_manager_admin::appwrite::{AppwriteClient, AppwriteError};
use product_manager_admin::config::AppwriteConfig;
use product_manager_admin::store::ProductStore;
use product_manager_core::{CollectionId, DatabaseId, ProductDraft, ProductId, ProjectId};
use product_manager_integration_tests::spawn_router;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

const DOCUMENTS_PATH: &str = "/v1/databases/{db}/collections/{col}/documents";

#[derive(Debug, Clone)]
struct Recorded {
    method: &'static str,
    project: Option<String>,
    key: Option<String>,
    body: Option<Value>,
    query: Option<String>,
}

#[derive(Default)]
struct Fake {
    documents: Vec<Value>,
    requests: Vec<Recorded>,
    next_id: u64,
    fail_with: Option<StatusCode>,
}

type Shared = Arc<Mutex<Fake>>;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn record(
    fake: &mut Fake,
    method: &'static str,
    headers: &HeaderMap,
    body: Option<Value>,
    query: Option<String>,
) {
    fake.requests.push(Recorded {
        method,
        project: header(headers, "x-appwrite-project"),
        key: header(headers, "x-appwrite-key"),
        body,
        query,
    });
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": "Document with the requested ID could not be found.",
            "code": 404,
            "type": "document_not_found",
        })),
    )
        .into_response()
}

fn failure(status: StatusCode) -> Response {
    (
        status,
        Json(json!({ "message": "Server error", "code": status.as_u16(), "type": "general_unknown" })),
    )
        .into_response()
}

/// Pull `limit` and `offset` out of the JSON-encoded `queries[]` parameters.
fn paging(raw: Option<&str>) -> (usize, usize) {
    let mut limit = 25;
    let mut offset = 0;
    for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        if key != "queries[]" {
            continue;
        }
        let query: Value = serde_json::from_str(&value).expect("query is JSON");
        let n = query["values"][0].as_u64().expect("numeric value") as usize;
        match query["method"].as_str() {
            Some("limit") => limit = n,
            Some("offset") => offset = n,
            other => panic!("unexpected query method {other:?}"),
        }
    }
    (limit, offset)
}

async fn list(
    State(fake): State<Shared>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let mut fake = fake.lock().expect("lock");
    record(&mut fake, "GET", &headers, None, query.clone());
    if let Some(status) = fake.fail_with {
        return failure(status);
    }

    let (limit, offset) = paging(query.as_deref());
    let page: Vec<Value> = fake.documents.iter().skip(offset).take(limit).cloned().collect();
    Json(json!({ "total": fake.documents.len(), "documents": page })).into_response()
}

async fn create(State(fake): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut fake = fake.lock().expect("lock");
    record(&mut fake, "POST", &headers, Some(body.clone()), None);
    if let Some(status) = fake.fail_with {
        return failure(status);
    }

    assert_eq!(body["documentId"], "unique()");
    fake.next_id += 1;
    let mut doc = body["data"].clone();
    doc["$id"] = json!(format!("doc{}", fake.next_id));
    doc["$updatedAt"] = json!("2024-05-01T09:30:00.000+00:00");
    fake.documents.push(doc.clone());
    (StatusCode::CREATED, Json(doc)).into_response()
}

async fn update(
    State(fake): State<Shared>,
    Path((_db, _col, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut fake = fake.lock().expect("lock");
    record(&mut fake, "PATCH", &headers, Some(body.clone()), None);

    let Some(doc) = fake.documents.iter_mut().find(|d| d["$id"] == id.as_str()) else {
        return not_found();
    };
    if let Some(fields) = body["data"].as_object() {
        for (key, value) in fields {
            doc[key] = value.clone();
        }
    }
    Json(doc.clone()).into_response()
}

async fn delete(
    State(fake): State<Shared>,
    Path((_db, _col, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut fake = fake.lock().expect("lock");
    record(&mut fake, "DELETE", &headers, None, None);

    let before = fake.documents.len();
    fake.documents.retain(|d| d["$id"] != id.as_str());
    if fake.documents.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "version": "1.6.0" }))
}

async fn start_fake(documents: Vec<Value>, api_key: Option<&str>) -> (AppwriteClient, Shared) {
    let fake: Shared = Arc::new(Mutex::new(Fake {
        documents,
        ..Fake::default()
    }));

    let router = Router::new()
        .route(DOCUMENTS_PATH, get(list).post(create))
        .route(
            &format!("{DOCUMENTS_PATH}/{{id}}"),
            axum::routing::patch(update).delete(delete),
        )
        .route("/v1/health/version", get(health))
        .with_state(fake.clone());
    let (addr, _handle) = spawn_router(router).await;

    let config = AppwriteConfig {
        endpoint: Url::parse(&format!("http://{addr}/v1")).expect("url"),
        project_id: ProjectId::new("proj-test"),
        database_id: DatabaseId::new("shop"),
        collection_id: CollectionId::new("products"),
        api_key: api_key.map(|k| SecretString::from(k.to_string())),
    };
    let client = AppwriteClient::new(&config).expect("client");

    (client, fake)
}

fn document(n: usize) -> Value {
    json!({
        "$id": format!("seed{n}"),
        "name": format!("Product {n}"),
        "price": 10.0,
        "description": "",
        "category": "Seeded",
        "inStock": true,
    })
}

fn draft(name: &str, price: i64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        price: Decimal::from(price),
        description: "Crunchy".to_string(),
        category: "Snacks".to_string(),
        in_stock: true,
    }
}

fn requests(fake: &Shared) -> Vec<Recorded> {
    fake.lock().expect("lock").requests.clone()
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_walks_every_page() {
    let (client, fake) = start_fake((0..230).map(document).collect(), None).await;

    let products = client.list_products().await.expect("list");

    assert_eq!(products.len(), 230);
    assert_eq!(products[0].id.as_str(), "seed0");
    assert_eq!(products[229].name, "Product 229");
    // Empty strings from the collection read back as absent.
    assert_eq!(products[0].description, None);

    let gets = requests(&fake);
    assert_eq!(gets.len(), 3);
    assert!(gets.iter().all(|r| r.method == "GET"));
}

#[tokio::test]
async fn test_list_empty_collection() {
    let (client, fake) = start_fake(vec![], None).await;

    assert!(client.list_products().await.expect("list").is_empty());
    assert_eq!(requests(&fake).len(), 1);
}

#[tokio::test]
async fn test_list_sends_limit_query() {
    let (client, fake) = start_fake(vec![document(1)], None).await;
    client.list_products().await.expect("list");

    let query = requests(&fake)[0].query.clone().expect("query string");
    assert_eq!(paging(Some(&query)), (100, 0));
}

#[tokio::test]
async fn test_list_server_error_is_store_error() {
    let (client, fake) = start_fake(vec![document(1)], None).await;
    fake.lock().expect("lock").fail_with = Some(StatusCode::INTERNAL_SERVER_ERROR);

    let err = client.list_documents().await.expect_err("should fail");
    assert!(matches!(err, AppwriteError::Api { status: 500, .. }));
    assert!(client.list_products().await.is_err());
}

#[tokio::test]
async fn test_unauthorized_is_mapped() {
    let (client, fake) = start_fake(vec![], None).await;
    fake.lock().expect("lock").fail_with = Some(StatusCode::UNAUTHORIZED);

    let err = client.list_documents().await.expect_err("should fail");
    assert!(matches!(err, AppwriteError::Unauthorized(_)));
}

// ============================================================================
// Create / Update / Delete
// ============================================================================

#[tokio::test]
async fn test_create_sends_unique_id_and_attributes() {
    let (client, fake) = start_fake(vec![], Some("standard_9f8a7b6c5d4e3f2a1b0c")).await;

    let product = client
        .create_product(&draft("Banana Chips", 75))
        .await
        .expect("create");

    assert_eq!(product.id.as_str(), "doc1");
    assert_eq!(product.name, "Banana Chips");
    assert_eq!(product.price.amount(), Decimal::from(75));
    assert!(product.updated_at.is_some());

    let recorded = &requests(&fake)[0];
    assert_eq!(recorded.method, "POST");
    assert_eq!(recorded.project.as_deref(), Some("proj-test"));
    assert_eq!(recorded.key.as_deref(), Some("standard_9f8a7b6c5d4e3f2a1b0c"));
    let body = recorded.body.clone().expect("body");
    assert_eq!(
        body["data"],
        json!({
            "name": "Banana Chips",
            "price": 75.0,
            "description": "Crunchy",
            "category": "Snacks",
            "inStock": true,
        })
    );
}

#[tokio::test]
async fn test_no_api_key_header_without_key() {
    let (client, fake) = start_fake(vec![], None).await;
    client.list_products().await.expect("list");

    let recorded = &requests(&fake)[0];
    assert_eq!(recorded.project.as_deref(), Some("proj-test"));
    assert_eq!(recorded.key, None);
}

#[tokio::test]
async fn test_update_patches_attributes() {
    let (client, fake) = start_fake(vec![document(1)], None).await;

    let mut changed = draft("Renamed", 12);
    changed.in_stock = false;
    let product = client
        .update_product(&ProductId::new("seed1"), &changed)
        .await
        .expect("update");

    assert_eq!(product.name, "Renamed");
    assert!(!product.in_stock);

    let recorded = &requests(&fake)[0];
    assert_eq!(recorded.method, "PATCH");
    assert_eq!(recorded.body.clone().expect("body")["data"]["inStock"], false);
}

#[tokio::test]
async fn test_update_missing_document_is_not_found() {
    let (client, _fake) = start_fake(vec![], None).await;

    let err = client
        .update_document(&ProductId::new("gone"), &draft("X", 1))
        .await
        .expect_err("should fail");
    assert!(matches!(err, AppwriteError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_removes_document() {
    let (client, fake) = start_fake(vec![document(1), document(2)], None).await;

    client
        .delete_product(&ProductId::new("seed1"))
        .await
        .expect("delete");

    let remaining = client.list_products().await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id.as_str(), "seed2");
    assert_eq!(requests(&fake)[0].method, "DELETE");
}

#[tokio::test]
async fn test_delete_missing_document_fails() {
    let (client, _fake) = start_fake(vec![], None).await;
    assert!(client.delete_product(&ProductId::new("gone")).await.is_err());
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_version() {
    let (client, _fake) = start_fake(vec![], None).await;

    assert_eq!(client.health().await.expect("health"), "1.6.0");
    assert!(client.health_check().await.is_ok());
}
