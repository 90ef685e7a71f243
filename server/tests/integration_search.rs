use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

use sitesearch_core::persist::{self, IndexPaths, MetaFile, SNAPSHOT_VERSION};
use sitesearch_core::{
    BuildConfig, Document, DocumentStore, IndexBuilder, Tokenizer, TokenizerConfig,
};

fn doc(id: u32, title: &str, body: &str) -> Document {
    Document {
        id,
        url: format!("https://example.org/{id}"),
        title: title.into(),
        body: body.into(),
    }
}

fn write_snapshot(dir: &std::path::Path) {
    let mut store = DocumentStore::new();
    store.put(doc(0, "Doc 0", "Rust is great. rust systems programming."));
    store.put(doc(1, "Doc 1", "Learning rust."));

    let config = TokenizerConfig::default();
    let builder = IndexBuilder::new(Tokenizer::new(config.clone()), BuildConfig::default());
    let index = builder.build(store.iter()).unwrap();
    let meta = MetaFile {
        version: SNAPSHOT_VERSION,
        created_at: "2026-01-01T00:00:00Z".into(),
        num_docs: index.total_documents(),
        tokenizer: config,
    };
    persist::save_snapshot(&IndexPaths::new(dir), &index, &store, &meta).unwrap();
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() { Value::Null } else { serde_json::from_slice(&body).unwrap() };
    (status, json)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path());
    let app = sitesearch_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let (status, body) = get(app, "/search?q=rust&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let arr = body["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    // Doc 0 mentions rust twice and outranks doc 1.
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 0);
    assert_eq!(arr[1]["doc_id"].as_u64().unwrap(), 1);
    assert_eq!(body["total_hits"].as_u64().unwrap(), 2);
    assert_eq!(arr[0]["matched_terms"][0].as_str().unwrap(), "rust");
}

#[tokio::test]
async fn unknown_term_returns_no_hits() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path());
    let app = sitesearch_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let (status, body) = get(app, "/search?q=quasar").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_hits"].as_u64().unwrap(), 0);
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn doc_endpoint_returns_document_or_404() {
    let dir = tempdir().unwrap();
    write_snapshot(dir.path());
    let app = sitesearch_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let (status, body) = get(app.clone(), "/doc/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"].as_str().unwrap(), "Doc 1");

    let (status, _) = get(app, "/doc/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_add_is_visible_to_next_search() {
    std::env::set_var("ADMIN_TOKEN", "secret");
    let dir = tempdir().unwrap();
    write_snapshot(dir.path());
    let app = sitesearch_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let new_doc = json!({
        "id": 7,
        "url": "https://example.org/7",
        "title": "Heron watching",
        "body": "heron heron heron"
    });
    let req = Request::post("/index/doc")
        .header("content-type", "application/json")
        .header("X-ADMIN-TOKEN", "secret")
        .body(Body::from(new_doc.to_string()))
        .unwrap();
    let (status, body) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doc_id"].as_u64().unwrap(), 7);
    assert!(!body["replaced"].as_bool().unwrap());

    let (status, body) = get(app, "/search?q=heron").await;
    assert_eq!(status, StatusCode::OK);
    let arr = body["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 7);
    assert_eq!(arr[0]["title"].as_str().unwrap(), "Heron watching");
}

#[tokio::test]
async fn admin_remove_is_idempotent_over_http() {
    std::env::set_var("ADMIN_TOKEN", "secret");
    let dir = tempdir().unwrap();
    write_snapshot(dir.path());
    let app = sitesearch_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let delete = |uri: &str| {
        Request::delete(uri).header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap()
    };
    let (status, body) = send(app.clone(), delete("/index/doc/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["removed"].as_bool().unwrap());

    let (status, body) = send(app.clone(), delete("/index/doc/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["removed"].as_bool().unwrap());

    let (_, body) = get(app, "/search?q=learning").await;
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_endpoints_reject_bad_tokens() {
    std::env::set_var("ADMIN_TOKEN", "secret");
    let dir = tempdir().unwrap();
    write_snapshot(dir.path());
    let app = sitesearch_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let req = Request::post("/index/commit")
        .header("X-ADMIN-TOKEN", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::post("/index/commit").body(Body::empty()).unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn commit_writes_a_reloadable_snapshot() {
    std::env::set_var("ADMIN_TOKEN", "secret");
    let dir = tempdir().unwrap();
    write_snapshot(dir.path());
    let app = sitesearch_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let new_doc = json!({
        "id": 9,
        "url": "https://example.org/9",
        "title": "Osprey",
        "body": "osprey diving"
    });
    let req = Request::post("/index/doc")
        .header("content-type", "application/json")
        .header("X-ADMIN-TOKEN", "secret")
        .body(Body::from(new_doc.to_string()))
        .unwrap();
    let (status, _) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);

    let req = Request::post("/index/commit")
        .header("X-ADMIN-TOKEN", "secret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["committed"].as_bool().unwrap());
    assert_eq!(body["num_docs"].as_u64().unwrap(), 3);

    // A fresh app over the committed directory sees the added document.
    let app = sitesearch_server::build_app(dir.path().to_str().unwrap()).unwrap();
    let (status, body) = get(app, "/search?q=osprey").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["doc_id"].as_u64().unwrap(), 9);
}
