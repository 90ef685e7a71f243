use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sitesearch_core::persist::{self, IndexPaths, MetaFile, SNAPSHOT_VERSION};
use sitesearch_core::{
    search, BuildConfig, DocId, Document, DocumentStore, IndexBuilder, IndexHandle, Tokenizer,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    10
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
    pub title: String,
    pub url: String,
    pub matched_terms: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub index_dir: PathBuf,
    pub handle: Arc<IndexHandle>,
    pub store: Arc<RwLock<DocumentStore>>,
    pub builder: Arc<IndexBuilder>,
    pub admin_token: Option<String>,
}

pub fn build_app(index_dir: &str) -> Result<Router> {
    // Load the snapshot at startup; queries must run through the same
    // analyzer the index was built with, so it comes from the meta file.
    let paths = IndexPaths::new(index_dir);
    let (index, store, meta) = persist::load_snapshot(&paths)?;
    tracing::info!(num_docs = index.total_documents(), index_dir, "loaded index snapshot");

    let builder = IndexBuilder::new(
        Tokenizer::new(meta.tokenizer),
        BuildConfig { boosts: index.boosts(), ..BuildConfig::default() },
    );
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState {
        index_dir: PathBuf::from(index_dir),
        handle: Arc::new(IndexHandle::new(index)),
        store: Arc::new(RwLock::new(store)),
        builder: Arc::new(builder),
        admin_token,
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/doc", post(upsert_doc_handler))
        .route("/index/doc/:doc_id", delete(remove_doc_handler))
        .route("/index/commit", post(commit_handler))
        .with_state(app_state)
        .layer(cors_layer());
    Ok(app)
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    }
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, 100);

    let snapshot = state.handle.snapshot();
    let results = search(&snapshot, state.builder.tokenizer(), &params.q, k);

    let store = state.store.read();
    let hits: Vec<SearchHit> = results
        .into_iter()
        .filter_map(|r| {
            let doc = store.get(r.doc_id).ok()?;
            Some(SearchHit {
                doc_id: r.doc_id,
                score: r.score,
                title: doc.title.clone(),
                url: doc.url.clone(),
                matched_terms: r.matched_terms.into_iter().collect(),
            })
        })
        .collect();

    Json(SearchResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        total_hits: hits.len(),
        results: hits,
    })
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<Document>, StatusCode> {
    let store = state.store.read();
    match store.get(doc_id) {
        Ok(doc) => Ok(Json(doc.clone())),
        Err(_) => Err(StatusCode::NOT_FOUND),
    }
}

// --- Admin endpoints ---

async fn upsert_doc_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(doc): Json<Document>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    // Store first so postings never reference an unknown document.
    let replaced = {
        let mut store = state.store.write();
        store.put(doc.clone()).is_some()
    };
    state.handle.add_document(&state.builder, &doc);
    tracing::info!(doc_id = doc.id, replaced, "indexed document");
    Ok(Json(serde_json::json!({ "doc_id": doc.id, "replaced": replaced })))
}

async fn remove_doc_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let removed = state.handle.remove_document(doc_id);
    state.store.write().remove(doc_id);
    tracing::info!(doc_id, removed, "removed document");
    Ok(Json(serde_json::json!({ "doc_id": doc_id, "removed": removed })))
}

async fn commit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let snapshot = state.handle.snapshot();
    let store = state.store.read();
    let meta = MetaFile {
        version: SNAPSHOT_VERSION,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        num_docs: snapshot.total_documents(),
        tokenizer: state.builder.tokenizer().config().clone(),
    };
    let paths = IndexPaths::new(&state.index_dir);
    persist::save_snapshot(&paths, &snapshot, &store, &meta)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    tracing::info!(num_docs = meta.num_docs, "committed index snapshot");
    Ok(Json(serde_json::json!({ "committed": true, "num_docs": meta.num_docs })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
