use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const INTRODUCE_GOODS: &str = "LP_INTRODUCE_GOODS";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentId {
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub doc_id: String,
    pub status: String,
    pub doc_type: String,
    pub body: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_message: String,
}

/// Submitted documents keyed by the registry id handed back to the caller.
#[derive(Clone, Debug)]
pub struct StoredDocument {
    pub signature: String,
    pub body: Value,
}

pub type Store = Arc<RwLock<HashMap<String, StoredDocument>>>;

type Rejection = (StatusCode, Json<ErrorBody>);

pub fn app() -> Router {
    app_with_store(Store::default())
}

/// Build the router around an existing store so tests can inspect submissions.
pub fn app_with_store(store: Store) -> Router {
    Router::new()
        .route("/api/v3/lk/documents/create", post(create_document))
        .route("/api/v4/facade/doc/{id}/info", get(document_info))
        .with_state(store)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(ErrorBody {
            error_message: message.into(),
        }),
    )
}

fn signature(headers: &HeaderMap) -> Result<String, Rejection> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "missing signature"))
}

async fn create_document(
    State(store): State<Store>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<DocumentId>, Rejection> {
    let signature = signature(&headers)?;

    if body.get("doc_type").and_then(Value::as_str) != Some(INTRODUCE_GOODS) {
        warn!("rejected document with unsupported doc_type");
        return Err(reject(StatusCode::BAD_REQUEST, "unsupported doc_type"));
    }
    let has_doc_id = body
        .get("doc_id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.is_empty());
    if !has_doc_id {
        return Err(reject(StatusCode::BAD_REQUEST, "doc_id is required"));
    }

    let id = Uuid::new_v4().to_string();
    store
        .write()
        .await
        .insert(id.clone(), StoredDocument { signature, body });
    info!(registry_id = %id, "document accepted");
    Ok(Json(DocumentId { value: id }))
}

async fn document_info(
    State(store): State<Store>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DocumentInfo>, Rejection> {
    signature(&headers)?;
    let documents = store.read().await;
    let stored = documents
        .get(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "document not found"))?;
    Ok(Json(DocumentInfo {
        doc_id: id,
        status: "CHECKED_OK".to_string(),
        doc_type: INTRODUCE_GOODS.to_string(),
        body: stored.body.clone(),
    }))
}
