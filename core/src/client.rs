//! Stateless HTTP request builder and response parser for the CRPT API.
//!
//! # Design
//! `CrptClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. Rate limiting and I/O live in `CrptApi`.

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Document, DocumentId, DocumentInfo};

pub const CREATE_DOCUMENT_PATH: &str = "/api/v3/lk/documents/create";

#[derive(Debug, Clone)]
pub struct CrptClient {
    base_url: String,
}

impl CrptClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the POST that registers `document`, signed with `signature`.
    ///
    /// The document is validated first so a bad payload never reaches the wire.
    pub fn build_create_document(&self, document: &Document, signature: &str) -> Result<HttpRequest> {
        document.validate()?;
        let body =
            serde_json::to_string(document).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{CREATE_DOCUMENT_PATH}", self.base_url),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("authorization".to_string(), signature.to_string()),
            ],
            body: Some(body),
        })
    }

    /// Build the GET for a document's processing state. `doc_id` is sent as a
    /// single percent-encoded path segment.
    pub fn build_document_info(&self, doc_id: &str, signature: &str) -> Result<HttpRequest> {
        if doc_id.trim().is_empty() {
            return Err(ApiError::Validation("doc_id is empty".to_string()));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Validation(format!("invalid base_url {:?}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Validation(format!("base_url {:?} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v4", "facade", "doc", doc_id, "info"]);
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: url.into(),
            headers: vec![("authorization".to_string(), signature.to_string())],
            body: None,
        })
    }

    /// The registry answers 200 on acceptance; 201 is tolerated.
    pub fn parse_create_document(&self, response: HttpResponse) -> Result<DocumentId> {
        check_status(&response, &[200, 201])?;
        decode(&response)
    }

    pub fn parse_document_info(&self, response: HttpResponse) -> Result<DocumentInfo> {
        check_status(&response, &[200])?;
        decode(&response)
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<()> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    match response.status {
        401 | 403 => Err(ApiError::Unauthorized(response.body.clone())),
        404 => Err(ApiError::NotFound),
        429 => Err(ApiError::RateLimited),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
