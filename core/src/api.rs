//! Rate-limited, thread-safe facade over the codec and a transport.
//!
//! # Design
//! `CrptApi` owns a `CrptClient`, a `RateLimiter` and a `Transport`. Every call
//! builds its request first, so an invalid document fails fast without
//! spending a permit, then waits for a permit, sends, and parses. All methods
//! take `&self`; wrap the value in an `Arc` to share it across threads.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::client::CrptClient;
use crate::config::ApiConfig;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::rate_limit::RateLimiter;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Document, DocumentId, DocumentInfo};

#[derive(Debug)]
pub struct CrptApi<T: Transport = UreqTransport> {
    client: CrptClient,
    limiter: RateLimiter,
    transport: T,
}

impl CrptApi<UreqTransport> {
    /// Client for the production registry allowing `request_limit` calls per `window`.
    ///
    /// The window is used as given, without rounding to milliseconds.
    pub fn new(window: Duration, request_limit: u32) -> Result<Self> {
        let config = ApiConfig::default();
        Ok(Self {
            client: CrptClient::new(&config.base_url),
            limiter: RateLimiter::new(request_limit, window)?,
            transport: UreqTransport::new(config.timeout()),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new(config.timeout()))
    }
}

impl<T: Transport> CrptApi<T> {
    pub fn with_transport(config: &ApiConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: CrptClient::new(&config.base_url),
            limiter: RateLimiter::new(config.request_limit, config.window())?,
            transport,
        })
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Submit an "introduce goods" document. Blocks while the request budget is spent.
    pub fn create_document(&self, document: &Document, signature: &str) -> Result<DocumentId> {
        let request = self.client.build_create_document(document, signature)?;
        let response = self.send(request)?;
        let result = self.client.parse_create_document(response);
        match &result {
            Ok(id) => info!(doc_id = %document.doc_id, registry_id = %id.value, "document created"),
            Err(e) => warn!(doc_id = %document.doc_id, error = %e, "document rejected"),
        }
        result
    }

    /// Look up the processing state of a submitted document.
    pub fn document_info(&self, doc_id: &str, signature: &str) -> Result<DocumentInfo> {
        let request = self.client.build_document_info(doc_id, signature)?;
        let response = self.send(request)?;
        let result = self.client.parse_document_info(response);
        match &result {
            Ok(info) => info!(doc_id = %doc_id, status = %info.status, "document info fetched"),
            Err(e) => warn!(doc_id = %doc_id, error = %e, "document info lookup failed"),
        }
        result
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.limiter.acquire();
        debug!(method = request.method.as_str(), url = %request.path, "permit granted");
        let response = self.transport.execute(&request)?;
        if !response.is_success() {
            warn!(status = response.status, url = %request.path, "unsuccessful response");
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use parking_lot::Mutex;

    use super::*;
    use crate::error::ApiError;
    use crate::http::HttpMethod;
    use crate::types::fixtures::document;

    /// Answers every request with a canned response and records what it saw.
    struct FakeTransport {
        status: u16,
        body: String,
        seen: Mutex<Vec<(HttpRequest, Instant)>>,
    }

    impl FakeTransport {
        fn ok(body: &str) -> Self {
            Self {
                status: 200,
                body: body.to_string(),
                seen: Mutex::default(),
            }
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().push((request.clone(), Instant::now()));
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse> {
            Err(ApiError::Transport("connection refused".to_string()))
        }
    }

    fn config(limit: u32, window_ms: u64) -> ApiConfig {
        ApiConfig {
            base_url: "http://registry.test".to_string(),
            request_limit: limit,
            window_ms,
            ..ApiConfig::default()
        }
    }

    #[test]
    fn new_rejects_non_positive_limit() {
        let err = CrptApi::new(Duration::from_secs(1), 0).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequestLimit));
    }

    #[test]
    fn new_rejects_zero_window() {
        let err = CrptApi::new(Duration::ZERO, 5).unwrap_err();
        assert!(matches!(err, ApiError::InvalidWindow));
    }

    #[test]
    fn new_keeps_sub_millisecond_window() {
        let window = Duration::from_micros(500);
        let api = CrptApi::new(window, 5).unwrap();
        assert_eq!(api.limiter().window(), window);
        assert_eq!(api.limiter().limit(), 5);
    }

    #[test]
    fn blank_info_id_does_not_consume_a_permit() {
        let api = CrptApi::with_transport(&config(1, 60_000), FakeTransport::ok("{}")).unwrap();

        assert!(matches!(
            api.document_info(" ", "sig"),
            Err(ApiError::Validation(_))
        ));
        assert_eq!(api.limiter().in_flight(), 0);
        assert!(api.transport.seen.lock().is_empty());
    }

    #[test]
    fn document_info_encodes_id_on_the_wire() {
        let body = serde_json::json!({
            "doc_id": "a/b",
            "status": "CHECKED_OK",
            "doc_type": "LP_INTRODUCE_GOODS",
            "body": document(),
        });
        let api = CrptApi::with_transport(&config(5, 1_000), FakeTransport::ok(&body.to_string()))
            .unwrap();
        let info = api.document_info("a/b", "sig").unwrap();
        assert_eq!(info.status, "CHECKED_OK");

        let seen = api.transport.seen.lock();
        assert_eq!(seen[0].0.path, "http://registry.test/api/v4/facade/doc/a%2Fb/info");
    }

    #[test]
    fn create_document_sends_signed_json() {
        let api = CrptApi::with_transport(&config(5, 1_000), FakeTransport::ok(r#"{"value":"r-1"}"#))
            .unwrap();
        let id = api.create_document(&document(), "signature").unwrap();
        assert_eq!(id.value, "r-1");

        let seen = api.transport.seen.lock();
        assert_eq!(seen.len(), 1);
        let request = &seen[0].0;
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "http://registry.test/api/v3/lk/documents/create");
        assert_eq!(request.header("authorization"), Some("signature"));
    }

    #[test]
    fn invalid_document_does_not_consume_a_permit() {
        let api = CrptApi::with_transport(&config(1, 60_000), FakeTransport::ok("{}")).unwrap();
        let mut doc = document();
        doc.products.clear();

        assert!(matches!(
            api.create_document(&doc, "sig"),
            Err(ApiError::Validation(_))
        ));
        assert_eq!(api.limiter().in_flight(), 0);
        assert!(api.transport.seen.lock().is_empty());
    }

    #[test]
    fn server_errors_surface_as_http_error() {
        let transport = FakeTransport {
            status: 503,
            body: "maintenance".to_string(),
            seen: Mutex::default(),
        };
        let api = CrptApi::with_transport(&config(5, 1_000), transport).unwrap();
        let err = api.create_document(&document(), "sig").unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 503, .. }));
    }

    #[test]
    fn transport_failure_propagates() {
        let api = CrptApi::with_transport(&config(5, 1_000), FailingTransport).unwrap();
        let err = api.document_info("x", "sig").unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn calls_beyond_the_limit_wait_for_the_window() {
        let window = Duration::from_millis(200);
        let api = Arc::new(
            CrptApi::with_transport(
                &config(2, window.as_millis() as u64),
                FakeTransport::ok(r#"{"value":"r"}"#),
            )
            .unwrap(),
        );

        let start = Instant::now();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let api = Arc::clone(&api);
                std::thread::spawn(move || api.create_document(&document(), "sig").map(|_| ()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let seen = api.transport.seen.lock();
        assert_eq!(seen.len(), 4);
        let last = seen.iter().map(|(_, t)| *t).max().unwrap();
        // Four requests at two per window: the last ones wait a full window.
        assert!(last.duration_since(start) >= window);
    }
}
