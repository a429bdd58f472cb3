//! End-to-end test against the live mock registry.
//!
//! # Design
//! Starts the mock server on a random port, then drives `CrptApi` with the
//! real `UreqTransport`. Validates request building, the wire format, response
//! parsing and throttling together.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use crpt_core::{ApiConfig, ApiError, CrptApi, DocType, Document, Product};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn api(addr: SocketAddr, request_limit: u32, window_ms: u64) -> CrptApi {
    let config = ApiConfig {
        base_url: format!("http://{addr}"),
        timeout_secs: 5,
        request_limit,
        window_ms,
    };
    CrptApi::from_config(&config).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn document(doc_id: &str) -> Document {
    Document {
        description: None,
        doc_id: doc_id.to_string(),
        doc_status: "NEW".to_string(),
        doc_type: DocType::LpIntroduceGoods,
        import_request: true,
        owner_inn: "7700000000".to_string(),
        participant_inn: "7700000000".to_string(),
        producer_inn: "7700000000".to_string(),
        production_date: date("2020-01-23"),
        production_type: "OWN_PRODUCTION".to_string(),
        products: vec![Product {
            certificate_document: None,
            certificate_document_date: None,
            certificate_document_number: None,
            owner_inn: "7700000000".to_string(),
            producer_inn: "7700000000".to_string(),
            production_date: date("2020-01-23"),
            tnved_code: "6401100000".to_string(),
            uit_code: Some("010460043993125621JgXJ5.T".to_string()),
            uitu_code: None,
        }],
        reg_date: None,
        reg_number: None,
    }
}

#[test]
fn create_and_look_up_document() {
    let addr = start_server();
    let api = api(addr, 10, 1_000);

    // Step 1: submit.
    let doc = document("integration-1");
    let id = api.create_document(&doc, "signature").unwrap();
    assert!(!id.value.is_empty());

    // Step 2: the registry echoes the stored document back.
    let info = api.document_info(&id.value, "signature").unwrap();
    assert_eq!(info.doc_id, id.value);
    assert_eq!(info.doc_type, DocType::LpIntroduceGoods);
    assert_eq!(info.body, doc);

    // Step 3: unknown ids are NotFound.
    let err = api.document_info("does-not-exist", "signature").unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn blank_signature_is_unauthorized() {
    let addr = start_server();
    let api = api(addr, 10, 1_000);

    let err = api.create_document(&document("no-sig"), "").unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[test]
fn throttles_concurrent_submissions() {
    let addr = start_server();
    let window = Duration::from_millis(300);
    let api = Arc::new(api(addr, 2, window.as_millis() as u64));
    let start = Instant::now();

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let api = Arc::clone(&api);
            std::thread::spawn(move || api.create_document(&document(&format!("batch-{i}")), "sig"))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    // Five requests at two per window span at least two windows.
    assert!(start.elapsed() >= window * 2);
}

#[test]
fn unreachable_registry_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let api = api(addr, 1, 1_000);

    let err = api.create_document(&document("offline"), "sig").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
