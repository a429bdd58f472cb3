//! Rate-limited client for the CRPT goods-marking registry.
//!
//! # Overview
//! Submits "introduce goods" documents as signed JSON and looks up their
//! processing state, never exceeding a configured number of requests per
//! time window.
//!
//! # Design
//! - `CrptClient` is a stateless codec: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. It never touches the network.
//! - `Transport` executes requests; `UreqTransport` is the real one.
//! - `RateLimiter` is a blocking sliding-window limiter shared by all callers.
//! - `CrptApi` composes the three and is safe to share across threads.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod rate_limit;
pub mod transport;
pub mod types;

pub use api::CrptApi;
pub use client::CrptClient;
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use rate_limit::RateLimiter;
pub use transport::{Transport, UreqTransport};
pub use types::{Description, DocType, Document, DocumentId, DocumentInfo, Product};
