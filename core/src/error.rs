//! Error types for the CRPT document client.
//!
//! # Design
//! `NotFound`, `Unauthorized` and `RateLimited` get dedicated variants because
//! callers react to them differently (re-sign, give up, back off). All other
//! non-2xx responses land in `HttpError` with the raw status code and body.

use thiserror::Error;

/// Errors returned by the client, the rate limiter and the transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A rate limiter was configured with zero permits.
    #[error("request limit must be positive")]
    InvalidRequestLimit,

    /// A rate limiter was configured with an empty time window.
    #[error("time window must be non-zero")]
    InvalidWindow,

    /// The document failed local checks before anything was sent.
    #[error("invalid document: {0}")]
    Validation(String),

    /// The server rejected the signature (401 or 403).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 429.
    #[error("rate limited by server")]
    RateLimited,

    /// The server returned any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The HTTP round-trip itself failed (DNS, connect, timeout, I/O).
    #[error("transport failed: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
