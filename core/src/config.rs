//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://ismp.crpt.ru";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_LIMIT: u32 = 10;
pub const DEFAULT_WINDOW_MS: u64 = 1_000;

/// Connection and throttling settings for `CrptApi`.
///
/// Missing keys fall back to the defaults above when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub request_limit: u32,
    pub window_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            request_limit: DEFAULT_REQUEST_LIMIT,
            window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_limit == 0 {
            return Err(ApiError::InvalidRequestLimit);
        }
        if self.window_ms == 0 {
            return Err(ApiError::InvalidWindow);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApiError::Validation(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }
}
