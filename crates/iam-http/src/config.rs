//! Client configuration.

use std::time::Duration;

use iam_core::MAX_PRINCIPALS_PER_BATCH;
use serde::{Deserialize, Serialize};

use crate::{HttpClientError, HttpClientResult};

/// Configuration for [`crate::IamHttpClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IamClientConfig {
    /// Service root, e.g. `https://iam.example.com`.
    pub base_url: String,

    /// Organization that scopes principal lookups.
    #[serde(default)]
    pub org_id: String,

    /// Bearer token. Never written back out.
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Principal ids per lookup request.
    #[serde(default = "default_principal_batch_size")]
    pub principal_batch_size: usize,
}

const fn default_connect_timeout_ms() -> u64 {
    10_000 // 10 seconds
}

const fn default_request_timeout_ms() -> u64 {
    30_000 // 30 seconds
}

const fn default_principal_batch_size() -> usize {
    MAX_PRINCIPALS_PER_BATCH
}

impl IamClientConfig {
    /// Config with default timeouts and batch size.
    #[must_use]
    pub fn new(base_url: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            org_id: org_id.into(),
            api_token: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            principal_batch_size: default_principal_batch_size(),
        }
    }

    /// Builder: set the bearer token.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Builder: set the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    /// Connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `HttpClientError::InvalidConfig` if validation fails.
    pub fn validate(&self) -> HttpClientResult<()> {
        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HttpClientError::InvalidConfig(format!(
                "base_url must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.org_id.trim().is_empty() {
            return Err(HttpClientError::InvalidConfig(
                "org_id cannot be empty".into(),
            ));
        }

        if self.request_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(HttpClientError::InvalidConfig(
                "timeouts must be greater than zero".into(),
            ));
        }

        if !(1..=MAX_PRINCIPALS_PER_BATCH).contains(&self.principal_batch_size) {
            return Err(HttpClientError::InvalidConfig(format!(
                "principal_batch_size must be between 1 and {MAX_PRINCIPALS_PER_BATCH}"
            )));
        }

        Ok(())
    }
}
