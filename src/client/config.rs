//! Client configuration.
//!
//! [`ClientConfig`] drives [`RestClient::with_config`](crate::RestClient::with_config),
//! which builds the underlying `reqwest::Client`.
//!
//! | Field | Default |
//! |-------|---------|
//! | `base_url` | none (endpoints must be absolute) |
//! | `request_timeout_ms` | 30 000 |
//! | `connect_timeout_ms` | 10 000 |
//! | `pool_idle_timeout_secs` | 90 |
//! | `max_idle_per_host` | 32 |
//! | `proxy_url` | empty (no proxy) |
//! | `user_agent` | `typed_rest_http/<version>` |
//! | `enable_logging` | `true` |

use std::time::Duration;

/// Configuration for a [`RestClient`](crate::RestClient) backed by reqwest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address endpoints are resolved against.
    pub base_url: Option<String>,
    /// Total time allowed for one request, in milliseconds.
    pub request_timeout_ms: u64,
    /// Time allowed to establish a connection, in milliseconds.
    pub connect_timeout_ms: u64,
    /// How long idle pooled connections are kept, in seconds.
    pub pool_idle_timeout_secs: u64,
    /// Idle connections kept per host.
    pub max_idle_per_host: usize,
    /// Proxy for all traffic; empty disables.
    pub proxy_url: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Emit per-dispatch `tracing` events.
    pub enable_logging: bool,
}

impl ClientConfig {
    /// Default configuration with a base address.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub(crate) fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub(crate) fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: None,
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            pool_idle_timeout_secs: 90,
            max_idle_per_host: 32,
            proxy_url: String::new(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            enable_logging: true,
        }
    }
}
