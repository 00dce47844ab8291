//! Main REST client implementation.
//!
//! Provides [`RestClient`], which dispatches [`Message`]s over a [`Transport`].
//!
//! # Examples
//!
//! ## Plain GET with a string response
//!
//! ```ignore
//! use typed_rest_http::{Exchange, EmptyRequest, RestClient, StringResponse};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let base = Url::parse("http://localhost:8080/")?;
//!     let client = RestClient::from_reqwest(reqwest::Client::new(), Some(base))?;
//!
//!     let mut message = Exchange::get("health", EmptyRequest::new(), StringResponse::new());
//!     let status = client.send(&mut message).await?;
//!     println!("{}: {:?}", status, message.into_response().content());
//!     Ok(())
//! }
//! ```
//!
//! ## Cancelling a dispatch
//!
//! ```ignore
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let guard = cancel.clone();
//! tokio::spawn(async move {
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     guard.cancel();
//! });
//!
//! match client.send_with_cancellation(&mut message, &cancel).await {
//!     Err(e) if e.is_cancelled() => println!("gave up"),
//!     other => println!("{:?}", other),
//! }
//! ```

use crate::client::config::ClientConfig;
use crate::client::transport::Transport;
use crate::cancel::with_cancellation;
use crate::client::utils::validate_base_url;
use crate::error::{RestError, Result};
use crate::message::Message;
use http::StatusCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Dispatches messages over a shared transport.
///
/// Cloning is cheap and clones share the transport. The client is immutable
/// and safe to use from concurrent tasks; each dispatch needs its own message.
///
/// # Dispatch
///
/// 1. Fail with [`RestError::Cancelled`] if the token is already cancelled
/// 2. Build the wire request from the message (resolving against the base address)
/// 3. Run the transport round-trip
/// 4. Feed the wire response back into the message
/// 5. Return the status code
///
/// Errors from any step are returned as-is; nothing is retried. A non-success
/// status code is not an error.
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn Transport>,
    base_url: Option<Url>,
    enable_logging: bool,
}

impl RestClient {
    /// Create a client over `transport`.
    ///
    /// With `base_url` set, relative endpoints are resolved against it;
    /// otherwise every endpoint must be absolute. Fails with
    /// [`RestError::InvalidArgument`] if `base_url` cannot be a base (e.g.
    /// `mailto:` addresses).
    pub fn new(transport: Arc<dyn Transport>, base_url: Option<Url>) -> Result<Self> {
        if let Some(url) = &base_url {
            validate_base_url(url)?;
        }
        Ok(RestClient {
            transport,
            base_url,
            enable_logging: true,
        })
    }

    /// Create a client over an existing `reqwest::Client`.
    pub fn from_reqwest(client: reqwest::Client, base_url: Option<Url>) -> Result<Self> {
        Self::new(Arc::new(client), base_url)
    }

    /// Create a reqwest-backed client from configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|url| {
                Url::parse(url)
                    .map_err(|e| RestError::InvalidArgument(format!("invalid base address '{}': {}", url, e)))
            })
            .transpose()?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .pool_idle_timeout(config.pool_idle_timeout())
            .pool_max_idle_per_host(config.max_idle_per_host)
            .user_agent(config.user_agent.clone());

        if !config.proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(&config.proxy_url).map_err(|e| {
                RestError::InvalidArgument(format!("invalid proxy '{}': {}", config.proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        Ok(Self::from_reqwest(client, base_url)?.with_logging(config.enable_logging))
    }

    /// Toggle per-dispatch `tracing` events.
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// The base address, if any.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// The shared transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Dispatch `message` and return the status code.
    ///
    /// On success the message's response is populated. See
    /// [`send_with_cancellation`](Self::send_with_cancellation) to make the
    /// dispatch cancellable.
    pub async fn send<M: Message>(&self, message: &mut M) -> Result<StatusCode> {
        self.send_with_cancellation(message, &CancellationToken::new()).await
    }

    /// Dispatch `message`, aborting with [`RestError::Cancelled`] when `cancel`
    /// fires.
    ///
    /// A token that is already cancelled fails before the transport is
    /// touched. After cancellation the message must be discarded.
    pub async fn send_with_cancellation<M: Message>(
        &self,
        message: &mut M,
        cancel: &CancellationToken,
    ) -> Result<StatusCode> {
        if cancel.is_cancelled() {
            if self.enable_logging {
                tracing::debug!("dispatch cancelled before start");
            }
            return Err(RestError::Cancelled);
        }

        let request = message.create_request(self.base_url.as_ref(), cancel).await?;
        let method = request.method.clone();
        let url = request.url.clone();
        if self.enable_logging {
            tracing::debug!(%method, %url, "sending message");
        }

        let result = self.dispatch(message, request, cancel).await;
        if self.enable_logging {
            match &result {
                Ok(status) => tracing::debug!(%method, %url, status = status.as_u16(), "message completed"),
                Err(RestError::Cancelled) => tracing::warn!(%method, %url, "message cancelled"),
                Err(e) => tracing::warn!(%method, %url, error = %e, "message failed"),
            }
        }
        result
    }

    async fn dispatch<M: Message>(
        &self,
        message: &mut M,
        request: crate::protocol::HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<StatusCode> {
        let response = with_cancellation(cancel, self.transport.round_trip(request, cancel)).await?;
        let status = response.status;
        message.read_response(response, cancel).await?;
        Ok(status)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("enable_logging", &self.enable_logging)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let base = Url::parse("http://localhost:8080/api/").unwrap();
        let client = RestClient::from_reqwest(reqwest::Client::new(), Some(base)).unwrap();
        assert_eq!(client.base_url().unwrap().as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let base = Url::parse("data:text/plain,hello").unwrap();
        let err = RestClient::from_reqwest(reqwest::Client::new(), Some(base)).unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }

    #[test]
    fn test_with_config() {
        let client = RestClient::with_config(ClientConfig::with_base_url("http://localhost/")).unwrap();
        assert_eq!(client.base_url().unwrap().as_str(), "http://localhost/");

        let err = RestClient::with_config(ClientConfig::with_base_url("not a url")).unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }

    #[test]
    fn test_with_config_rejects_bad_proxy() {
        let config = ClientConfig {
            proxy_url: "http://[::1".to_string(),
            ..Default::default()
        };
        assert!(RestClient::with_config(config).is_err());
    }
}
