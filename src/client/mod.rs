//! REST client implementation.
//!
//! This module provides the dispatching side of the crate, enabling callers to:
//!
//! - **Send typed messages** and get back the status code
//! - **Cancel** a dispatch at any step through a `CancellationToken`
//! - **Plug in a transport**, with reqwest as the default
//! - **Configure** the reqwest-backed client in one place
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch     - RestClient and the send operation
//! ├── transport - Transport trait and the reqwest adapter
//! ├── config    - Client configuration
//! └── utils     - URL resolution and status helpers
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RestClient`] | Dispatches messages over a shared transport |
//! | [`Transport`] | Executes wire requests |
//! | [`ClientConfig`] | Client configuration options |
//!
//! # Examples
//!
//! ## Creating a Client
//!
//! ```
//! use typed_rest_http::client::{ClientConfig, RestClient};
//!
//! // Default configuration, absolute endpoints only
//! let client = RestClient::with_config(ClientConfig::default()).unwrap();
//! assert!(client.base_url().is_none());
//!
//! // Custom configuration
//! let config = ClientConfig {
//!     request_timeout_ms: 5_000,
//!     enable_logging: false,
//!     ..ClientConfig::with_base_url("https://api.example.com/v2/")
//! };
//! let client = RestClient::with_config(config).unwrap();
//! assert_eq!(client.base_url().unwrap().host_str(), Some("api.example.com"));
//! ```

mod config;
mod fetch;
mod transport;
pub(crate) mod utils;

pub use config::ClientConfig;
pub use fetch::RestClient;
pub use transport::Transport;
pub use crate::cancel::with_cancellation;
pub use utils::{resolve_url, status_forbids_body, validate_base_url};
