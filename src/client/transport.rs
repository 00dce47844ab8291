//! The transport seam.
//!
//! [`Transport`] is the single point where a [`HttpRequest`] becomes network
//! I/O. The crate ships an implementation for [`reqwest::Client`]; tests and
//! embedders can provide their own.
//!
//! # reqwest adapter
//!
//! - Request headers and content headers are both sent; content headers win on
//!   conflicting names.
//! - Buffered content is sent with a known length, streamed content chunked.
//! - Incoming headers are split with
//!   [`HeaderCollection::split_content_headers`]: content headers stay with the
//!   body.
//! - A response has content unless the status forbids a body or the request was
//!   `HEAD`. Even then, content headers (e.g. the `Content-Length` of a `HEAD`
//!   response) are kept on an empty content.
//! - The body is streamed, so it is only read when the response variant asks
//!   for it.

use crate::client::utils::status_forbids_body;
use crate::error::{RestError, Result};
use crate::protocol::{Content, ContentBody, HeaderCollection, HttpRequest, HttpResponse};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use http::Method;
use tokio_util::sync::CancellationToken;

/// Executes wire requests.
///
/// Implementations must be shareable across concurrent dispatches. The
/// cancellation token is passed through for transports with long-running
/// steps of their own; the client also races the whole call against it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response head with a (possibly streamed)
    /// body. Failures should be reported as [`RestError::Transport`].
    async fn round_trip(&self, request: HttpRequest, cancel: &CancellationToken) -> Result<HttpResponse>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn round_trip(&self, request: HttpRequest, _cancel: &CancellationToken) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            content,
        } = request;
        let is_head = method == Method::HEAD;

        let mut builder = self.request(method, url).headers(headers.to_header_map()?);
        if let Some(content) = content {
            let (content_headers, body) = content.into_parts();
            builder = builder.headers(content_headers.to_header_map()?);
            builder = match body {
                ContentBody::Full(bytes) => builder.body(bytes),
                ContentBody::Stream(stream) => builder.body(reqwest::Body::wrap_stream(stream)),
            };
        }

        let response = builder.send().await?;
        Ok(into_http_response(response, is_head))
    }
}

fn into_http_response(response: reqwest::Response, is_head: bool) -> HttpResponse {
    let status = response.status();
    let (headers, content_headers) =
        HeaderCollection::from_header_map(response.headers()).split_content_headers();

    let has_body = !is_head && !status_forbids_body(status);
    let content = if has_body {
        let stream = response.bytes_stream().map_err(RestError::from).boxed();
        Some(Content::from_parts(content_headers, ContentBody::Stream(stream)))
    } else if !content_headers.is_empty() {
        Some(Content::from_parts(content_headers, ContentBody::Full(Bytes::new())))
    } else {
        None
    };

    tracing::trace!(
        status = status.as_u16(),
        has_content = content.is_some(),
        "received response"
    );

    HttpResponse {
        status,
        headers,
        content,
    }
}
