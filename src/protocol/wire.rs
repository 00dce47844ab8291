//! Wire-level request and response values exchanged with a transport.
//!
//! A message turns itself into an [`HttpRequest`]; the transport executes it
//! and hands back an [`HttpResponse`], which the message consumes. Neither
//! value is retained by the message afterwards.

use crate::protocol::{Content, HeaderCollection};
use http::{Method, StatusCode};
use url::Url;

/// A request ready for a transport.
#[derive(Debug)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute target address.
    pub url: Url,
    /// Request headers (content headers travel with `content`).
    pub headers: HeaderCollection,
    /// Body, if the request carries one.
    pub content: Option<Content>,
}

/// A response as returned by a transport.
#[derive(Debug)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers, without content headers.
    pub headers: HeaderCollection,
    /// Body with its content headers, if any.
    pub content: Option<Content>,
}

impl HttpResponse {
    /// A response with `status`, no headers and no content.
    pub fn new(status: StatusCode) -> Self {
        HttpResponse {
            status,
            headers: HeaderCollection::new(),
            content: None,
        }
    }

    /// Append a response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Attach content.
    #[must_use]
    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }
}
