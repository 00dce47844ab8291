//! Request variants.
//!
//! Each variant carries request headers and knows how to produce its body:
//!
//! | Variant | Body | `Content-Type` |
//! |---------|------|----------------|
//! | [`EmptyRequest`] | none | none |
//! | [`StringRequest`] | encoded text | `text/plain; charset=utf-8` unless overridden |
//! | [`JsonRequest`] | serialized `T` | `application/json; charset=utf-8` |
//! | [`FormUrlEncodedRequest`] | `k=v&k=v`, input order | `application/x-www-form-urlencoded` |
//!
//! # Examples
//!
//! ```
//! use typed_rest_http::message::{FormUrlEncodedRequest, Request, StringRequest};
//! use typed_rest_http::protocol::TextEncoding;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let cancel = CancellationToken::new();
//!
//! let request = StringRequest::new("<p>hi</p>")
//!     .with_encoding(TextEncoding::utf8())
//!     .with_media_type("text/html");
//! let content = request.create_content(&cancel).await.unwrap().unwrap();
//! assert_eq!(content.headers().get_first("Content-Type"), Some("text/html; charset=utf-8"));
//!
//! let form = FormUrlEncodedRequest::new([("q", "rust lang"), ("page", "2")]);
//! let content = form.create_content(&cancel).await.unwrap().unwrap();
//! assert_eq!(&content.as_bytes().unwrap()[..], b"q=rust+lang&page=2");
//! # });
//! ```

use super::sealed::Sealed;
use crate::error::{RestError, Result};
use crate::protocol::constants::media_types;
use crate::protocol::{parse_media_type, Content, HeaderCollection, TextEncoding};
use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// The request half of a message.
///
/// Implemented by the variants in this module only.
#[async_trait]
pub trait Request: Send + Sync + Sealed {
    /// Headers sent with the request.
    fn headers(&self) -> &HeaderCollection;

    /// Mutable access to the request headers.
    fn headers_mut(&mut self) -> &mut HeaderCollection;

    /// Produce the body, or `None` when the request has none.
    async fn create_content(&self, cancel: &CancellationToken) -> Result<Option<Content>>;
}

/// A request without a body.
#[derive(Debug, Clone, Default)]
pub struct EmptyRequest {
    headers: HeaderCollection,
}

impl EmptyRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }
}

impl Sealed for EmptyRequest {}

#[async_trait]
impl Request for EmptyRequest {
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }

    async fn create_content(&self, cancel: &CancellationToken) -> Result<Option<Content>> {
        if cancel.is_cancelled() {
            return Err(RestError::Cancelled);
        }
        Ok(None)
    }
}

/// A text body.
///
/// The payload is fixed at construction. The encoding and media type may be
/// overridden, with this precedence:
///
/// 1. no encoding: UTF-8 as `text/plain` (a media type override is ignored)
/// 2. encoding only: that encoding as `text/plain`
/// 3. encoding and media type: both
///
/// The `charset` parameter carries the encoding's canonical name, so
/// [`TextEncoding::windows_1252`] is announced as `charset=windows-1252`.
#[derive(Debug, Clone)]
pub struct StringRequest {
    payload: String,
    encoding: Option<TextEncoding>,
    media_type: Option<String>,
    headers: HeaderCollection,
}

impl StringRequest {
    /// Create a request carrying `payload`.
    pub fn new(payload: impl Into<String>) -> Self {
        StringRequest {
            payload: payload.into(),
            encoding: None,
            media_type: None,
            headers: HeaderCollection::new(),
        }
    }

    /// Override the text encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Override the media type. Only honoured together with an encoding.
    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Append a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set or clear the encoding override.
    pub fn set_encoding(&mut self, encoding: Option<TextEncoding>) {
        self.encoding = encoding;
    }

    /// Set or clear the media type override.
    pub fn set_media_type(&mut self, media_type: Option<String>) {
        self.media_type = media_type;
    }

    /// The text payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// The encoding override.
    pub fn encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }

    /// The media type override.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }
}

impl Sealed for StringRequest {}

#[async_trait]
impl Request for StringRequest {
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }

    async fn create_content(&self, cancel: &CancellationToken) -> Result<Option<Content>> {
        if cancel.is_cancelled() {
            return Err(RestError::Cancelled);
        }

        let content = match (self.encoding, self.media_type.as_deref()) {
            (None, _) => Content::from_text(&self.payload, TextEncoding::utf8(), media_types::TEXT_PLAIN),
            (Some(encoding), None) => Content::from_text(&self.payload, encoding, media_types::TEXT_PLAIN),
            (Some(encoding), Some(media_type)) => {
                let mime = parse_media_type(media_type).ok_or_else(|| {
                    RestError::InvalidArgument(format!("invalid media type: '{}'", media_type))
                })?;
                Content::from_text(&self.payload, encoding, mime.essence_str())
            }
        };
        Ok(Some(content))
    }
}

/// Serialization settings for [`JsonRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonOptions {
    /// Emit indented JSON.
    pub pretty: bool,
    /// Media type announced in `Content-Type`.
    pub media_type: String,
}

impl JsonOptions {
    /// Compact output as `application/json`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle indented output.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Announce a different media type, e.g. `application/merge-patch+json`.
    #[must_use]
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let body = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(body)
    }
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions {
            pretty: false,
            media_type: media_types::JSON.to_string(),
        }
    }
}

/// A JSON body serialized from `T`.
#[derive(Debug, Clone)]
pub struct JsonRequest<T> {
    payload: T,
    options: JsonOptions,
    headers: HeaderCollection,
}

impl<T> JsonRequest<T>
where
    T: Serialize + Send + Sync,
{
    /// Create a request carrying `payload` with default options.
    pub fn new(payload: T) -> Self {
        JsonRequest {
            payload,
            options: JsonOptions::default(),
            headers: HeaderCollection::new(),
        }
    }

    /// Replace the serialization options.
    #[must_use]
    pub fn with_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }

    /// Append a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// The serialization options.
    pub fn options(&self) -> &JsonOptions {
        &self.options
    }
}

impl<T> Sealed for JsonRequest<T> {}

#[async_trait]
impl<T> Request for JsonRequest<T>
where
    T: Serialize + Send + Sync,
{
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }

    async fn create_content(&self, cancel: &CancellationToken) -> Result<Option<Content>> {
        if cancel.is_cancelled() {
            return Err(RestError::Cancelled);
        }

        let body = self.options.serialize(&self.payload)?;
        tracing::trace!(len = body.len(), "serialized JSON payload");
        let content = Content::from_bytes(body).with_header(
            CONTENT_TYPE.as_str(),
            format!("{}; charset=utf-8", self.options.media_type),
        );
        Ok(Some(content))
    }
}

/// An `application/x-www-form-urlencoded` body.
///
/// Pairs are emitted in the order given; duplicate keys are kept.
#[derive(Debug, Clone)]
pub struct FormUrlEncodedRequest {
    payload: Vec<(String, String)>,
    headers: HeaderCollection,
}

impl FormUrlEncodedRequest {
    /// Create a request from key/value pairs.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        FormUrlEncodedRequest {
            payload: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            headers: HeaderCollection::new(),
        }
    }

    /// Append a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The key/value pairs.
    pub fn payload(&self) -> &[(String, String)] {
        &self.payload
    }
}

impl Sealed for FormUrlEncodedRequest {}

#[async_trait]
impl Request for FormUrlEncodedRequest {
    fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }

    async fn create_content(&self, cancel: &CancellationToken) -> Result<Option<Content>> {
        if cancel.is_cancelled() {
            return Err(RestError::Cancelled);
        }

        let body = serde_urlencoded::to_string(&self.payload)?;
        let content = Content::from_bytes(body)
            .with_header(CONTENT_TYPE.as_str(), media_types::FORM_URLENCODED);
        Ok(Some(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    async fn content_of<R: Request>(request: &R) -> Content {
        request.create_content(&token()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_empty_request_has_no_content() {
        let request = EmptyRequest::new().with_header("X-Key", "1");
        assert!(request.create_content(&token()).await.unwrap().is_none());
        assert_eq!(request.headers().get_first("x-key"), Some("1"));
    }

    #[tokio::test]
    async fn test_string_request_defaults() {
        let content = content_of(&StringRequest::new("héllo")).await;
        assert_eq!(
            content.headers().get_first("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        let text = content.text(&token()).await.unwrap();
        assert_eq!(text, "héllo");
    }

    #[tokio::test]
    async fn test_string_request_media_type_ignored_without_encoding() {
        let request = StringRequest::new("x").with_media_type("text/html");
        let content = content_of(&request).await;
        assert_eq!(
            content.headers().get_first("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
    }

    #[tokio::test]
    async fn test_string_request_encoding_only() {
        let request = StringRequest::new("hi").with_encoding(TextEncoding::utf16_le());
        let content = content_of(&request).await;
        assert_eq!(
            content.headers().get_first("Content-Type"),
            Some("text/plain; charset=utf-16le")
        );
        assert_eq!(&content.as_bytes().unwrap()[..], &[b'h', 0, b'i', 0]);
    }

    #[tokio::test]
    async fn test_string_request_encoding_and_media_type() {
        let request = StringRequest::new("<a/>")
            .with_encoding(TextEncoding::windows_1252())
            .with_media_type("text/xml");
        let content = content_of(&request).await;
        assert_eq!(
            content.headers().get_first("Content-Type"),
            Some("text/xml; charset=windows-1252")
        );
    }

    #[tokio::test]
    async fn test_string_request_invalid_media_type() {
        let request = StringRequest::new("x")
            .with_encoding(TextEncoding::utf8())
            .with_media_type("nonsense");
        let err = request.create_content(&token()).await.unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_string_request_overrides_are_mutable() {
        let mut request = StringRequest::new("x").with_encoding(TextEncoding::windows_1252());
        request.set_encoding(None);
        assert_eq!(request.payload(), "x");
        assert!(request.encoding().is_none());
        request.set_media_type(Some("text/csv".into()));
        assert_eq!(request.media_type(), Some("text/csv"));
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Payload {
        code: String,
        value: u32,
    }

    #[tokio::test]
    async fn test_json_request() {
        let request = JsonRequest::new(Payload { code: "OK".into(), value: 3 });
        let content = content_of(&request).await;
        assert_eq!(content.media_type().as_deref(), Some("application/json"));
        assert_eq!(&content.as_bytes().unwrap()[..], br#"{"code":"OK","value":3}"#);
    }

    #[tokio::test]
    async fn test_json_request_options() {
        let request = JsonRequest::new(Payload { code: "OK".into(), value: 3 })
            .with_options(JsonOptions::new().pretty(true).media_type("application/vnd.test+json"));
        let content = content_of(&request).await;
        assert_eq!(
            content.headers().get_first("content-type"),
            Some("application/vnd.test+json; charset=utf-8")
        );
        let body = content.as_bytes().unwrap();
        assert!(body.contains(&b'\n'));
        let back: Payload = serde_json::from_slice(body).unwrap();
        assert_eq!(back.value, 3);
    }

    #[tokio::test]
    async fn test_form_request_preserves_order_and_escapes() {
        let request = FormUrlEncodedRequest::new(vec![
            ("z", "last?"),
            ("a", "x&y=z"),
            ("z", "again"),
        ]);
        let content = content_of(&request).await;
        assert_eq!(
            content.headers().get_first("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            &content.as_bytes().unwrap()[..],
            b"z=last%3F&a=x%26y%3Dz&z=again"
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_build() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = StringRequest::new("x").create_content(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
