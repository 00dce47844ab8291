//! Response variants.
//!
//! After a dispatch the message first hands the status code and response
//! headers to [`Response::set_head`], then passes the body (if any) to
//! [`Response::read_content`], exactly once.
//!
//! | Variant | Reads |
//! |---------|-------|
//! | [`EmptyResponse`] | nothing |
//! | [`StringResponse`] | the body as text |
//! | [`JsonResponse`] | the body as `T`, only when it is labelled `application/json` |
//! | [`HeadResponse`] | the content headers, not the body |
//! | [`StreamResponse`] | the body copied into a destination stream, rewound to 0 |
//! | [`FlexibleResponse`] | one of two variants, picked by status code |
//!
//! # JSON media type guard
//!
//! [`JsonResponse`] only deserializes when the content's media type is exactly
//! `application/json` (parameters and ASCII case ignored). Any other label,
//! including `text/plain` on a `200 OK`, leaves [`JsonResponse::content`] at
//! `None` without an error. Callers that need to tell "no JSON" apart from
//! "empty JSON" should check the content before relying on it.
//!
//! The body is decoded with the `charset` parameter (UTF-8 when absent); a
//! byte order mark overrides it and is stripped. Bytes that are malformed in
//! that encoding fail with [`RestError::Serialization`], as does text that is
//! not valid JSON.

use super::sealed::Sealed;
use crate::cancel::with_cancellation;
use crate::error::{RestError, Result};
use crate::protocol::{is_json_media_type, Content, HeaderCollection};
use async_trait::async_trait;
use futures::StreamExt;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use serde::de::DeserializeOwned;
use std::io::{Cursor, SeekFrom};
use tokio::io::{AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// The response half of a message.
///
/// Implemented by the variants in this module only.
#[async_trait]
pub trait Response: Send + Sync + Sealed {
    /// Status code of the dispatch, once received.
    fn status(&self) -> Option<StatusCode>;

    /// Response headers, once received. Content headers are not included.
    fn headers(&self) -> Option<&HeaderCollection>;

    /// Record the status code and response headers.
    fn set_head(&mut self, status: StatusCode, headers: HeaderCollection);

    /// Consume the body, if the response has one.
    async fn read_content(&mut self, content: Option<Content>, cancel: &CancellationToken) -> Result<()>;
}

/// Status and headers shared by every variant.
#[derive(Debug, Clone, Default)]
struct Head {
    status: Option<StatusCode>,
    headers: Option<HeaderCollection>,
}

impl Head {
    fn set(&mut self, status: StatusCode, headers: HeaderCollection) {
        self.status = Some(status);
        self.headers = Some(headers);
    }
}

/// A response whose body is ignored.
#[derive(Debug, Clone, Default)]
pub struct EmptyResponse {
    head: Head,
}

impl EmptyResponse {
    /// Create an empty response.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sealed for EmptyResponse {}

#[async_trait]
impl Response for EmptyResponse {
    fn status(&self) -> Option<StatusCode> {
        self.head.status
    }

    fn headers(&self) -> Option<&HeaderCollection> {
        self.head.headers.as_ref()
    }

    fn set_head(&mut self, status: StatusCode, headers: HeaderCollection) {
        self.head.set(status, headers);
    }

    async fn read_content(&mut self, _content: Option<Content>, _cancel: &CancellationToken) -> Result<()> {
        Ok(())
    }
}

/// A response read as text.
#[derive(Debug, Clone, Default)]
pub struct StringResponse {
    head: Head,
    content: Option<String>,
}

impl StringResponse {
    /// Create a response with no content yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The decoded text, if a body was received.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Take the decoded text.
    pub fn into_content(self) -> Option<String> {
        self.content
    }
}

impl Sealed for StringResponse {}

#[async_trait]
impl Response for StringResponse {
    fn status(&self) -> Option<StatusCode> {
        self.head.status
    }

    fn headers(&self) -> Option<&HeaderCollection> {
        self.head.headers.as_ref()
    }

    fn set_head(&mut self, status: StatusCode, headers: HeaderCollection) {
        self.head.set(status, headers);
    }

    async fn read_content(&mut self, content: Option<Content>, cancel: &CancellationToken) -> Result<()> {
        if let Some(content) = content {
            self.content = Some(content.text(cancel).await?);
        }
        Ok(())
    }
}

/// A response deserialized from JSON.
///
/// See the [module documentation](self) for the media type guard.
#[derive(Debug, Clone)]
pub struct JsonResponse<T> {
    head: Head,
    content: Option<T>,
}

impl<T> JsonResponse<T> {
    /// Create a response with no content yet.
    pub fn new() -> Self {
        JsonResponse {
            head: Head::default(),
            content: None,
        }
    }

    /// The deserialized value, if a JSON body was received.
    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    /// Take the deserialized value.
    pub fn into_content(self) -> Option<T> {
        self.content
    }
}

impl<T> Default for JsonResponse<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sealed for JsonResponse<T> {}

#[async_trait]
impl<T> Response for JsonResponse<T>
where
    T: DeserializeOwned + Send + Sync,
{
    fn status(&self) -> Option<StatusCode> {
        self.head.status
    }

    fn headers(&self) -> Option<&HeaderCollection> {
        self.head.headers.as_ref()
    }

    fn set_head(&mut self, status: StatusCode, headers: HeaderCollection) {
        self.head.set(status, headers);
    }

    async fn read_content(&mut self, content: Option<Content>, cancel: &CancellationToken) -> Result<()> {
        let Some(content) = content else {
            return Ok(());
        };

        let content_type = content.headers().get_first(CONTENT_TYPE.as_str()).unwrap_or("");
        if !is_json_media_type(content_type) {
            tracing::debug!(content_type, "skipping JSON decode for non-JSON media type");
            return Ok(());
        }

        let encoding = content.charset().unwrap_or_default();
        let body = content.bytes(cancel).await?;
        let text = encoding.decode_strict(&body).ok_or_else(|| {
            RestError::Serialization(format!("JSON body is not valid {}", encoding.label()))
        })?;
        let value = serde_json::from_str(&text)
            .map_err(|e| RestError::Serialization(format!("invalid JSON body: {}", e)))?;
        self.content = Some(value);
        Ok(())
    }
}

/// A response that keeps headers only.
///
/// The body is dropped unread; its content headers are kept separately from
/// the response headers.
#[derive(Debug, Clone, Default)]
pub struct HeadResponse {
    head: Head,
    content_headers: Option<HeaderCollection>,
}

impl HeadResponse {
    /// Create a response with no headers yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers that described the body, if a body was present.
    pub fn content_headers(&self) -> Option<&HeaderCollection> {
        self.content_headers.as_ref()
    }

    /// Response headers followed by content headers.
    ///
    /// Nothing is deduplicated: a name present on both sides keeps every value,
    /// response values first.
    pub fn all_headers(&self) -> HeaderCollection {
        let response = self.head.headers.clone().unwrap_or_default();
        match &self.content_headers {
            Some(content) => response.merge(content),
            None => response,
        }
    }
}

impl Sealed for HeadResponse {}

#[async_trait]
impl Response for HeadResponse {
    fn status(&self) -> Option<StatusCode> {
        self.head.status
    }

    fn headers(&self) -> Option<&HeaderCollection> {
        self.head.headers.as_ref()
    }

    fn set_head(&mut self, status: StatusCode, headers: HeaderCollection) {
        self.head.set(status, headers);
    }

    async fn read_content(&mut self, content: Option<Content>, _cancel: &CancellationToken) -> Result<()> {
        if let Some(content) = content {
            let (headers, _body) = content.into_parts();
            self.content_headers = Some(headers);
        }
        Ok(())
    }
}

/// A response whose body is copied into a stream it owns.
///
/// [`StreamResponse::new`] owns an in-memory buffer; [`StreamResponse::with_stream`]
/// takes any seekable async writer, such as a `tokio::fs::File`. After a body
/// is copied the stream is rewound to position 0.
///
/// The stream stays owned until [`release`](Self::release) or
/// [`into_inner`](Self::into_inner) is called, or the response is dropped,
/// whichever comes first. Releasing twice is a no-op.
///
/// # Examples
///
/// ```
/// use typed_rest_http::message::{Response, StreamResponse};
/// use typed_rest_http::protocol::Content;
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let mut response = StreamResponse::new();
/// response
///     .read_content(Some(Content::from_bytes("payload")), &CancellationToken::new())
///     .await
///     .unwrap();
///
/// let buffer = response.stream().unwrap();
/// assert_eq!(buffer.position(), 0);
/// assert_eq!(buffer.get_ref().as_slice(), b"payload");
///
/// response.release();
/// response.release();
/// assert!(response.is_released());
/// # });
/// ```
#[derive(Debug)]
pub struct StreamResponse<W = Cursor<Vec<u8>>> {
    head: Head,
    stream: Option<W>,
}

impl StreamResponse<Cursor<Vec<u8>>> {
    /// Create a response owning a fresh in-memory buffer.
    pub fn new() -> Self {
        StreamResponse::with_stream(Cursor::new(Vec::new()))
    }
}

impl Default for StreamResponse<Cursor<Vec<u8>>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> StreamResponse<W> {
    /// Create a response that takes ownership of `stream`.
    pub fn with_stream(stream: W) -> Self {
        StreamResponse {
            head: Head::default(),
            stream: Some(stream),
        }
    }

    /// The destination stream, unless released.
    pub fn stream(&self) -> Option<&W> {
        self.stream.as_ref()
    }

    /// Mutable access to the destination stream, unless released.
    pub fn stream_mut(&mut self) -> Option<&mut W> {
        self.stream.as_mut()
    }

    /// Drop the destination stream. Idempotent.
    pub fn release(&mut self) {
        if self.stream.take().is_some() {
            tracing::trace!("released response stream");
        }
    }

    /// Whether the stream has been released.
    pub fn is_released(&self) -> bool {
        self.stream.is_none()
    }

    /// Give up ownership of the stream to the caller.
    pub fn into_inner(mut self) -> Option<W> {
        self.stream.take()
    }
}

impl<W> Sealed for StreamResponse<W> {}

#[async_trait]
impl<W> Response for StreamResponse<W>
where
    W: AsyncWrite + AsyncSeek + Unpin + Send + Sync,
{
    fn status(&self) -> Option<StatusCode> {
        self.head.status
    }

    fn headers(&self) -> Option<&HeaderCollection> {
        self.head.headers.as_ref()
    }

    fn set_head(&mut self, status: StatusCode, headers: HeaderCollection) {
        self.head.set(status, headers);
    }

    async fn read_content(&mut self, content: Option<Content>, cancel: &CancellationToken) -> Result<()> {
        let Some(content) = content else {
            return Ok(());
        };
        let stream = self.stream.as_mut().ok_or_else(|| {
            RestError::InvalidArgument("response stream has already been released".to_string())
        })?;

        let mut body = content.into_stream();
        let mut copied = 0usize;
        while let Some(chunk) = with_cancellation(cancel, async { body.next().await.transpose() }).await? {
            with_cancellation(cancel, async { stream.write_all(&chunk).await.map_err(RestError::from) }).await?;
            copied += chunk.len();
        }
        stream.flush().await?;
        stream.seek(SeekFrom::Start(0)).await?;
        tracing::trace!(copied, "copied body into response stream");
        Ok(())
    }
}

/// One of two responses, picked by status code.
///
/// A `2xx` status routes headers and body to the success variant, anything
/// else to the failure variant. The other side is left untouched.
///
/// # Examples
///
/// ```
/// use typed_rest_http::message::{FlexibleResponse, JsonResponse, Response, StringResponse};
/// use typed_rest_http::protocol::{Content, HeaderCollection};
/// use http::StatusCode;
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let mut response: FlexibleResponse<StringResponse, JsonResponse<serde_json::Value>> =
///     FlexibleResponse::new(StringResponse::new(), JsonResponse::new());
///
/// response.set_head(StatusCode::BAD_REQUEST, HeaderCollection::new());
/// let body = Content::from_bytes(r#"{"error":"invalid_grant"}"#)
///     .with_header("Content-Type", "application/json");
/// response.read_content(Some(body), &CancellationToken::new()).await.unwrap();
///
/// assert_eq!(response.is_success(), Some(false));
/// assert_eq!(response.failure().content().unwrap()["error"], "invalid_grant");
/// assert!(response.success().content().is_none());
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlexibleResponse<S, F> {
    success: S,
    failure: F,
    is_success: Option<bool>,
}

impl<S, F> FlexibleResponse<S, F> {
    /// Pair a success and a failure response.
    pub fn new(success: S, failure: F) -> Self {
        FlexibleResponse {
            success,
            failure,
            is_success: None,
        }
    }

    /// Whether the success side was selected; `None` before dispatch.
    pub fn is_success(&self) -> Option<bool> {
        self.is_success
    }

    /// The success variant.
    pub fn success(&self) -> &S {
        &self.success
    }

    /// The failure variant.
    pub fn failure(&self) -> &F {
        &self.failure
    }

    /// Split into both variants.
    pub fn into_parts(self) -> (S, F) {
        (self.success, self.failure)
    }
}

impl<S, F> Sealed for FlexibleResponse<S, F> {}

#[async_trait]
impl<S, F> Response for FlexibleResponse<S, F>
where
    S: Response,
    F: Response,
{
    fn status(&self) -> Option<StatusCode> {
        match self.is_success? {
            true => self.success.status(),
            false => self.failure.status(),
        }
    }

    fn headers(&self) -> Option<&HeaderCollection> {
        match self.is_success? {
            true => self.success.headers(),
            false => self.failure.headers(),
        }
    }

    fn set_head(&mut self, status: StatusCode, headers: HeaderCollection) {
        let is_success = status.is_success();
        self.is_success = Some(is_success);
        if is_success {
            self.success.set_head(status, headers);
        } else {
            self.failure.set_head(status, headers);
        }
    }

    async fn read_content(&mut self, content: Option<Content>, cancel: &CancellationToken) -> Result<()> {
        match self.is_success {
            Some(true) => self.success.read_content(content, cancel).await,
            Some(false) => self.failure.read_content(content, cancel).await,
            None => Err(RestError::InvalidArgument(
                "read_content called before the response status was set".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use serde::Deserialize;
    use tokio::io::AsyncReadExt;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Value {
        value: String,
    }

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    fn json(body: &'static str) -> Content {
        Content::from_bytes(body).with_header("Content-Type", "application/json; charset=utf-8")
    }

    #[tokio::test]
    async fn test_empty_response_records_head() {
        let mut response = EmptyResponse::new();
        assert!(response.headers().is_none());
        response.set_head(StatusCode::BAD_REQUEST, HeaderCollection::new().with("X", "1"));
        response.read_content(Some(Content::from_bytes("ignored")), &token()).await.unwrap();
        assert_eq!(response.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(response.headers().unwrap().get_first("x"), Some("1"));
    }

    #[tokio::test]
    async fn test_string_response() {
        let mut response = StringResponse::new();
        response.read_content(Some(Content::from_bytes("text")), &token()).await.unwrap();
        assert_eq!(response.content(), Some("text"));
    }

    #[tokio::test]
    async fn test_string_response_without_body() {
        let mut response = StringResponse::new();
        response.read_content(None, &token()).await.unwrap();
        assert!(response.content().is_none());
    }

    #[tokio::test]
    async fn test_json_response() {
        let mut response = JsonResponse::<Value>::new();
        response.read_content(Some(json(r#"{"value":"ok"}"#)), &token()).await.unwrap();
        assert_eq!(response.content(), Some(&Value { value: "ok".into() }));
    }

    #[tokio::test]
    async fn test_json_response_skips_other_media_types() {
        let mut response = JsonResponse::<Value>::new();
        let content = Content::from_bytes(r#"{"value":"ok"}"#).with_header("Content-Type", "text/plain");
        response.read_content(Some(content), &token()).await.unwrap();
        assert!(response.content().is_none());

        // no Content-Type at all
        response.read_content(Some(Content::from_bytes("{}")), &token()).await.unwrap();
        assert!(response.content().is_none());
    }

    #[tokio::test]
    async fn test_json_response_invalid_body() {
        let mut response = JsonResponse::<Value>::new();
        let err = response
            .read_content(Some(json("This is not JSON")), &token())
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::Serialization(_)));
        assert!(response.content().is_none());
    }

    #[tokio::test]
    async fn test_json_response_strips_byte_order_mark() {
        let mut response = JsonResponse::<Value>::new();
        let mut body = vec![0xEF, 0xBB, 0xBF];
        body.extend_from_slice(br#"{"value":"bom"}"#);
        let content = Content::from_bytes(body).with_header("Content-Type", "application/json");
        response.read_content(Some(content), &token()).await.unwrap();
        assert_eq!(response.content(), Some(&Value { value: "bom".into() }));
    }

    #[tokio::test]
    async fn test_json_response_utf16_charset() {
        let body: Vec<u8> = r#"{"value":"größe"}"#
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();

        let mut response = JsonResponse::<Value>::new();
        let content = Content::from_bytes(body.clone())
            .with_header("Content-Type", "application/json; charset=utf-16le");
        response.read_content(Some(content), &token()).await.unwrap();
        assert_eq!(response.content(), Some(&Value { value: "größe".into() }));

        // quoted label, UTF-16LE byte order mark in front
        let mut with_bom = vec![0xFF, 0xFE];
        with_bom.extend_from_slice(&body);
        let mut response = JsonResponse::<Value>::new();
        let content = Content::from_bytes(with_bom)
            .with_header("Content-Type", "application/json; charset=\"UTF-16LE\"");
        response.read_content(Some(content), &token()).await.unwrap();
        assert_eq!(response.content().unwrap().value, "größe");
    }

    #[tokio::test]
    async fn test_json_response_malformed_bytes() {
        let mut response = JsonResponse::<Value>::new();
        let content = Content::from_bytes(vec![b'{', b'"', 0xFF, b'"', b':', b'1', b'}'])
            .with_header("Content-Type", "application/json");
        let err = response.read_content(Some(content), &token()).await.unwrap_err();
        assert!(matches!(err, RestError::Serialization(_)));
        assert!(response.content().is_none());
    }

    #[tokio::test]
    async fn test_head_response_merges_headers() {
        let mut response = HeadResponse::new();
        response.set_head(
            StatusCode::OK,
            HeaderCollection::new().with("X-Key", "a").with("X-Key", "b"),
        );
        let content = Content::from_bytes("body")
            .with_header("Content-Type", "text/plain")
            .with_header("X-Key", "c");
        response.read_content(Some(content), &token()).await.unwrap();

        let content_headers = response.content_headers().unwrap();
        assert_eq!(content_headers.get_first("content-type"), Some("text/plain"));

        let all = response.all_headers();
        assert_eq!(all.names().collect::<Vec<_>>(), vec!["X-Key", "Content-Type"]);
        assert_eq!(
            all.get("x-key").unwrap(),
            &["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[tokio::test]
    async fn test_head_response_without_content() {
        let mut response = HeadResponse::new();
        response.set_head(StatusCode::NO_CONTENT, HeaderCollection::new().with("X-Key", "a"));
        response.read_content(None, &token()).await.unwrap();
        assert!(response.content_headers().is_none());
        assert_eq!(response.all_headers().len(), 1);
    }

    #[tokio::test]
    async fn test_stream_response_rewinds() {
        let chunks = vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))];
        let mut response = StreamResponse::new();
        response
            .read_content(Some(Content::from_stream(stream::iter(chunks))), &token())
            .await
            .unwrap();

        let buffer = response.stream_mut().unwrap();
        assert_eq!(buffer.position(), 0);
        let mut out = String::new();
        buffer.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "abcd");
    }

    #[tokio::test]
    async fn test_stream_response_explicit_stream() {
        let mut response = StreamResponse::with_stream(Cursor::new(Vec::new()));
        response.read_content(Some(Content::from_bytes("xyz")), &token()).await.unwrap();
        let buffer = response.into_inner().unwrap();
        assert_eq!(buffer.into_inner(), b"xyz".to_vec());
    }

    #[tokio::test]
    async fn test_stream_response_release() {
        let mut response = StreamResponse::new();
        response.release();
        response.release();
        assert!(response.is_released());

        // no body: nothing to write, no error
        response.read_content(None, &token()).await.unwrap();

        let err = response
            .read_content(Some(Content::from_bytes("x")), &token())
            .await
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_stream_response_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut response = StreamResponse::new();
        let err = response
            .read_content(Some(Content::from_stream(stream::pending())), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_flexible_response_success_side() {
        let mut response = FlexibleResponse::new(JsonResponse::<Value>::new(), StringResponse::new());
        assert!(response.status().is_none());
        response.set_head(StatusCode::OK, HeaderCollection::new());
        response.read_content(Some(json(r#"{"value":"v"}"#)), &token()).await.unwrap();
        assert_eq!(response.is_success(), Some(true));
        assert_eq!(response.status(), Some(StatusCode::OK));
        assert_eq!(response.success().content().unwrap().value, "v");
        assert!(response.failure().headers().is_none());
    }

    #[tokio::test]
    async fn test_flexible_response_requires_head() {
        let mut response = FlexibleResponse::new(EmptyResponse::new(), EmptyResponse::new());
        let err = response.read_content(None, &token()).await.unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }
}
