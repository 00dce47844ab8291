//! Bodies and their content headers.
//!
//! A [`Content`] is what a request produces and what a response consumes: the
//! body bytes plus the headers describing them (`Content-Type`,
//! `Content-Length`, ...). The bytes are either already in memory or arrive as
//! an async stream from the transport; both are read through the same
//! cancellable methods.
//!
//! # Examples
//!
//! ```
//! use typed_rest_http::protocol::{Content, TextEncoding};
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let content = Content::from_text("grüße", TextEncoding::windows_1252(), "text/plain");
//! assert_eq!(content.headers().get_first("Content-Type"), Some("text/plain; charset=windows-1252"));
//!
//! let text = content.text(&CancellationToken::new()).await.unwrap();
//! assert_eq!(text, "grüße");
//! # });
//! ```

use crate::cancel::with_cancellation;
use crate::error::{RestError, Result};
use crate::protocol::headers::{parse_media_type, HeaderCollection};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use futures::Stream;
use http::header::CONTENT_TYPE;
use mime::Mime;
use std::borrow::Cow;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Body bytes, buffered or streamed.
pub enum ContentBody {
    /// Fully buffered bytes.
    Full(Bytes),
    /// Chunks still to be read from the transport.
    Stream(BoxStream<'static, Result<Bytes>>),
}

impl fmt::Debug for ContentBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentBody::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            ContentBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A body together with its own headers.
#[derive(Debug)]
pub struct Content {
    headers: HeaderCollection,
    body: ContentBody,
}

impl Content {
    /// Buffered content with no headers.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Content {
            headers: HeaderCollection::new(),
            body: ContentBody::Full(data.into()),
        }
    }

    /// Streamed content with no headers.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Content {
            headers: HeaderCollection::new(),
            body: ContentBody::Stream(stream.boxed()),
        }
    }

    /// Encoded text labelled `<media_type>; charset=<encoding>`.
    pub fn from_text(text: &str, encoding: TextEncoding, media_type: &str) -> Self {
        Content::from_bytes(encoding.encode(text)).with_header(
            CONTENT_TYPE.as_str(),
            format!("{}; charset={}", media_type, encoding.label()),
        )
    }

    /// Reassemble content from parts, e.g. inside a transport.
    pub fn from_parts(headers: HeaderCollection, body: ContentBody) -> Self {
        Content { headers, body }
    }

    /// Builder form of appending a content header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The content headers.
    pub fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    /// Mutable access to the content headers.
    pub fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }

    /// The parsed `Content-Type`, if present and valid.
    pub fn content_type(&self) -> Option<Mime> {
        self.headers
            .get_first(CONTENT_TYPE.as_str())
            .and_then(parse_media_type)
    }

    /// The media type essence (`type/subtype`) of `Content-Type`.
    pub fn media_type(&self) -> Option<String> {
        self.content_type().map(|mime| mime.essence_str().to_string())
    }

    /// The buffered bytes, if the body is not streamed.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.body {
            ContentBody::Full(bytes) => Some(bytes),
            ContentBody::Stream(_) => None,
        }
    }

    /// Split into headers and body.
    pub fn into_parts(self) -> (HeaderCollection, ContentBody) {
        (self.headers, self.body)
    }

    /// The body as a stream of chunks, whatever its representation.
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes>> {
        match self.body {
            ContentBody::Full(bytes) => stream::once(async move { Ok(bytes) }).boxed(),
            ContentBody::Stream(stream) => stream,
        }
    }

    /// Read the whole body.
    pub async fn bytes(self, cancel: &CancellationToken) -> Result<Bytes> {
        match self.body {
            ContentBody::Full(bytes) => {
                if cancel.is_cancelled() {
                    return Err(RestError::Cancelled);
                }
                Ok(bytes)
            }
            ContentBody::Stream(stream) => {
                let collect = stream.try_fold(BytesMut::new(), |mut buf, chunk| async move {
                    buf.extend_from_slice(&chunk);
                    Ok::<_, RestError>(buf)
                });
                Ok(with_cancellation(cancel, collect).await?.freeze())
            }
        }
    }

    /// Read the whole body as text.
    ///
    /// The charset parameter of `Content-Type` selects the decoder; a byte
    /// order mark overrides it, and UTF-8 is used when neither is present.
    /// Malformed sequences are replaced rather than rejected.
    pub async fn text(self, cancel: &CancellationToken) -> Result<String> {
        let encoding = self.charset().unwrap_or_default();
        let bytes = self.bytes(cancel).await?;
        Ok(encoding.decode(&bytes))
    }

    /// The encoding named by the `charset` parameter of `Content-Type`.
    ///
    /// `None` when the parameter is missing or names an unknown encoding.
    pub fn charset(&self) -> Option<TextEncoding> {
        let mime = self.content_type()?;
        let label = mime.get_param(mime::CHARSET)?;
        TextEncoding::for_label(label.as_str())
    }
}

/// A character encoding for text bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextEncoding(&'static encoding_rs::Encoding);

impl TextEncoding {
    /// UTF-8.
    pub fn utf8() -> Self {
        TextEncoding(encoding_rs::UTF_8)
    }

    /// UTF-16, little endian.
    pub fn utf16_le() -> Self {
        TextEncoding(encoding_rs::UTF_16LE)
    }

    /// UTF-16, big endian.
    pub fn utf16_be() -> Self {
        TextEncoding(encoding_rs::UTF_16BE)
    }

    /// windows-1252, labelled `charset=windows-1252` on the wire.
    ///
    /// The `iso-8859-1` and `latin1` labels resolve to this encoding as well
    /// (WHATWG Encoding Standard), so bytes `0x80..=0x9F` decode as
    /// windows-1252 characters rather than C1 controls.
    pub fn windows_1252() -> Self {
        TextEncoding(encoding_rs::WINDOWS_1252)
    }

    /// Look up an encoding by charset label (`"utf-8"`, `"iso-8859-1"`, ...).
    pub fn for_label(label: &str) -> Option<Self> {
        encoding_rs::Encoding::for_label(label.trim().as_bytes()).map(TextEncoding)
    }

    /// Lowercase canonical name, as written in a `charset` parameter.
    pub fn label(&self) -> String {
        self.0.name().to_ascii_lowercase()
    }

    /// Encode `text`.
    ///
    /// Characters the encoding cannot represent become numeric character
    /// references.
    pub fn encode(&self, text: &str) -> Bytes {
        // encoding_rs only decodes UTF-16; its encoder falls back to UTF-8
        if self.0 == encoding_rs::UTF_16LE {
            return text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        }
        if self.0 == encoding_rs::UTF_16BE {
            return text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        }
        let (encoded, _, _) = self.0.encode(text);
        Bytes::from(encoded.into_owned())
    }

    /// Decode `bytes`, honouring a leading byte order mark.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (decoded, _, _) = self.0.decode(bytes);
        decoded.into_owned()
    }

    /// Decode `bytes` without replacement.
    ///
    /// A leading byte order mark is stripped and overrides `self`. Returns
    /// `None` when the bytes are malformed in the selected encoding.
    pub fn decode_strict<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        let (encoding, bom_len) = encoding_rs::Encoding::for_bom(bytes).unwrap_or((self.0, 0));
        encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::utf8()
    }
}
