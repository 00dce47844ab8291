//! Wire-level building blocks shared by requests, responses and transports.
//!
//! - **[`headers`]** - [`HeaderCollection`], the ordered multi-map used for every
//!   header set, plus media type helpers
//! - **[`content`]** - [`Content`], a body together with its own content headers,
//!   and [`TextEncoding`]
//! - **[`wire`]** - [`HttpRequest`] and [`HttpResponse`], the values exchanged
//!   with a transport
//! - **[`constants`]** - media types and the names of content headers
//!
//! # Examples
//!
//! ```
//! use typed_rest_http::protocol::{Content, HeaderCollection};
//!
//! let mut headers = HeaderCollection::new();
//! headers.append("Accept", "application/json");
//! assert_eq!(headers.get_first("accept"), Some("application/json"));
//!
//! let content = Content::from_bytes("hello").with_header("Content-Type", "text/plain");
//! assert_eq!(content.media_type().as_deref(), Some("text/plain"));
//! ```

pub mod content;
pub mod headers;
pub mod wire;

pub use content::{Content, ContentBody, TextEncoding};
pub use headers::{is_content_header, is_json_media_type, parse_media_type, HeaderCollection};
pub use wire::{HttpRequest, HttpResponse};

/// Protocol constants.
pub mod constants {
    /// Media types produced and recognised by the built-in variants.
    pub mod media_types {
        /// Structured-text media type gating JSON deserialization.
        pub const JSON: &str = "application/json";
        /// Default media type for string content.
        pub const TEXT_PLAIN: &str = "text/plain";
        /// Form body media type.
        pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    }

    /// Headers that describe a body rather than the message carrying it.
    ///
    /// Transports split incoming headers on this list: matching names travel
    /// with the [`Content`](super::Content), the rest become response headers.
    pub const CONTENT_HEADERS: &[&str] = &[
        "allow",
        "content-disposition",
        "content-encoding",
        "content-language",
        "content-length",
        "content-location",
        "content-md5",
        "content-range",
        "content-type",
        "expires",
        "last-modified",
    ];
}
