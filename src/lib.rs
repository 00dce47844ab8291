#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Typed REST messages over HTTP
//!
//! This crate turns an HTTP exchange into a typed *message*: a request variant
//! that knows how to encode the outgoing body, paired with a response variant
//! that knows how to decode the incoming one. A [`RestClient`] dispatches the
//! message over a pluggable [`Transport`] and returns the status code, leaving
//! the decoded response in the message.
//!
//! ## Overview
//!
//! | Request variant | Body |
//! |-----------------|------|
//! | [`EmptyRequest`] | none |
//! | [`StringRequest`] | text, configurable encoding and media type |
//! | [`JsonRequest`] | `T: Serialize` as JSON |
//! | [`FormUrlEncodedRequest`] | ordered key/value pairs |
//!
//! | Response variant | Reads |
//! |------------------|-------|
//! | [`EmptyResponse`] | nothing |
//! | [`StringResponse`] | text |
//! | [`JsonResponse`] | `T: DeserializeOwned`, only for `application/json` bodies |
//! | [`HeadResponse`] | response and content headers |
//! | [`StreamResponse`] | raw bytes into an owned stream |
//! | [`FlexibleResponse`] | one of two variants, picked by status code |
//!
//! ## Key Features
//!
//! - **One operation**: [`RestClient::send`] builds, dispatches and decodes
//! - **Status codes are data**: a `400` is returned as `Ok(StatusCode::BAD_REQUEST)`
//!   with the response populated, not as an error
//! - **Cancellation**: every suspending step honours a `CancellationToken`
//! - **Ordered headers**: [`HeaderCollection`] keeps insertion order and
//!   compares names case-insensitively
//!
//! ## Usage
//!
//! ```ignore
//! use typed_rest_http::{Exchange, JsonRequest, JsonResponse, RestClient};
//! use http::Method;
//! use serde::{Deserialize, Serialize};
//! use url::Url;
//!
//! #[derive(Serialize)]
//! struct Login<'a> { user: &'a str }
//!
//! #[derive(Deserialize)]
//! struct Session { token: String }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RestClient::from_reqwest(
//!         reqwest::Client::new(),
//!         Some(Url::parse("https://api.example.com/")?),
//!     )?;
//!
//!     let mut message = Exchange::new(
//!         Method::POST,
//!         "sessions",
//!         JsonRequest::new(Login { user: "ada" }),
//!         JsonResponse::<Session>::new(),
//!     );
//!     let status = client.send(&mut message).await?;
//!     if let Some(session) = message.into_response().into_content() {
//!         println!("{}: {}", status, session.token);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[error]** - Error types and result handling
//! - **[cancel]** - Racing suspending steps against a `CancellationToken`
//! - **[client]** - [`RestClient`], the [`Transport`] seam and configuration
//! - **[message]** - The [`Message`] trait and the request/response variants
//! - **[protocol]** - Headers, content and wire-level request/response values

pub mod cancel;
pub mod client;
pub mod error;
pub mod message;
pub mod protocol;

pub use client::{ClientConfig, RestClient, Transport};
pub use error::{RestError, Result};
pub use message::{
    EmptyRequest, EmptyResponse, Exchange, FlexibleResponse, FormUrlEncodedRequest, HeadResponse,
    JsonOptions, JsonRequest, JsonResponse, Message, Request, Response, StreamResponse,
    StringRequest, StringResponse,
};
pub use protocol::{Content, HeaderCollection, HttpRequest, HttpResponse, TextEncoding};
