//! Messages: one request paired with one response.
//!
//! A [`Message`] names the method and endpoint of an HTTP exchange and owns the
//! [`Request`] that encodes the outgoing body and the [`Response`] that decodes
//! the incoming one. [`RestClient::send`](crate::RestClient::send) drives it
//! through its lifecycle:
//!
//! ```text
//! Created ──create_request──▶ RequestBuilt ──transport──▶ Sent ──read_response──▶ Completed
//!    └──────────────── any error or cancellation ───────────────▶ Failed
//! ```
//!
//! A message is borrowed mutably for the whole dispatch, so one instance can't
//! serve two concurrent sends. After a failure, discard it: its response may be
//! partially populated.
//!
//! # Module Organization
//!
//! ```text
//! message/
//! ├── request  - EmptyRequest, StringRequest, JsonRequest<T>, FormUrlEncodedRequest
//! └── response - EmptyResponse, StringResponse, JsonResponse<T>, HeadResponse,
//!                StreamResponse<W>, FlexibleResponse<S, F>
//! ```
//!
//! # Examples
//!
//! ## Ad-hoc messages with `Exchange`
//!
//! ```
//! use typed_rest_http::message::{Exchange, JsonRequest, JsonResponse, Message};
//! use http::Method;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct NewUser { name: String }
//!
//! #[derive(Deserialize)]
//! struct User { id: u64, name: String }
//!
//! let message = Exchange::new(
//!     Method::POST,
//!     "users",
//!     JsonRequest::new(NewUser { name: "ada".into() }),
//!     JsonResponse::<User>::new(),
//! );
//! assert_eq!(message.method(), Method::POST);
//! assert_eq!(message.endpoint(), "users");
//! ```
//!
//! ## Dedicated message types
//!
//! ```
//! use std::borrow::Cow;
//! use typed_rest_http::message::{EmptyRequest, Message, StringResponse};
//!
//! struct GetGreeting {
//!     name: String,
//!     request: EmptyRequest,
//!     response: StringResponse,
//! }
//!
//! impl Message for GetGreeting {
//!     type Request = EmptyRequest;
//!     type Response = StringResponse;
//!
//!     fn endpoint(&self) -> Cow<'_, str> {
//!         format!("greetings/{}", self.name).into()
//!     }
//!
//!     fn request(&self) -> &EmptyRequest {
//!         &self.request
//!     }
//!
//!     fn response(&self) -> &StringResponse {
//!         &self.response
//!     }
//!
//!     fn response_mut(&mut self) -> &mut StringResponse {
//!         &mut self.response
//!     }
//! }
//! ```

mod request;
mod response;

pub use request::{EmptyRequest, FormUrlEncodedRequest, JsonOptions, JsonRequest, Request, StringRequest};
pub use response::{
    EmptyResponse, FlexibleResponse, HeadResponse, JsonResponse, Response, StreamResponse,
    StringResponse,
};

use crate::client::utils::resolve_url;
use crate::error::Result;
use crate::protocol::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use http::Method;
use std::borrow::Cow;
use tokio_util::sync::CancellationToken;
use url::Url;

mod sealed {
    pub trait Sealed {}
}

/// A typed HTTP exchange.
///
/// Implementors supply the endpoint and access to their request and response.
/// `method` defaults to `GET`; `create_request` and `read_response` have
/// default implementations that can be overridden per message type.
#[async_trait]
pub trait Message: Send + Sync {
    /// The request variant.
    type Request: Request;
    /// The response variant.
    type Response: Response;

    /// The request method.
    fn method(&self) -> Method {
        Method::GET
    }

    /// Target address, absolute or relative to the client's base address.
    fn endpoint(&self) -> Cow<'_, str>;

    /// The request half.
    fn request(&self) -> &Self::Request;

    /// The response half.
    fn response(&self) -> &Self::Response;

    /// Mutable access to the response half.
    fn response_mut(&mut self) -> &mut Self::Response;

    /// Build the wire request.
    ///
    /// Resolves [`endpoint`](Self::endpoint) against `base_url`, then attaches
    /// the request headers and the content produced by the request.
    async fn create_request(&self, base_url: Option<&Url>, cancel: &CancellationToken) -> Result<HttpRequest> {
        let url = resolve_url(base_url, &self.endpoint())?;
        let request = self.request();
        let content = request.create_content(cancel).await?;
        Ok(HttpRequest {
            method: self.method(),
            url,
            headers: request.headers().clone(),
            content,
        })
    }

    /// Populate the response from the wire response.
    ///
    /// Sets status and headers first, then hands over the content.
    async fn read_response(&mut self, response: HttpResponse, cancel: &CancellationToken) -> Result<()> {
        let HttpResponse {
            status,
            headers,
            content,
        } = response;
        let target = self.response_mut();
        target.set_head(status, headers);
        target.read_content(content, cancel).await
    }
}

/// A general-purpose message: method, endpoint, request and response.
#[derive(Debug, Clone)]
pub struct Exchange<Req, Resp> {
    method: Method,
    endpoint: String,
    request: Req,
    response: Resp,
}

impl<Req, Resp> Exchange<Req, Resp>
where
    Req: Request,
    Resp: Response,
{
    /// Create a message.
    pub fn new(method: Method, endpoint: impl Into<String>, request: Req, response: Resp) -> Self {
        Exchange {
            method,
            endpoint: endpoint.into(),
            request,
            response,
        }
    }

    /// A `GET` message.
    pub fn get(endpoint: impl Into<String>, request: Req, response: Resp) -> Self {
        Self::new(Method::GET, endpoint, request, response)
    }

    /// A `POST` message.
    pub fn post(endpoint: impl Into<String>, request: Req, response: Resp) -> Self {
        Self::new(Method::POST, endpoint, request, response)
    }

    /// A `HEAD` message.
    pub fn head(endpoint: impl Into<String>, request: Req, response: Resp) -> Self {
        Self::new(Method::HEAD, endpoint, request, response)
    }

    /// Mutable access to the request, e.g. to add headers before sending.
    pub fn request_mut(&mut self) -> &mut Req {
        &mut self.request
    }

    /// Take the response after dispatch.
    pub fn into_response(self) -> Resp {
        self.response
    }
}

#[async_trait]
impl<Req, Resp> Message for Exchange<Req, Resp>
where
    Req: Request,
    Resp: Response,
{
    type Request = Req;
    type Response = Resp;

    fn method(&self) -> Method {
        self.method.clone()
    }

    fn endpoint(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.endpoint)
    }

    fn request(&self) -> &Req {
        &self.request
    }

    fn response(&self) -> &Resp {
        &self.response
    }

    fn response_mut(&mut self) -> &mut Resp {
        &mut self.response
    }
}
