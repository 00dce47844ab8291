//! Utility functions for the REST client.
//!
//! This module provides helpers for:
//! - Resolving message endpoints against the client's base address
//! - Status code classification

use crate::error::{RestError, Result};
use http::StatusCode;
use url::Url;

/// Resolve `endpoint` against an optional base address.
///
/// Follows RFC 3986 reference resolution: an absolute endpoint replaces the
/// base, a relative one is joined onto it. Without a base the endpoint must be
/// absolute.
///
/// # Examples
///
/// ```
/// use typed_rest_http::client::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://api.example.com/v1/").unwrap();
/// let url = resolve_url(Some(&base), "users?page=2").unwrap();
/// assert_eq!(url.as_str(), "https://api.example.com/v1/users?page=2");
///
/// assert!(resolve_url(None, "users").is_err());
/// ```
pub fn resolve_url(base: Option<&Url>, endpoint: &str) -> Result<Url> {
    match base {
        Some(base) => base.join(endpoint).map_err(|e| {
            RestError::InvalidArgument(format!("cannot resolve '{}' against '{}': {}", endpoint, base, e))
        }),
        None => Url::parse(endpoint).map_err(|e| {
            RestError::InvalidArgument(format!(
                "endpoint '{}' is not absolute and no base address is set: {}",
                endpoint, e
            ))
        }),
    }
}

/// Check that `url` can serve as a base address.
pub fn validate_base_url(url: &Url) -> Result<()> {
    if url.cannot_be_a_base() {
        return Err(RestError::InvalidArgument(format!(
            "'{}' cannot be used as a base address",
            url
        )));
    }
    Ok(())
}

/// Whether a status code forbids a response body.
///
/// Informational responses, `204 No Content` and `304 Not Modified` never
/// carry one (RFC 9110, section 6.4.1).
pub fn status_forbids_body(status: StatusCode) -> bool {
    status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        let base = Url::parse("http://localhost/api/").unwrap();
        let url = resolve_url(Some(&base), "items/1").unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/items/1");
    }

    #[test]
    fn test_resolve_rooted_path_replaces_base_path() {
        let base = Url::parse("http://localhost/api/").unwrap();
        let url = resolve_url(Some(&base), "/status").unwrap();
        assert_eq!(url.as_str(), "http://localhost/status");
    }

    #[test]
    fn test_resolve_absolute_wins() {
        let base = Url::parse("http://localhost/api/").unwrap();
        let url = resolve_url(Some(&base), "https://other.test/x").unwrap();
        assert_eq!(url.as_str(), "https://other.test/x");
    }

    #[test]
    fn test_resolve_without_base() {
        assert!(resolve_url(None, "http://localhost/x").is_ok());
        let err = resolve_url(None, "/x").unwrap_err();
        assert!(matches!(err, RestError::InvalidArgument(_)));
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url(&Url::parse("http://localhost").unwrap()).is_ok());
        assert!(validate_base_url(&Url::parse("mailto:someone@example.com").unwrap()).is_err());
    }

    #[test]
    fn test_status_forbids_body() {
        assert!(status_forbids_body(StatusCode::NO_CONTENT));
        assert!(status_forbids_body(StatusCode::CONTINUE));
        assert!(!status_forbids_body(StatusCode::OK));
        assert!(!status_forbids_body(StatusCode::BAD_REQUEST));
    }
}
