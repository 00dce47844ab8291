//! Header collections and media type helpers.
//!
//! [`HeaderCollection`] is an ordered multi-map: each distinct name keeps the
//! position where it was first inserted, values for a name keep their insertion
//! order, and lookups ignore ASCII case.
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | [`append`](HeaderCollection::append) | adds a value, creating the name at the end if needed |
//! | [`get`](HeaderCollection::get) | all values for a name, case-insensitive |
//! | [`merge`](HeaderCollection::merge) | left values first, then right; nothing deduplicated |
//!
//! # Examples
//!
//! ```
//! use typed_rest_http::protocol::HeaderCollection;
//!
//! let mut response = HeaderCollection::new();
//! response.append("X-Trace", "a");
//! response.append("Date", "Mon, 19 Oct 2026 10:00:00 GMT");
//!
//! let mut content = HeaderCollection::new();
//! content.append("x-trace", "b");
//!
//! let all = response.merge(&content);
//! assert_eq!(all.get("X-TRACE").unwrap(), &["a".to_string(), "b".to_string()]);
//! assert_eq!(all.names().collect::<Vec<_>>(), vec!["X-Trace", "Date"]);
//! ```

use crate::error::Result;
use crate::protocol::constants::{media_types, CONTENT_HEADERS};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use mime::Mime;

/// Ordered multi-map from header name to one or more values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy an `http::HeaderMap`.
    ///
    /// Values that are not visible ASCII are decoded lossily.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut headers = HeaderCollection::new();
        for (name, value) in map {
            headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        headers
    }

    /// Append a value for `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Append several values for `name`, in order.
    pub fn extend_values<I, V>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.append(name, value);
        }
    }

    /// Builder form of [`append`](Self::append).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// Replace every value for `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = vec![value.into()],
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    /// All values for `name`.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|idx| self.entries[idx].1.as_slice())
    }

    /// The first value for `name`.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove `name`, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection holds no names.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct names in insertion order, with the spelling first seen.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Names with their values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Concatenate `self` and `other` into a new collection.
    ///
    /// Names from `self` come first. A name present in both keeps all values,
    /// `self`'s before `other`'s.
    #[must_use]
    pub fn merge(&self, other: &HeaderCollection) -> HeaderCollection {
        let mut merged = self.clone();
        merged.extend(other.iter().flat_map(|(name, values)| {
            values.iter().map(move |value| (name, value.as_str()))
        }));
        merged
    }

    /// Convert to an `http::HeaderMap`, appending every value.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, values) in self.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            for value in values {
                map.append(name.clone(), HeaderValue::from_str(value)?);
            }
        }
        Ok(map)
    }

    /// Split into (message headers, content headers).
    ///
    /// Names listed in [`CONTENT_HEADERS`] go to the second collection.
    pub fn split_content_headers(self) -> (HeaderCollection, HeaderCollection) {
        let (content, message): (Vec<_>, Vec<_>) = self
            .entries
            .into_iter()
            .partition(|(name, _)| is_content_header(name));
        (
            HeaderCollection { entries: message },
            HeaderCollection { entries: content },
        )
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderCollection
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderCollection::new();
        headers.extend(iter);
        headers
    }
}

impl<K, V> Extend<(K, V)> for HeaderCollection
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

impl From<&HeaderMap> for HeaderCollection {
    fn from(map: &HeaderMap) -> Self {
        HeaderCollection::from_header_map(map)
    }
}

/// Whether `name` describes a body rather than the enclosing message.
pub fn is_content_header(name: &str) -> bool {
    CONTENT_HEADERS
        .iter()
        .any(|content| content.eq_ignore_ascii_case(name))
}

/// Parse a `Content-Type` value.
///
/// Returns `None` for values that are not a valid media type.
pub fn parse_media_type(value: &str) -> Option<Mime> {
    value.trim().parse::<Mime>().ok()
}

/// Whether `value` names the JSON media type.
///
/// Only the essence is compared, ignoring ASCII case; parameters such as
/// `charset` are ignored. Suffixed types like `application/problem+json` do
/// not match.
pub fn is_json_media_type(value: &str) -> bool {
    parse_media_type(value)
        .map(|mime| mime.essence_str().eq_ignore_ascii_case(media_types::JSON))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_name_order() {
        let headers: HeaderCollection = vec![("B", "1"), ("A", "2"), ("b", "3")]
            .into_iter()
            .collect();
        assert_eq!(headers.names().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(headers.get("B").unwrap(), &["1".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let headers = HeaderCollection::new().with("Content-Type", "text/plain");
        assert!(headers.contains("content-type"));
        assert_eq!(headers.get_first("CONTENT-TYPE"), Some("text/plain"));
        assert!(headers.get("accept").is_none());
    }

    #[test]
    fn test_set_replaces_values() {
        let mut headers = HeaderCollection::new().with("X", "1").with("X", "2");
        headers.set("x", "3");
        assert_eq!(headers.get("X").unwrap(), &["3".to_string()]);
    }

    #[test]
    fn test_remove() {
        let mut headers = HeaderCollection::new().with("X", "1").with("Y", "2");
        assert_eq!(headers.remove("x"), Some(vec!["1".to_string()]));
        assert_eq!(headers.len(), 1);
        assert!(headers.remove("x").is_none());
    }

    #[test]
    fn test_merge_keeps_duplicates_left_first() {
        let left = HeaderCollection::new().with("X-Key", "a").with("X-Key", "b");
        let right = HeaderCollection::new().with("x-key", "c").with("Content-Type", "text/plain");

        let merged = left.merge(&right);
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["X-Key", "Content-Type"]);
        assert_eq!(
            merged.get("X-Key").unwrap(),
            &["a".to_string(), "b".to_string(), "c".to_string()]
        );
        // inputs untouched
        assert_eq!(left.get("X-Key").unwrap().len(), 2);
    }

    #[test]
    fn test_header_map_round_trip() {
        let mut map = HeaderMap::new();
        map.append("x-key", HeaderValue::from_static("1"));
        map.append("x-key", HeaderValue::from_static("2"));
        let headers = HeaderCollection::from(&map);
        assert_eq!(headers.get("X-Key").unwrap().len(), 2);

        let back = headers.to_header_map().unwrap();
        assert_eq!(back.get_all("x-key").iter().count(), 2);
    }

    #[test]
    fn test_to_header_map_rejects_invalid_name() {
        let headers = HeaderCollection::new().with("bad name", "v");
        assert!(matches!(
            headers.to_header_map(),
            Err(crate::RestError::HeaderParse(_))
        ));
    }

    #[test]
    fn test_split_content_headers() {
        let headers = HeaderCollection::new()
            .with("Content-Type", "application/json")
            .with("X-Key", "1")
            .with("Content-Length", "2");
        let (message, content) = headers.split_content_headers();
        assert_eq!(message.names().collect::<Vec<_>>(), vec!["X-Key"]);
        assert_eq!(
            content.names().collect::<Vec<_>>(),
            vec!["Content-Type", "Content-Length"]
        );
    }

    #[test]
    fn test_is_json_media_type() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("Application/JSON; charset=utf-8"));
        assert!(!is_json_media_type("text/plain"));
        assert!(!is_json_media_type("application/problem+json"));
        assert!(!is_json_media_type("not a media type"));
    }
}
