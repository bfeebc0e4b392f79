//! Per-request classification context.
//!
//! A `RequestContext` is built fresh for every request by the classifier,
//! handed to the dispatcher by reference, and dropped once the response is
//! written. It never outlives the request and is never shared between
//! requests.

use std::fmt;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use percent_encoding::percent_decode_str;

/// Path separator appended during normalization.
pub const SEPARATOR: char = '/';

/// Form parameter names that mark a coordinate-bearing request.
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";

/// How a request is classified for the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Classified by HTTP verb.
    Ordinary,
    /// Carries both `latitude` and `longitude` form values ("HIT").
    Coordinate,
}

impl RequestKind {
    /// Derive the kind from parsed form values.
    ///
    /// Both coordinates must be present and non-empty. The HTTP verb plays no
    /// part: a POST carrying coordinates is still `Coordinate`.
    pub fn from_params(params: &FormValues) -> Self {
        let present = |key: &str| params.get(key).is_some_and(|v| !v.is_empty());
        if present(LATITUDE) && present(LONGITUDE) {
            RequestKind::Coordinate
        } else {
            RequestKind::Ordinary
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Ordinary => write!(f, "ORDINARY"),
            RequestKind::Coordinate => write!(f, "COORDINATE"),
        }
    }
}

/// Ordered form values (body values first, then query string).
///
/// Lookups return the first value for a key, so body values shadow query
/// values of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pairs: Vec<(String, String)>,
}

impl FormValues {
    /// Parse an `application/x-www-form-urlencoded` string.
    pub fn parse(input: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(input).into_owned().collect(),
        }
    }

    /// Append all pairs from `other` after the existing ones.
    pub fn extend(&mut self, other: FormValues) {
        self.pairs.extend(other.pairs);
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Percent-decode a URL path once.
///
/// Invalid UTF-8 sequences are replaced, never rejected.
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Ensure `path` ends with the separator.
///
/// Idempotent: `normalize_path(&normalize_path(p)) == normalize_path(p)`.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.to_string();
    if !normalized.ends_with(SEPARATOR) {
        normalized.push(SEPARATOR);
    }
    normalized
}

/// Fully classified request, ready for dispatch.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// HTTP verb as received.
    pub http_method: Method,
    /// URL path as received, percent-decoded.
    pub raw_path: String,
    /// URL path including mount prefix and version, with trailing separator.
    pub versioned_path: String,
    /// API version, always >= 1.
    pub api_version: u32,
    /// Method path after the version segment, non-empty, with trailing separator.
    pub sub_path: String,
    /// Resolved caller, `None` for anonymous.
    pub caller_id: Option<i64>,
    /// Verb-based or coordinate-based classification.
    pub request_kind: RequestKind,
    /// Parsed form values (query string and urlencoded body).
    pub params: FormValues,
    /// Request headers as received.
    pub headers: HeaderMap,
    /// Buffered request body, whatever its content type.
    pub body: Bytes,
}

impl RequestContext {
    /// Method name the dispatcher should act on: `HIT` for coordinate
    /// requests, the HTTP verb otherwise.
    pub fn effective_method(&self) -> &str {
        match self.request_kind {
            RequestKind::Coordinate => "HIT",
            RequestKind::Ordinary => self.http_method.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_appends_separator() {
        assert_eq!(normalize_path("/api/v1/users"), "/api/v1/users/");
        assert_eq!(normalize_path("/api/v1/users/"), "/api/v1/users/");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_normalize_idempotent() {
        for path in ["", "/", "/api", "/api/v1/users", "/api/v1/users/", "a//"] {
            let once = normalize_path(path);
            assert_eq!(normalize_path(&once), once, "path {:?}", path);
        }
    }

    #[test]
    fn test_form_values_first_wins() {
        let mut params = FormValues::parse(b"latitude=1&latitude=2");
        params.extend(FormValues::parse(b"latitude=3&longitude=4"));

        assert_eq!(params.get(LATITUDE), Some("1"));
        assert_eq!(params.get(LONGITUDE), Some("4"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/api/v%31/users"), "/api/v1/users");
        assert_eq!(decode_path("/api/v1/caf%C3%A9"), "/api/v1/caf\u{e9}");
        assert_eq!(decode_path("/api/v1/a%2Fb"), "/api/v1/a/b");
        assert_eq!(decode_path("/api/v1/plain"), "/api/v1/plain");
        assert_eq!(decode_path("/api/v1/%FF"), "/api/v1/\u{fffd}");
    }

    #[test]
    fn test_form_values_decoding() {
        let params = FormValues::parse(b"name=a+b%21&empty=");
        assert_eq!(params.get("name"), Some("a b!"));
        assert_eq!(params.get("empty"), Some(""));
    }

    #[test]
    fn test_kind_requires_both_coordinates() {
        let kind = |qs: &str| RequestKind::from_params(&FormValues::parse(qs.as_bytes()));

        assert_eq!(kind("latitude=10&longitude=20"), RequestKind::Coordinate);
        assert_eq!(kind("latitude=10"), RequestKind::Ordinary);
        assert_eq!(kind("longitude=20"), RequestKind::Ordinary);
        assert_eq!(kind("latitude=&longitude=20"), RequestKind::Ordinary);
        assert_eq!(kind(""), RequestKind::Ordinary);
    }

    #[test]
    fn test_effective_method() {
        let mut ctx = RequestContext {
            http_method: Method::POST,
            raw_path: "/api/v2/search".into(),
            versioned_path: "/api/v2/search/".into(),
            api_version: 2,
            sub_path: "search/".into(),
            caller_id: None,
            request_kind: RequestKind::Ordinary,
            params: FormValues::default(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert_eq!(ctx.effective_method(), "POST");

        ctx.request_kind = RequestKind::Coordinate;
        assert_eq!(ctx.effective_method(), "HIT");
    }
}
