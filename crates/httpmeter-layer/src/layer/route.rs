//! Route and scheme attributes.

use http::{HeaderMap, Uri};

use super::size::decoded_path;

/// Route label for a request.
///
/// Uses the matched route template when the router provided one. Otherwise,
/// unless `disable_path_fallback` is set, falls back to the decoded request
/// path so unmatched (404) requests stay distinguishable. Invalid UTF-8 is
/// replaced with U+FFFD.
pub fn resolve_route(matched: Option<&str>, uri: &Uri, disable_path_fallback: bool) -> String {
    match matched {
        Some(route) if !route.is_empty() => route.to_owned(),
        _ if disable_path_fallback => String::new(),
        _ => sanitize(&decoded_path(uri)),
    }
}

/// Lossy UTF-8 conversion.
pub fn sanitize(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Request scheme, honouring the usual reverse-proxy headers.
pub fn request_scheme(uri: &Uri, headers: &HeaderMap) -> String {
    if let Some(s) = uri.scheme_str() {
        return s.to_owned();
    }
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };
    if let Some(proto) = header("x-forwarded-proto") {
        return proto.to_owned();
    }
    if let Some(proto) = header("x-forwarded-protocol") {
        return proto.to_owned();
    }
    if header("x-forwarded-ssl") == Some("on") {
        return "https".to_owned();
    }
    if let Some(scheme) = header("x-url-scheme") {
        return scheme.to_owned();
    }
    "http".to_owned()
}
