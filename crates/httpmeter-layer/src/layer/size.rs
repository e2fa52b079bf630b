//! Approximate request/response sizes.
//!
//! The request size is a byte-count approximation used for histogram
//! bucketing: separators, CRLFs and framing are not counted.

use std::borrow::Cow;

use http::{header, HeaderMap, Request, Response, Uri, Version};
use http_body::Body;

/// Protocol string as it appears on an HTTP/1 request line.
pub fn protocol_str(v: Version) -> &'static str {
    if v == Version::HTTP_09 {
        "HTTP/0.9"
    } else if v == Version::HTTP_10 {
        "HTTP/1.0"
    } else if v == Version::HTTP_11 {
        "HTTP/1.1"
    } else if v == Version::HTTP_2 {
        "HTTP/2.0"
    } else if v == Version::HTTP_3 {
        "HTTP/3.0"
    } else {
        ""
    }
}

/// Percent-decoded request path. May contain invalid UTF-8.
pub fn decoded_path(uri: &Uri) -> Cow<'_, [u8]> {
    urlencoding::decode_binary(uri.path().as_bytes())
}

/// Host as sent by the client: URI authority (HTTP/2, absolute-form) or the
/// `Host` header.
pub fn host_bytes<'a>(uri: &'a Uri, headers: &'a HeaderMap) -> &'a [u8] {
    if let Some(a) = uri.authority() {
        return a.as_str().as_bytes();
    }
    headers
        .get(header::HOST)
        .map(|v| v.as_bytes())
        .unwrap_or_default()
}

/// `Content-Length` header if parseable, else the body's exact size hint.
pub fn declared_content_length<B: Body>(headers: &HeaderMap, body: &B) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .or_else(|| body.size_hint().exact())
}

/// Sum of header name and value lengths. `Host` is left out because it is
/// counted as the host.
fn headers_len(headers: &HeaderMap) -> u64 {
    let mut s = 0u64;
    for name in headers.keys() {
        if *name == header::HOST {
            continue;
        }
        s += name.as_str().len() as u64;
        for v in headers.get_all(name) {
            s += v.len() as u64;
        }
    }
    s
}

/// Approximate wire size of a request.
pub fn approximate_request_size<B: Body>(req: &Request<B>) -> u64 {
    let uri = req.uri();
    let headers = req.headers();

    let mut s = decoded_path(uri).len() as u64;
    s += req.method().as_str().len() as u64;
    s += protocol_str(req.version()).len() as u64;
    s += headers_len(headers);
    s += host_bytes(uri, headers).len() as u64;
    // unknown length counts as zero
    s += declared_content_length(headers, req.body()).unwrap_or(0);
    s
}

/// Body size of a response: exact size hint, else `Content-Length`, else 0.
pub fn response_size<B: Body>(res: &Response<B>) -> u64 {
    res.body()
        .size_hint()
        .exact()
        .or_else(|| {
            res.headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
        })
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body as AxumBody;
    use futures_util::stream;

    fn streaming_body() -> AxumBody {
        let chunks: Vec<Result<&'static str, std::io::Error>> = vec![Ok("ab"), Ok("cd")];
        AxumBody::from_stream(stream::iter(chunks))
    }

    #[test]
    fn minimal_get_request() {
        let req = Request::builder()
            .method("GET")
            .uri("/x")
            .header("A", "b")
            .header("Host", "h")
            .body(AxumBody::empty())
            .unwrap();
        // GET(3) + body(0) + /x(2) + a:b(2) + h(1) + HTTP/1.1(8)
        assert_eq!(approximate_request_size(&req), 16);
    }

    #[test]
    fn unknown_content_length_adds_nothing() {
        let req = Request::builder()
            .method("POST")
            .uri("/x")
            .body(streaming_body())
            .unwrap();
        assert_eq!(declared_content_length(req.headers(), req.body()), None);
        // POST(4) + /x(2) + HTTP/1.1(8)
        assert_eq!(approximate_request_size(&req), 14);
    }

    #[test]
    fn content_length_header_wins_over_body_hint() {
        let req = Request::builder()
            .method("PUT")
            .uri("/x")
            .header("content-length", "100")
            .body(streaming_body())
            .unwrap();
        // PUT(3) + /x(2) + HTTP/1.1(8) + content-length(14) + "100"(3) + 100
        assert_eq!(approximate_request_size(&req), 130);
    }

    #[test]
    fn multi_value_headers_count_name_once() {
        let req = Request::builder()
            .uri("/")
            .header("x-a", "1")
            .header("x-a", "22")
            .body(AxumBody::empty())
            .unwrap();
        // GET(3) + /(1) + HTTP/1.1(8) + x-a(3) + 1 + 2
        assert_eq!(approximate_request_size(&req), 18);
    }

    #[test]
    fn path_is_measured_decoded() {
        let req = Request::builder()
            .uri("/a%20b")
            .body(AxumBody::empty())
            .unwrap();
        assert_eq!(decoded_path(req.uri()).as_ref(), b"/a b");
    }

    #[test]
    fn authority_counts_as_host() {
        let req = Request::builder()
            .version(Version::HTTP_2)
            .uri("https://example.com:8443/")
            .body(AxumBody::empty())
            .unwrap();
        // GET(3) + /(1) + HTTP/2.0(8) + example.com:8443(16)
        assert_eq!(approximate_request_size(&req), 28);
    }

    #[test]
    fn response_size_prefers_exact_hint() {
        let res = Response::new(AxumBody::from("hello"));
        assert_eq!(response_size(&res), 5);

        let res = Response::builder()
            .header("content-length", "42")
            .body(streaming_body())
            .unwrap();
        assert_eq!(response_size(&res), 42);

        let res = Response::new(streaming_body());
        assert_eq!(response_size(&res), 0);
    }
}
