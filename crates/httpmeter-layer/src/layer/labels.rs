//! Request views handed to user callbacks (skip predicate, label functions).

use std::error::Error as StdError;
use std::sync::Arc;

use http::{Extensions, HeaderMap, Method, Request, Uri, Version};

/// Borrowed view of an incoming request, used by the skip predicate.
#[derive(Debug, Clone, Copy)]
pub struct RequestInfo<'a> {
    pub method: &'a Method,
    pub uri: &'a Uri,
    pub version: Version,
    pub headers: &'a HeaderMap,
    pub extensions: &'a Extensions,
}

impl<'a> RequestInfo<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            method: req.method(),
            uri: req.uri(),
            version: req.version(),
            headers: req.headers(),
            extensions: req.extensions(),
        }
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }
}

/// Returns true when a request must bypass instrumentation.
pub type Skipper = Arc<dyn Fn(&RequestInfo<'_>) -> bool + Send + Sync>;

/// Produces one label value per request.
pub type LabelFn =
    Arc<dyn Fn(&LabelContext<'_>, Option<&(dyn StdError + 'static)>) -> String + Send + Sync>;

/// Request line and headers captured before the handler consumes the request.
#[derive(Debug, Clone)]
pub(crate) struct RequestHead {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) version: Version,
    /// Empty unless label functions are configured.
    pub(crate) headers: HeaderMap,
}

impl RequestHead {
    pub(crate) fn capture<B>(req: &Request<B>, with_headers: bool) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            version: req.version(),
            headers: if with_headers {
                req.headers().clone()
            } else {
                HeaderMap::new()
            },
        }
    }
}

/// Everything a label function may look at once the handler has finished.
#[derive(Debug, Clone, Copy)]
pub struct LabelContext<'a> {
    pub(crate) request: &'a RequestHead,
    pub(crate) route: &'a str,
    pub(crate) status: u16,
    pub(crate) response_headers: Option<&'a HeaderMap>,
}

impl<'a> LabelContext<'a> {
    pub fn method(&self) -> &'a Method {
        &self.request.method
    }

    pub fn uri(&self) -> &'a Uri {
        &self.request.uri
    }

    pub fn path(&self) -> &'a str {
        self.request.uri.path()
    }

    pub fn version(&self) -> Version {
        self.request.version
    }

    pub fn request_headers(&self) -> &'a HeaderMap {
        &self.request.headers
    }

    /// Route label as recorded (template, fallback path, or empty).
    pub fn route(&self) -> &'a str {
        self.route
    }

    /// Status as recorded.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// `None` when the handler returned an error or the request was cancelled.
    pub fn response_headers(&self) -> Option<&'a HeaderMap> {
        self.response_headers
    }
}
