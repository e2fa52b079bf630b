//! The metered service.
//!
//! `MetricsService::call` takes what it needs from the request (size, matched
//! route, scheme, request head) before handing the request to the inner
//! service, then records once the inner future settles. The request data
//! lives in an [`InFlight`] guard inside the response future: if that future
//! is dropped before the inner service answers, the guard records the request
//! as [`Cancelled`] on drop.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::MatchedPath;
use futures_util::future::BoxFuture;
use http::{HeaderMap, Request, Response};
use http_body::Body;
use tower::Service;

use httpmeter_core::{Cancelled, HandlerError, ResponseError};

use super::attributes::request_attributes;
use super::labels::{LabelContext, RequestHead, RequestInfo};
use super::route::{request_scheme, resolve_route};
use super::size::{approximate_request_size, response_size};
use super::status::resolve_status;
use super::Shared;

/// Service wrapping `S` with request metrics. Built by `MetricsLayer`.
#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
    shared: Arc<Shared>,
}

impl<S> MetricsService<S> {
    pub(crate) fn new(inner: S, shared: Arc<Shared>) -> Self {
        Self { inner, shared }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, ReqB, ResB> Service<Request<ReqB>> for MetricsService<S>
where
    S: Service<Request<ReqB>, Response = Response<ResB>>,
    S::Future: Send + 'static,
    S::Error: HandlerError + Send + 'static,
    ReqB: Body,
    ResB: Body + Send + 'static,
{
    type Response = Response<ResB>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqB>) -> Self::Future {
        let cfg = &self.shared.config;
        if let Some(skip) = &cfg.skipper {
            if skip(&RequestInfo::from_request(&req)) {
                return Box::pin(self.inner.call(req));
            }
        }

        let request_size = approximate_request_size(&req);
        let matched_route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|m| m.as_str().to_owned());
        let scheme = request_scheme(req.uri(), req.headers());
        let head = RequestHead::capture(&req, !cfg.labels.is_empty());

        let guard = InFlight {
            shared: Arc::clone(&self.shared),
            head,
            matched_route,
            scheme,
            request_size,
            start: cfg.clock.now(),
            done: false,
        };
        let fut = self.inner.call(req);

        Box::pin(async move {
            let result = fut.await;
            guard.finish(&result);
            result
        })
    }
}

/// How the inner service settled, as far as recording is concerned.
enum Outcome<'a> {
    Responded {
        written: u16,
        size: u64,
        headers: &'a HeaderMap,
        error: Option<&'a ResponseError>,
    },
    Failed(&'a dyn HandlerError),
    Cancelled,
}

/// Request data taken before the handler owns the request. Records exactly
/// once: through `finish`, or on drop if the response future went away first.
struct InFlight {
    shared: Arc<Shared>,
    head: RequestHead,
    matched_route: Option<String>,
    scheme: String,
    request_size: u64,
    start: Instant,
    done: bool,
}

impl InFlight {
    fn finish<B, E>(mut self, result: &Result<Response<B>, E>)
    where
        B: Body,
        E: HandlerError,
    {
        self.done = true;
        let outcome = match result {
            Ok(res) => Outcome::Responded {
                written: res.status().as_u16(),
                size: response_size(res),
                headers: res.headers(),
                error: res.extensions().get::<ResponseError>(),
            },
            Err(e) => Outcome::Failed(e),
        };
        self.record(outcome);
    }

    fn record(&self, outcome: Outcome<'_>) {
        let cfg = &self.shared.config;
        let elapsed = cfg
            .clock
            .now()
            .saturating_duration_since(self.start)
            .as_secs_f64();

        let route = resolve_route(
            self.matched_route.as_deref(),
            &self.head.uri,
            cfg.disable_404_path_fallback,
        );

        let (status, resp_size, resp_headers, error): (_, _, _, Option<&dyn HandlerError>) =
            match outcome {
                Outcome::Responded {
                    written,
                    size,
                    headers,
                    error,
                } => {
                    let error = error.map(|e| e as &dyn HandlerError);
                    (resolve_status(written, error), size, Some(headers), error)
                }
                Outcome::Failed(e) => (resolve_status(0, Some(e)), 0, None, Some(e)),
                Outcome::Cancelled => {
                    let e: &dyn HandlerError = &Cancelled;
                    (resolve_status(0, Some(e)), 0, None, Some(e))
                }
            };

        let ctx = LabelContext {
            request: &self.head,
            route: &route,
            status,
            response_headers: resp_headers,
        };
        let attrs = request_attributes(
            &cfg.service_name,
            &self.scheme,
            &cfg.labels,
            &ctx,
            error.map(|e| e.as_error()),
        );

        let m = &self.shared.instruments;
        m.requests.add(1, &attrs);
        m.duration.record(elapsed, &attrs);
        m.request_size.record(self.request_size as f64, &attrs);
        m.response_size.record(resp_size as f64, &attrs);

        tracing::trace!(
            route = %route,
            method = %self.head.method,
            status,
            elapsed_secs = elapsed,
            request_size = self.request_size,
            response_size = resp_size,
            "request recorded"
        );
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.done {
            tracing::debug!(method = %self.head.method, uri = %self.head.uri, "request cancelled");
            self.record(Outcome::Cancelled);
        }
    }
}
