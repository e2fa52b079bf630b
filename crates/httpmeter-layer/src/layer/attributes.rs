//! Attribute keys and the per-request attribute set.

use std::error::Error as StdError;

use opentelemetry::KeyValue;
use opentelemetry_semantic_conventions::{resource, trace};

use super::labels::{LabelContext, LabelFn};

pub const SERVICE_NAME: &str = resource::SERVICE_NAME;
pub const HTTP_ROUTE: &str = trace::HTTP_ROUTE;
pub const HTTP_REQUEST_METHOD: &str = trace::HTTP_REQUEST_METHOD;
/// Carries the request scheme, not a host.
pub const HOST_NAME: &str = "host.name";
/// Older semantic-convention key for the response status.
pub const HTTP_STATUS_CODE: &str = "http.status_code";
pub const HTTP_RESPONSE_STATUS_CODE: &str = trace::HTTP_RESPONSE_STATUS_CODE;

/// Every built-in key, in emission order.
pub const BUILTIN: [&str; 6] = [
    SERVICE_NAME,
    HTTP_ROUTE,
    HTTP_REQUEST_METHOD,
    HOST_NAME,
    HTTP_STATUS_CODE,
    HTTP_RESPONSE_STATUS_CODE,
];

/// Built-in attributes followed by one attribute per label, in insertion
/// order. Each label function runs exactly once.
pub(crate) fn request_attributes(
    service_name: &str,
    scheme: &str,
    labels: &[(String, LabelFn)],
    ctx: &LabelContext<'_>,
    error: Option<&(dyn StdError + 'static)>,
) -> Vec<KeyValue> {
    let status = i64::from(ctx.status());
    let mut attrs = Vec::with_capacity(BUILTIN.len() + labels.len());
    attrs.push(KeyValue::new(SERVICE_NAME, service_name.to_owned()));
    attrs.push(KeyValue::new(HTTP_ROUTE, ctx.route().to_owned()));
    attrs.push(KeyValue::new(
        HTTP_REQUEST_METHOD,
        ctx.method().as_str().to_owned(),
    ));
    attrs.push(KeyValue::new(HOST_NAME, scheme.to_owned()));
    attrs.push(KeyValue::new(HTTP_STATUS_CODE, status));
    attrs.push(KeyValue::new(HTTP_RESPONSE_STATUS_CODE, status));

    for (name, label) in labels {
        attrs.push(KeyValue::new(name.clone(), label(ctx, error)));
    }
    attrs
}
