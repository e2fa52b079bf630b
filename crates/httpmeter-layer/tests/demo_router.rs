#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use httpmeter_layer::layer::instruments::REQUESTS_TOTAL;
use httpmeter_layer::{app_state::AppState, config, router};

use support::TestMeter;

fn state(meter: &TestMeter) -> AppState {
    let cfg = config::load_from_str(
        r#"
version: 1
metrics:
  service_name: "demo"
  skip_paths: ["/healthz"]
"#,
    )
    .unwrap();
    AppState::new(cfg, meter.meter()).unwrap()
}

fn req(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-client", "cli")
        .body(Body::empty())
        .unwrap()
}

fn labels<'a>(route: &'a str, status: &'a str, outcome: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("service.name", "demo"),
        ("http.route", route),
        ("http.request.method", "GET"),
        ("host.name", "http"),
        ("http.status_code", status),
        ("http.response.status_code", status),
        ("client", "cli"),
        ("outcome", outcome),
    ]
}

#[tokio::test]
async fn demo_routes_are_metered() {
    let meter = TestMeter::new();
    let app = router::build_router(state(&meter));

    for uri in ["/healthz", "/users/1", "/users/2", "/fail", "/nope"] {
        app.clone().oneshot(req(uri)).await.unwrap();
    }

    let snap = meter.snapshot();
    let count = |route, status, outcome| {
        snap.find(REQUESTS_TOTAL, &labels(route, status, outcome))
            .map(|p| p.count)
            .unwrap_or(0)
    };
    assert_eq!(count("/users/:id", "200", "ok"), 2);
    // /fail writes 503 and attaches the reason as a response error
    assert_eq!(count("/fail", "503", "error"), 1);
    assert_eq!(count("/nope", "404", "client_error"), 1);

    // /healthz is skipped
    let total: u64 = snap.points(REQUESTS_TOTAL).iter().map(|p| p.count).sum();
    assert_eq!(total, 4);
}

#[tokio::test]
async fn skipped_route_still_served() {
    let meter = TestMeter::new();
    let app = router::build_router(state(&meter));
    let res = app.oneshot(req("/healthz")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(meter.snapshot().measurements(), 0);
}
