//! httpmeter demo server
//!
//! - Loads `httpmeter.yaml` (strict)
//! - Builds an OpenTelemetry SDK meter provider and hands its meter to the
//!   metrics layer
//! - Serves a small axum router wrapped in the layer
//! - On Ctrl-C, shuts the provider down so pending measurements are flushed
//!
//! No reader or exporter is attached here; a deployment adds one with
//! `SdkMeterProvider::builder().with_reader(..)`.

use std::net::SocketAddr;

use opentelemetry::metrics::MeterProvider as _;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use tracing_subscriber::{fmt, EnvFilter};

use httpmeter_layer::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_file("httpmeter.yaml").expect("config load failed");
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .expect("server.listen must be a valid SocketAddr");

    let provider = SdkMeterProvider::builder().build();
    let meter = provider.meter("httpmeter");

    // bad label configuration is fatal at startup
    let state = app_state::AppState::new(cfg, &meter).expect("metrics layer setup failed");
    let app = router::build_router(state);

    tracing::info!(%listen, "httpmeter-demo starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    if let Err(e) = provider.shutdown() {
        tracing::warn!(error = %e, "meter provider shutdown failed");
    }
    tracing::info!("httpmeter-demo stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}
