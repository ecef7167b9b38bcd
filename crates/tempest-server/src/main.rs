mod controllers;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tempest::{Config, DataBag, Kernel, Request};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    kernel: Arc<Kernel>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let config_path = std::env::var("TEMPEST_CONFIG")
        .unwrap_or_else(|_| tempest::config::DEFAULT_CONFIG_FILE.to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        app = %config.app.name,
        config = %config_path,
        templates = %config.templates.dir.display(),
        debug = config.app.debug,
        "tempest starting"
    );

    let kernel = build_kernel(&config)?;

    match kernel.services().templates.preload() {
        Ok(count) => info!(count, "templates loaded"),
        Err(e) => warn!(error = %e, "failed to preload templates"),
    }

    for route in kernel.route_table() {
        info!(route = %route, "route");
    }

    let app = app(kernel);

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Kernel with the configured routes and every demo controller
fn build_kernel(config: &Config) -> anyhow::Result<Kernel> {
    let mut kernel = Kernel::from_config(config)?;
    for controller in controllers::all(&config.app.name) {
        kernel.controller(controller);
    }
    Ok(kernel)
}

/// Every path goes through one fallback handler into the kernel
fn app(kernel: Kernel) -> Router {
    let state = AppState {
        kernel: Arc::new(kernel),
    };

    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = create_request(method, &uri, headers, &body);
    state.kernel.handle(request).into_response()
}

/// Convert the HTTP parts into a kernel request, decoding form or JSON bodies
fn create_request(method: Method, uri: &Uri, headers: HeaderMap, body: &[u8]) -> Request {
    let raw = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());

    let content_type = headers
        .get("content-type")
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let form = if body.is_empty() {
        DataBag::new()
    } else if content_type.contains("application/json") {
        serde_json::from_slice::<JsonValue>(body)
            .map(DataBag::from_json)
            .unwrap_or_else(|_| DataBag::new())
    } else if content_type.contains("application/x-www-form-urlencoded") {
        DataBag::from_urlencoded(&String::from_utf8_lossy(body))
    } else {
        DataBag::new()
    };

    Request::new(method, &raw)
        .with_headers(headers)
        .with_body(form)
}
