mod batch;
mod config;
mod metrics;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use batch::BatchOrchestrator;
use config::AppConfig;
use extract::{Extractor, NotFoundDetector};
use fetch::{Fetcher, FixtureFetcher, HttpFetcher};
use metrics::{Metrics, MetricsSnapshot};

#[derive(Clone)]
struct AppState {
    batch: BatchOrchestrator,
    metrics: Arc<Metrics>,
    source: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    source: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(config.log_json);

    let fetcher = build_fetcher(&config)?;
    let extractor = Extractor::new(NotFoundDetector::new(config.detection.sentinels.clone()));
    let metrics = Metrics::new();

    let batch = BatchOrchestrator::new(
        fetcher,
        Arc::new(extractor),
        metrics.clone(),
        config.concurrency.max_concurrent_fetches,
    )
    .with_trace(config.include_trace);

    let source = match &config.fixtures_dir {
        Some(dir) => dir.display().to_string(),
        None => config.source.url.clone(),
    };
    let state = Arc::new(AppState {
        batch,
        metrics,
        source,
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    info!(
        addr = %config.server.bind_addr,
        source = %state.source,
        max_concurrent = config.concurrency.max_concurrent_fetches,
        "Server listening"
    );

    axum::serve(listener, app(state))
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_fetcher(config: &AppConfig) -> Result<Arc<dyn Fetcher>> {
    match &config.fixtures_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Serving saved results");
            Ok(Arc::new(FixtureFetcher::new(dir)))
        }
        None => Ok(Arc::new(HttpFetcher::new(
            config.source.clone(),
            config.retry_policy(),
        )?)),
    }
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/scrapeResults", get(ping).post(scrape_results))
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "API is working" }))
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        source: state.source.clone(),
    })
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn scrape_results(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Response {
    let hall_tickets = match hall_tickets(&body) {
        Ok(hall_tickets) => hall_tickets,
        Err(message) => {
            warn!(error = message, "Rejected batch request");
            return bad_request(message);
        }
    };

    Json(state.batch.run(hall_tickets).await).into_response()
}

/// The `hallTicketNos` list of a request body, or the message to reject it with.
fn hall_tickets(body: &Value) -> Result<Vec<String>, &'static str> {
    let items = body
        .get("hallTicketNos")
        .and_then(Value::as_array)
        .ok_or("hallTicketNos should be an array")?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or("hallTicketNos should contain only strings")
        })
        .collect()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
