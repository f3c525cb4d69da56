// Clickstitch API server
// Decision: validation, stitching, and publish happen inline per request; no queueing in this service
// Decision: per-client resolutions are deliberately not serialized (see clickstitch-core resolver)

mod clients;
mod common;
mod events;
mod services;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use clickstitch_core::{SessionResolver, SessionStamp, StitchConfig};
use clickstitch_store::PgActivityHistory;

use clients::{HttpEventPublisher, RegistryValidator};
use services::WriteService;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    continuation_threshold_ms: u128,
    lookback_window_secs: u64,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    config: StitchConfig,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        continuation_threshold_ms: state.config.continuation_threshold.as_millis(),
        lookback_window_secs: state.config.lookback_window.as_secs(),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(events::ingest_data, events::ingest_button),
    components(schemas(events::DataEvent, events::ButtonEvent, SessionStamp)),
    tags(
        (name = "events", description = "Behavioral event ingest endpoints")
    ),
    info(
        title = "Clickstitch API",
        version = "0.2.0",
        description = "Ingest behavioral events, stitch them into activity sessions, forward them downstream",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clickstitch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("clickstitch-api starting...");

    // History store connection
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let history = PgActivityHistory::from_url(&database_url)
        .await
        .context("Failed to connect to history store")?;
    tracing::info!("Connected to history store");

    // Stitching policy
    let config = StitchConfig::from_env();
    tracing::info!(
        continuation_threshold = ?config.continuation_threshold,
        lookback_window = ?config.lookback_window,
        query_timeout = ?config.query_timeout,
        "Stitching policy configured"
    );

    // External collaborators
    let registry_url =
        std::env::var("REGISTRY_URL").context("REGISTRY_URL environment variable required")?;
    let forwarder_url =
        std::env::var("FORWARDER_URL").context("FORWARDER_URL environment variable required")?;

    let resolver = SessionResolver::new(Arc::new(history), config.clone());
    let write_service = Arc::new(WriteService::new(
        Arc::new(RegistryValidator::new(registry_url)),
        resolver,
        Arc::new(HttpEventPublisher::new(forwarder_url)),
    ));

    let events_state = events::AppState::new(write_service);
    let health_state = HealthState { config };

    // Load CORS allowed origins from environment (optional)
    // Only needed when the collector runs on a different origin than the API
    // Example: CORS_ALLOWED_ORIGINS="https://shop.example,https://admin.example"
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    // Build main router
    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(events::routes(events_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN]),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".into());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
