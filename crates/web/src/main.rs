use std::sync::Arc;

use anyhow::Context;
use axum::{Json, Router, routing::get};
use storage::Database;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

mod config;
mod coordinator;
mod error;
mod features;
mod state;

use config::Config;
use features::{championships, heats, scoring, standings};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        standings::handlers::recompute_category,
        standings::handlers::get_leaderboard,
        scoring::handlers::get_scoring_scheme,
        scoring::handlers::update_scoring_scheme,
        heats::handlers::schedule_next_event,
        heats::handlers::schedule_event,
        heats::handlers::list_event_heats,
        championships::handlers::recompute_championship,
        championships::handlers::rebuild_timetable,
    ),
    components(
        schemas(
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::recompute::EventSummary,
            storage::dto::recompute::RecomputeReport,
            storage::dto::recompute::CategoryFailure,
            storage::dto::recompute::ChampionshipRecomputeReport,
            storage::dto::heat::HeatResponse,
            storage::dto::heat::EventHeatsResponse,
            storage::dto::heat::TimetableResponse,
            storage::dto::scoring::UpdateScoringSchemeRequest,
            storage::dto::scoring::ScoringSchemeResponse,
            storage::dto::scoring::ScoringSchemeUpdateResponse,
            storage::services::leaderboard::Standing,
            storage::services::leaderboard::EventScore,
            storage::services::ranking::ResultWarning,
            storage::models::HeatAssignment,
            storage::models::PointsOrder,
            storage::models::PointsPreset,
            storage::models::RankingDiscipline,
        )
    ),
    tags(
        (name = "standings", description = "Event ranking and category leaderboards"),
        (name = "scoring", description = "Scoring scheme of a category"),
        (name = "heats", description = "Heat seeding and lane assignments"),
        (name = "championships", description = "Championship-wide recompute and timetable"),
    )
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", features::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting scoring API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let state = AppState::new(Arc::new(db));

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "OpenAPI document available at http://{}/api-docs/openapi.json",
        bind_address
    );

    axum::serve(listener, app(state))
        .await
        .context("Server terminated")?;

    Ok(())
}
