pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use std::path::Path;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::NewWord;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    if let Some(seed) = &config.catalog_seed {
        let inserted = seed_catalog(&db, seed).await?;
        tracing::info!(path = %seed.display(), inserted, "Catalog seeded");
    }

    let addr = config.bind_addr();
    let state = AppState {
        db: Arc::new(db),
        config: Arc::new(config),
    };

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with public and token-protected routes
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/learners/logout", post(routes::learners::logout))
        .route("/api/words/batch", get(routes::words::batch))
        .route("/api/words/promote", post(routes::words::promote))
        .route("/api/words/escalate", post(routes::words::escalate))
        .route("/api/words/retire", post(routes::words::retire))
        .route("/api/words/:word_id/partition", get(routes::words::partition))
        .route("/api/catalog/source", get(routes::catalog::by_source))
        .route("/api/catalog/target", get(routes::catalog::by_target))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/learners/register", post(routes::learners::register))
        .route("/api/learners/login", post(routes::learners::login))
        .merge(protected_routes)
        .with_state(state)
}

/// Load a JSON array of words into the catalog
pub async fn seed_catalog(db: &Database, path: &Path) -> error::Result<u64> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ApiError::Config(format!("cannot read {}: {e}", path.display())))?;
    let words: Vec<NewWord> = serde_json::from_str(&raw)
        .map_err(|e| ApiError::Config(format!("invalid catalog {}: {e}", path.display())))?;
    db.insert_words(&words).await
}

async fn health_check() -> &'static str {
    "OK"
}
