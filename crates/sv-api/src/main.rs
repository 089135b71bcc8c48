//! Sodavend API — natural-language soda vending machine REST server.
//!
//! Serves inventory, transaction history, and the purchase endpoint, which
//! routes customer text through the two-stage intent parser.

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sv_api::config::ApiConfig;
use sv_api::db;
use sv_api::inference::IntentParser;
use sv_api::routes::build_router;
use sv_api::seed;
use sv_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sv-api starting");

    let config = ApiConfig::from_env();

    let parser = IntentParser::from_config(config.model.clone());
    if parser.has_model_tier() {
        tracing::info!(model = %config.model.model, "model tier enabled for intent parsing");
    }

    // Connect to PostgreSQL if DATABASE_URL is set, otherwise run in-memory.
    let state = if let Some(database_url) = &config.database_url {
        tracing::info!("connecting to PostgreSQL");
        let pool = db::connect(database_url).await?;
        AppState::with_pool(pool, parser)
    } else {
        tracing::warn!("DATABASE_URL not set — using in-memory inventory");
        AppState::in_memory(parser)
    };

    seed::seed_products(&state).await?;

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
