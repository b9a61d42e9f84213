//! Gradebook API Server
//!
//! REST API server for the gradebook service.
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use gradebook_api::{auth::PasswordConfig, create_router, seed, state::AppState};
use gradebook_core::{AppConfig, LoggingConfig, MemoryStore, PgRecordStore, RecordStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_config()?;

    // Initialize tracing
    init_tracing(&config.logging);

    config.validate().context("Invalid configuration")?;

    // Select the record store
    let store: Arc<dyn RecordStore> = match &config.database.url {
        Some(url) => {
            let store = PgRecordStore::connect(url, config.database.pool_size).await?;
            store.ensure_schema().await?;
            tracing::info!("Connected to PostgreSQL");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    if config.seed.enabled {
        let password = config
            .seed
            .password
            .as_deref()
            .context("SEED_PASSWORD is required when SEED_DEMO_DATA is enabled")?;
        seed::seed_demo_data(store.as_ref(), password, &PasswordConfig::default()).await?;
    }

    let addr = config.server.bind_addr();

    // Create application state
    let state = Arc::new(AppState::new(config, store)?);

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gradebook API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// `GRADEBOOK_CONFIG` names a TOML file overridden by the environment;
/// without it configuration comes from the environment alone.
fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("GRADEBOOK_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load config file {path}"))?
            .with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.as_str().into());

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
