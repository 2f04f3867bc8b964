//! ctx-web - Contextualise topic map web application
//!
//! Loads configuration, opens the database and serves the HTML interface.

use anyhow::{Context, Result};
use clap::Parser;
use ctx_common::config::{self, ConfigSource};
use ctx_common::db::init_database;
use ctx_common::{TopicStore, UserStore};
use ctx_web::{build_router, AppState};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ctx-web", version, about = "Contextualise topic map web application")]
struct Args {
    /// Settings file (overrides CTX_CONFIG)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Root folder for the database and uploaded resources (overrides CTX_ROOT_FOLDER)
    #[arg(long, value_name = "PATH")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = config::load(args.config.as_deref(), args.root_folder.as_deref())
        .context("Failed to load configuration")?;
    let config = loaded.config;

    // RUST_LOG takes precedence over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting Contextualise (ctx-web) v{}", env!("CARGO_PKG_VERSION"));

    match &loaded.source {
        ConfigSource::File(path) => info!("Configuration: {}", path.display()),
        ConfigSource::Defaults(Some(path)) => {
            warn!("Settings file not found at {}, using defaults", path.display())
        }
        ConfigSource::Defaults(None) => warn!("No settings file location resolved, using defaults"),
    }
    info!("Root folder: {}", config.root_folder.display());
    info!("Database path: {}", config.database_path.display());

    let pool = match init_database(&config.database_path, config.database.max_connections).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    tokio::fs::create_dir_all(&config.resources_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.resources_dir.display()))?;
    info!("Resources directory: {}", config.resources_dir.display());

    match &config.email {
        Some(email) => info!("Mail server configured: {}:{}", email.server, email.port),
        None => info!("No mail server configured"),
    }
    if !config.security.registerable {
        info!("Self-registration disabled");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(config, TopicStore::new(pool.clone()), UserStore::new(pool));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("ctx-web listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
