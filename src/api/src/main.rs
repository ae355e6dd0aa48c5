//! Cross-country team API
//!
//! REST API over athletes, meets and race results stored in SQLite.

mod cli;
mod config;
mod race_time;
mod routes;
mod storage;
mod types;

use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{apply_database_override, Cli, Commands};
use crate::config::AppConfig;
use crate::routes::AppState;
use crate::storage::TeamRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            database,
        } => run_server(host, port, database).await,
        Commands::InitDb { database } => cli::run_init_db(database),
    }
}

/// Run the API server.
async fn run_server(
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xc_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }
    apply_database_override(&mut config, database);

    tracing::info!("Configuration loaded");
    tracing::info!("Database path: {}", config.database.path);

    let repo = TeamRepository::new(Path::new(&config.database.path))?;
    tracing::info!("Connected to SQLite database");

    let state = Arc::new(AppState {
        repo,
        config: config.clone(),
    });

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
