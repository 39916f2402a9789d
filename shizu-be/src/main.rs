//! shizu-be - event production backend server

use anyhow::{Context, Result};
use clap::Parser;
use shizu_be::api::BuildInfo;
use shizu_be::{build_router, AppState};
use shizu_common::config::{self, MediaRoots, TomlConfig};
use shizu_common::db::init_database;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "shizu-be")]
#[command(about = "Event production backend: lineups, media and playout export")]
#[command(version)]
struct Args {
    /// Root folder holding the database and media directories
    #[arg(long, env = "SHIZU_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Path to the TOML configuration file
    #[arg(short, long, env = "SHIZU_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    let build = BuildInfo::CURRENT;
    info!(
        "Starting shizu-be v{} [{}] built {} ({})",
        build.version, build.git_hash, build.build_timestamp, build.build_profile
    );

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    info!("Root folder: {}", root_folder.display());

    let roots = MediaRoots::resolve(&toml_config.media, &root_folder);
    roots.ensure_exist().context("Failed to create media directories")?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());
    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let bind = args.bind.unwrap_or_else(|| toml_config.bind_address.clone());
    let port = args.port.unwrap_or(toml_config.port);

    let state = AppState::new(pool, roots, toml_config);
    let app = build_router(state);

    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("shizu-be listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shizu-be stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
