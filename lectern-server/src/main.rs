//! # Lectern Server
//!
//! Course authoring backend.
//!
//! ## Overview
//!
//! - **Courses**: subjects, courses and student enrollment
//! - **Ordering**: modules within courses and contents within modules keep a
//!   stable position, assigned on create and rearranged by drag-and-drop
//! - **Storage**: PostgreSQL when `DATABASE_URL` is set, in-memory otherwise

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow};
use clap::{Args as ClapArgs, Parser, Subcommand};
use lectern_config::{Config, ConfigLoad, ConfigLoader};
use lectern_server::{
    AppState, create_app,
    infra::startup::{build_unit_of_work, connect_pool, run_migrations},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "lectern-server")]
#[command(about = "Course authoring server with ordered modules and contents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Path to a lectern.toml file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&cli.serve).await,
        Some(Command::Serve) | None => run_server(cli.serve).await,
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.clone() {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file in effect");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    info!(
        ordering.reorder_policy = %config.ordering.reorder_policy,
        ordering.assign_attempts = config.ordering.assign_attempts,
        "ordering configuration in effect"
    );

    Ok(config)
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    let pool = connect_pool(&config)
        .await?
        .ok_or_else(|| anyhow!("DATABASE_URL must be set to run migrations"))?;
    run_migrations(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = Arc::new(load_runtime_config(&args)?);
    let unit_of_work = build_unit_of_work(&config).await?;
    let state = AppState::new(unit_of_work, Arc::clone(&config));
    let router = create_app(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Starting Lectern server on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Lectern server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
