use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database};

use patients::domain::service::Service;
use patients::infra::storage::migrations;
use patients::infra::storage::sea_orm_repo::SeaOrmPatientsRepository;

mod auth;
mod config;
mod web;

use auth::AccessKey;
use config::AppConfig;

/// Patient registry server
#[derive(Parser)]
#[command(name = "registry-server")]
#[command(about = "Patient registry HTTP API server")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load_layered(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if cli.print_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Check => {
            config.validate()?;
            println!("Configuration OK");
            Ok(())
        }
        Commands::Run => run_server(config).await,
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    config.validate()?;

    let mut opts = ConnectOptions::new(config.database.url.clone());
    if let Some(max) = config.database.max_conns {
        opts.max_connections(max);
    }
    opts.sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to {}", config.database.url))?;

    migrations::run(&db)
        .await
        .context("Failed to run database migrations")?;

    let repo = SeaOrmPatientsRepository::new(db);
    let service = Arc::new(Service::new(Arc::new(repo), config.patients.clone().into()));

    let router = web::build_router(service, AccessKey::new(config.auth.access_key.as_str()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::warn!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
