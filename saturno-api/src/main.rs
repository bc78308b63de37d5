//! saturno-api - Quiz REST service
//!
//! Serves CRUD over the quiz collection at `/api/quizzes`, backed by MongoDB.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use saturno_api::db::{MemoryQuizStore, MongoQuizStore, QuizStore};
use saturno_api::{build_router, AppState};
use saturno_common::config::{ConfigOverrides, ServerConfig};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for saturno-api
///
/// Anything left unset falls back to environment variables, the TOML config
/// file, then compiled defaults.
#[derive(Parser, Debug)]
#[command(name = "saturno-api")]
#[command(about = "REST API serving Saturno quizzes")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "SATURNO_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// MongoDB connection string
    #[arg(long)]
    mongo_uri: Option<String>,

    /// Database name (defaults to the one in the URI)
    #[arg(long)]
    database: Option<String>,

    /// Collection holding quizzes
    #[arg(long)]
    collection: Option<String>,

    /// Allowed CORS origins, comma separated
    #[arg(long, value_delimiter = ',')]
    cors_origins: Option<Vec<String>>,

    /// development, production or test
    #[arg(short, long)]
    environment: Option<String>,

    /// Default tracing filter when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Keep quizzes in memory instead of MongoDB
    #[arg(long)]
    memory: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            host: self.host.clone(),
            port: self.port,
            mongo_uri: self.mongo_uri.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
            cors_origins: self.cors_origins.clone(),
            environment: self.environment.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config =
        ServerConfig::resolve(&args.overrides()).context("Failed to load configuration")?;

    init_tracing(&config.log_level);

    info!(
        "Starting Saturno API (saturno-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Mode: {}", config.environment);

    let store: Arc<dyn QuizStore> = if args.memory {
        warn!("Using in-memory store; quizzes are lost on shutdown");
        Arc::new(MemoryQuizStore::new())
    } else {
        match MongoQuizStore::connect(&config).await {
            Ok(store) => {
                info!("✓ Connected to MongoDB");
                Arc::new(store)
            }
            Err(e) => {
                error!("Error connecting to MongoDB: {}", e);
                return Err(e).context("Failed to connect to MongoDB");
            }
        }
    };

    let address = config.bind_address();
    let state = AppState::new(store, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("saturno-api listening on http://{}", address);
    info!("API: http://{}/api/quizzes", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let default_filter = format!(
        "saturno_api={level},saturno_common={level},tower_http={level}",
        level = log_level
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
