//! moodmail HTTP server: inbound email webhook plus reporting API.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use moodmail::{Config, Database, HuggingFaceClassifier, MoodmailError};
use tracing::{error, info};

mod routes;
mod state;

use state::AppState;

/// Classifies inbound email by emotion and serves aggregate reports.
#[derive(Parser)]
#[command(name = "moodmail-server")]
#[command(version)]
struct Cli {
    /// JSON config file. Falls back to MOODMAIL_CONFIG, then built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match moodmail::resolve_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = moodmail::logging::init(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> moodmail::Result<()> {
    info!("Starting moodmail-server v{}", env!("CARGO_PKG_VERSION"));

    let db_path = config.database.resolved_path()?;
    let db = Database::open(&db_path)?;

    let token = config.classifier.resolve_token()?;
    let classifier = HuggingFaceClassifier::new(
        &config.classifier.base_url,
        &config.classifier.model,
        token,
    )?;
    info!("Classifier endpoint: {}", classifier.endpoint());

    let app = routes::router(AppState::new(db, Arc::new(classifier)));

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| MoodmailError::Io {
            context: format!("failed to bind {}", address),
            source: e,
        })?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MoodmailError::Io {
            context: "server error".to_string(),
            source: e,
        })?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
