//! Admission Portal API server.
//!
//! Starts the Axum HTTP server over the Sled-backed stores.
//! - Storage: Sled KV trees with JSON records and uniqueness indices
//! - Auth: bcrypt password hashes + HS256 bearer tokens
//! - Files: local-disk store under the configured upload dir
//! - Mail: optional HTTP provider, best-effort notifications
//!
//! Usage:
//!   cargo run --bin seed_admin          # create the default admin
//!   cargo run --bin admission_portal    # start the API server
//!   # Then drive it with portal-cli (see src/bin/cli.rs) or curl

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use admission_portal::config::AppConfig;
use admission_portal::email::Mailer;
use admission_portal::files::LocalFileStore;
use admission_portal::lifecycle::Lifecycle;
use admission_portal::reports::Reports;
use admission_portal::rest::{create_router, AppState};
use admission_portal::storage::Storage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logging first so config warnings are not lost: human-readable on
    // stdout, JSON lines into a daily-rolling file.
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let file_appender = tracing_appender::rolling::daily(&log_dir, "portal.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    let config = Arc::new(AppConfig::from_env());

    let storage = Storage::open(&config.data_dir)?;
    let mailer = config.mail.clone().map(|mail| Arc::new(Mailer::new(mail)));
    if mailer.is_none() {
        tracing::info!("mail provider not configured, notifications disabled");
    }

    let state = AppState {
        storage: storage.clone(),
        config: config.clone(),
        lifecycle: Lifecycle::new(storage.clone(), config.clone()),
        reports: Reports::new(storage),
        files: Arc::new(LocalFileStore::new(
            &config.upload_dir,
            &config.public_base_url,
        )),
        mailer,
    };

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "admission portal API listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
