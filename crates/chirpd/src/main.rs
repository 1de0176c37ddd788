use std::path::Path;
use std::sync::Arc;

use chirp_accounts::validation::normalize_email;
use chirp_core::config::{ChirpConfig, LogFormat};
use chirp_core::{AccountStore, Notifier};
use chirp_server::{AppState, EmailNotifier, LogNotifier, QueuedNotifier, build_router};
use chirp_storage_sqlite::SqliteAccountStore;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/chirp.toml".to_string());
    let config = ChirpConfig::load(&config_path)?;

    init_logging(config.log_format);

    ensure_database_dir(&config.database.url)?;

    let account_store = SqliteAccountStore::connect(&config.database.url).await?;
    promote_admins(&account_store, &config.admin_emails).await?;

    let delivery: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(EmailNotifier::new(smtp, &config.public_url)?),
        None => {
            tracing::warn!("no [smtp] section configured, confirmation links will only be logged");
            Arc::new(LogNotifier::new(&config.public_url))
        }
    };
    let (notifier, worker) = QueuedNotifier::new(delivery);
    tokio::spawn(worker.run());

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(Arc::new(account_store), Arc::new(config), Arc::new(notifier));
    let router = build_router(state);

    tracing::info!("chirpd starting on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .init(),
    }
}

/// Directory that must exist before SQLite can create the database file at
/// `url`. `None` for in-memory databases and files in the working directory.
fn database_dir(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

fn ensure_database_dir(url: &str) -> std::io::Result<()> {
    if let Some(dir) = database_dir(url) {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

async fn promote_admins(store: &SqliteAccountStore, emails: &[String]) -> anyhow::Result<()> {
    for email in emails {
        let normalized = normalize_email(email);
        match store.get_account_by_email(&normalized).await? {
            Some(account) if !account.is_admin => {
                store.set_admin(&account.id, true).await?;
                tracing::info!(account_id = %account.id, "promoted to administrator");
            }
            Some(_) => {}
            None => tracing::warn!(email = %normalized, "admin email has no account yet"),
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutting down");
}
