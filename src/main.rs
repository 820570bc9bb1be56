#![forbid(unsafe_code)]

//! `crewcall` — Telegram dispatch bot binary.
//!
//! Bootstraps configuration, the `SQLite` store, the locale catalog,
//! and the Telegram client, then runs the update poller and the
//! reminder sweep until a shutdown signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crewcall::config::GlobalConfig;
use crewcall::dispatch::BotContext;
use crewcall::i18n::Catalog;
use crewcall::orchestrator::reminder;
use crewcall::persistence::db;
use crewcall::telegram::transport::ChatTransport;
use crewcall::telegram::{poller, BotClient};
use crewcall::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "crewcall", about = "Telegram dispatch bot", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("crewcall bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials().await?;
    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Initialize database ─────────────────────────────
    let db = Arc::new(db::connect(&config.db_path).await?);
    info!("database connected");

    // ── Build shared application context ────────────────
    let catalog = Arc::new(Catalog::embedded(&config.default_locale)?);
    let client = Arc::new(BotClient::new(&config.telegram));
    let transport: Arc<dyn ChatTransport> = Arc::clone(&client) as Arc<dyn ChatTransport>;
    let ctx = Arc::new(BotContext {
        config: Arc::clone(&config),
        db,
        transport,
        catalog,
        jobs: TaskTracker::new(),
    });

    // ── Start background tasks ──────────────────────────
    let ct = CancellationToken::new();
    let reminder_handle = reminder::spawn_reminder_task(Arc::clone(&ctx), ct.clone());
    let poller_handle = poller::spawn_poller(Arc::clone(&ctx), client, ct.clone());
    info!("crewcall ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    // Drain tracked broadcast/retraction jobs, then the long-lived tasks.
    ctx.jobs.close();
    ctx.jobs.wait().await;
    let _ = tokio::join!(poller_handle, reminder_handle);
    info!("crewcall shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
