//! latchd - the latch background service
//!
//! Wires together the pieces:
//! - Configuration loading
//! - Store initialization
//! - Household engine (seeded from the stored snapshot)
//! - Device collaborators (usage counter, restriction control)
//! - Refresh orchestrator (periodic cycle + debounced persistence)

mod adapters;
mod config;
mod sync;

use adapters::{LogOnlyRestriction, StoreUsageCounter};
use anyhow::{Context, Result};
use clap::Parser;
use config::load_config;
use latch_core::{HouseholdEngine, OrchestratorConfig, RefreshOrchestrator};
use latch_store::{AuditEvent, AuditEventType, SqliteStore, Store};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// latchd - chore-and-goal gated screen lock for supervised devices
#[derive(Parser, Debug)]
#[command(name = "latchd")]
#[command(about = "Chore-and-goal gated screen lock for supervised devices", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/latchd/config.toml")]
    config: PathBuf,

    /// Data directory override (or set LATCH_DATA_DIR env var)
    #[arg(short, long, env = "LATCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "latchd starting");

    let mut service_config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    if let Some(data_dir) = args.data_dir {
        service_config.data_dir = data_dir;
    }

    std::fs::create_dir_all(&service_config.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {:?}",
            service_config.data_dir
        )
    })?;

    let db_path = service_config.data_dir.join("latchd.db");
    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&db_path)
            .map_err(|e| anyhow::anyhow!("Failed to open database {:?}: {}", db_path, e))?,
    );
    info!(db_path = %db_path.display(), "Store initialized");

    store.append_audit(AuditEvent::new(AuditEventType::ServiceStarted))?;

    // Seed from the stored snapshot (or defaults), make sure today's
    // obligations exist, and run the first evaluation.
    let restriction = Arc::new(LogOnlyRestriction);
    let mut engine = HouseholdEngine::load(store.clone(), restriction);
    let now = latch_util::now();
    engine.schedule_today(now);
    engine.refresh(now);
    info!(
        chore_count = engine.chores().len(),
        goal_count = engine.learning_goals().len(),
        locked = engine.verdict().is_locked(),
        "Initial evaluation complete"
    );
    let engine = Arc::new(Mutex::new(engine));

    let usage = Arc::new(StoreUsageCounter::new(store.clone()));
    let mut orchestrator = RefreshOrchestrator::new(
        engine,
        store.clone(),
        usage,
        OrchestratorConfig {
            refresh_period: service_config.refresh_period,
            debounce_quiet: service_config.debounce_quiet,
        },
    );
    orchestrator.start().await;

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;
    let mut sigusr1 =
        signal(SignalKind::user_defined1()).context("Failed to create SIGUSR1 handler")?;

    let mut sync = sync::SyncService::new();

    info!("Service running");

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
                break;
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, shutting down gracefully");
                break;
            }
            _ = sigusr1.recv() => {
                info!("Received SIGUSR1, sync requested");
                sync.sync_now().await;
                info!(state = ?sync.state(), "Sync finished");
            }
        }
    }

    // Joins both background tasks and writes a final snapshot.
    orchestrator.shutdown().await;

    if let Err(e) = store.append_audit(AuditEvent::new(AuditEventType::ServiceStopped)) {
        tracing::warn!(error = %e, "Failed to log service shutdown");
    }

    info!("Shutdown complete");
    Ok(())
}
