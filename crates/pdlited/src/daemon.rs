//! Daemon wiring: state store, cluster view, coordinator and API server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use pdlite_cluster::{BasicCluster, ClusterOptions};
use pdlite_core::DaemonConfig;
use pdlite_metrics::Metrics;
use pdlite_operator::OperatorController;
use pdlite_scheduler::{Coordinator, SchedulerError};
use pdlite_state::StateStore;

pub async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    info!("pdlite daemon starting");
    config.validate()?;

    std::fs::create_dir_all(&config.server.data_dir)
        .with_context(|| format!("creating data dir {}", config.server.data_dir.display()))?;
    let db_path = config.server.data_dir.join("pdlite.redb");

    // ── Initialize subsystems ──────────────────────────────────

    let store = StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");

    let cluster = Arc::new(BasicCluster::new(ClusterOptions {
        leader_schedule_limit: config.schedule.leader_schedule_limit,
        region_schedule_limit: config.schedule.region_schedule_limit,
    }));

    let op_controller = Arc::new(OperatorController::new(Metrics::new()));
    let coordinator = Arc::new(Coordinator::new(cluster.clone(), op_controller, store));

    let restored = coordinator.load_persisted()?;
    for entry in &config.schedulers {
        match coordinator.add_scheduler(&entry.scheduler_type, entry.args.clone()) {
            Ok(name) => info!(%name, "scheduler registered from config"),
            Err(SchedulerError::AlreadyExists(name)) => {
                debug!(%name, "scheduler already restored, keeping stored config")
            }
            Err(e) => warn!(scheduler_type = %entry.scheduler_type, error = %e, "failed to register scheduler from config"),
        }
    }
    info!(restored, active = coordinator.scheduler_names().len(), "coordinator initialized");

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start background tasks ─────────────────────────────────

    let interval = Duration::from_millis(config.schedule.schedule_interval_ms);
    let coordinator_handle = tokio::spawn({
        let coordinator = coordinator.clone();
        async move {
            coordinator.run(interval, shutdown_rx).await;
        }
    });

    // ── Start API server ───────────────────────────────────────

    let router = pdlite_api::build_router(cluster, coordinator);
    let addr = config.server.listen;
    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    let _ = coordinator_handle.await;

    info!("pdlite daemon stopped");
    Ok(())
}
