//! Outbox submitter binary (spec §4.4 "Main loop"/"Shutdown").

use std::process;
use std::sync::Arc;

use ledgerflow_db::{Database, DbConfig, ReadModelStore};
use ledgerflow_outbox::OutboxStore;
use ledgerflow_submitter::server::{self, ServerState};
use ledgerflow_submitter::worker::Metrics;
use ledgerflow_submitter::{IdentityPool, SubmitterConfig, SubmitterWorker};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    ledgerflow_submitter::telemetry::init();
    info!("starting ledgerflow submitter");

    let config = match SubmitterConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            process::exit(1);
        }
    };

    let db_config = match DbConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to load database configuration");
            process::exit(1);
        }
    };

    let db = match Database::new(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "failed to connect to database");
            process::exit(1);
        }
    };

    if let Err(e) = db.migrate().await {
        error!(error = %e, "failed to run migrations");
        process::exit(1);
    }

    let identities = Arc::new(IdentityPool::new(&config));
    if let Err(e) = identities.connect_all().await {
        error!(error = %e, "failed to connect to the ledger gateway");
        process::exit(1);
    }

    let metrics = Arc::new(Metrics::default());
    let outbox = OutboxStore::new(db.pool().clone());
    let read_model = ReadModelStore::new(db.pool().clone());

    let worker = SubmitterWorker::new(
        config.worker_id.clone(),
        outbox,
        read_model,
        identities.clone(),
        config.outbox,
        metrics.clone(),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let server_state = Arc::new(ServerState {
        metrics: metrics.clone(),
        identities,
    });
    let metrics_port = config.metrics_port;
    let server_task = tokio::spawn(async move {
        let app = server::router(server_state);
        let listener = match tokio::net::TcpListener::bind(("0.0.0.0", metrics_port)).await {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, port = metrics_port, "failed to bind metrics/health listener");
                return;
            }
        };
        info!(port = metrics_port, "metrics/health server listening");
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "metrics/health server error");
        }
    });

    let worker_task = tokio::spawn(async move { worker.run(shutdown_rx).await });

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, draining in-flight work");
    metrics.shutting_down.store(true, std::sync::atomic::Ordering::Relaxed);
    let _ = shutdown_tx.send(true);

    if let Err(e) = worker_task.await {
        error!(error = %e, "worker task panicked");
    }
    server_task.abort();

    info!("ledgerflow submitter stopped");
}

async fn wait_for_shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}
