//! Projector binary (spec §4.5 "Start-up"/"Failure isolation").

use std::process;
use std::sync::Arc;
use std::time::Duration;

use ledgerflow_db::{CheckpointStore, Database, DbConfig, ReadModelStore};
use ledgerflow_domain::tenant::TenantId;
use ledgerflow_gateway::{GatewayClient, LedgerGateway};
use ledgerflow_projector::server::{self, ServerState};
use ledgerflow_projector::{ProjectorConfig, ProjectorWorker};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    ledgerflow_projector::telemetry::init();
    info!("starting ledgerflow projector");

    let config = match ProjectorConfig::load() {
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

    let identity = config.wallet.identity_config(&config.identity_name);
    let gateway: Arc<dyn LedgerGateway> =
        Arc::new(GatewayClient::new(identity, config.gateway.to_gateway_config()));
    if let Err(e) = gateway.connect().await {
        error!(error = %e, "failed to connect to the ledger gateway");
        process::exit(1);
    }

    let read_model = ReadModelStore::new(db.pool().clone());
    let checkpoints = CheckpointStore::new(db.pool().clone());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let server_state = Arc::new(ServerState {
        checkpoints: CheckpointStore::new(db.pool().clone()),
        projector_name: config.projector_name.clone(),
    });
    let health_port = config.health_port;
    let server_task = tokio::spawn(async move {
        let app = server::router(server_state);
        let listener = match tokio::net::TcpListener::bind(("0.0.0.0", health_port)).await {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, port = health_port, "failed to bind health listener");
                return;
            }
        };
        info!(port = health_port, "health server listening");
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "health server error");
        }
    });

    let worker = ProjectorWorker::new(
        db.pool().clone(),
        read_model,
        checkpoints,
        gateway,
        config.projector_name.clone(),
        TenantId::from(config.tenant_id.as_str()),
        Duration::from_secs(config.reconnect_backoff_secs),
    );

    let worker_task = tokio::spawn(async move { worker.run(shutdown_rx).await });

    wait_for_shutdown_signal().await;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    if let Err(e) = worker_task.await {
        error!(error = %e, "projector task panicked");
    }
    server_task.abort();

    info!("ledgerflow projector stopped");
}

async fn wait_for_shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}
