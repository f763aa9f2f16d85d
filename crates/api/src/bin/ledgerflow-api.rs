//! API server binary (spec §4.2/§6 "Start-up").

use std::process;
use std::sync::Arc;

use ledgerflow_api::cache::CacheManager;
use ledgerflow_api::{ApiConfig, Server, ServerConfig};
use ledgerflow_db::{Database, DbConfig};
use ledgerflow_gateway::{GatewayClient, LedgerGateway};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    ledgerflow_api::telemetry::init();
    info!("starting ledgerflow api");

    let config = match ApiConfig::load() {
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

    let cache = CacheManager::new(db.pool().clone(), config.idempotency_ttl_hours);
    let state = Arc::new(ledgerflow_api::AppState::new(
        db.pool().clone(),
        cache,
        gateway,
        env!("CARGO_PKG_VERSION").to_string(),
    ));

    let server_config = ServerConfig {
        host: config.host.clone(),
        port: config.port,
        enable_cors: config.enable_cors,
    };
    let server = Server::new(server_config, state);

    let server_task = tokio::spawn(async move {
        if let Err(e) = server.start().await {
            error!(error = %e, "api server error");
        }
    });

    wait_for_shutdown_signal().await;
    info!("shutdown signal received");
    server_task.abort();

    info!("ledgerflow api stopped");
}

async fn wait_for_shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}
