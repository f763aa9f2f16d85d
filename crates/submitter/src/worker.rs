//! Main poll loop (spec §4.4 "Main loop"). Shape follows the teacher's
//! `SdexIndexer::start_polling`: `loop { lease a batch; process each row;
//! sleep until next tick }`, generalised from "fetch-then-upsert" to
//! "lease-then-submit-then-reconcile."

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use ledgerflow_db::ReadModelStore;
use ledgerflow_domain::command::{CommandPayload, CommandType};
use ledgerflow_domain::outbox::{OutboxCommand, OutboxTunables};
use ledgerflow_gateway::LedgerGateway;
use ledgerflow_outbox::OutboxStore;
use tracing::{debug, error, info, warn};

use crate::identity::IdentityPool;
use crate::reconcile;
use crate::router;

#[derive(Default)]
pub struct Metrics {
    pub processed_committed: AtomicU64,
    pub processed_failed: AtomicU64,
    pub queue_depth: AtomicI64,
    pub shutting_down: AtomicBool,
}

pub struct SubmitterWorker {
    worker_id: String,
    outbox: OutboxStore,
    read_model: ReadModelStore,
    identities: Arc<IdentityPool>,
    tunables: OutboxTunables,
    metrics: Arc<Metrics>,
}

impl SubmitterWorker {
    pub fn new(
        worker_id: String,
        outbox: OutboxStore,
        read_model: ReadModelStore,
        identities: Arc<IdentityPool>,
        tunables: OutboxTunables,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            worker_id,
            outbox,
            read_model,
            identities,
            tunables,
            metrics,
        }
    }

    /// Runs until `shutdown` resolves. Stops leasing new batches immediately
    /// on shutdown but lets in-flight submits in the current batch finish
    /// (spec §4.4 "Shutdown").
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                info!(worker_id = %self.worker_id, "shutdown requested, stopping poll loop");
                return;
            }

            match self
                .outbox
                .claim_and_lock(
                    &self.worker_id,
                    self.tunables.batch_size,
                    self.tunables.lock_timeout_secs,
                    self.tunables.max_retries,
                )
                .await
            {
                Ok(batch) => {
                    self.metrics.queue_depth.store(batch.len() as i64, Ordering::Relaxed);
                    for row in batch {
                        self.process_row(row).await;
                    }
                }
                Err(e) => error!(worker_id = %self.worker_id, error = %e, "claim_and_lock failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(self.tunables.poll_interval_ms)) => {}
                _ = shutdown.changed() => {}
            }
        }
    }

    async fn process_row(&self, row: OutboxCommand) {
        let (route, args) = match router::route_outbox_row(row.command_type, &row.payload) {
            Ok(routed) => routed,
            Err(e) => {
                warn!(id = %row.id, error = %e, "undecodable outbox row, marking failed");
                let _ = self
                    .outbox
                    .complete_failed(row.id, &self.worker_id, &e.to_string(), "DECODE_ERROR")
                    .await;
                self.metrics.processed_failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let gateway = self.identities.for_role(row.command_type.identity_role());
        let args: Vec<String> = args;

        debug!(id = %row.id, contract = route.contract, function = route.function, "submitting outbox row");

        match gateway.submit(route.contract, route.function, &args).await {
            Ok(result) => {
                let lease_held = match self
                    .outbox
                    .complete_committed(row.id, &self.worker_id, &result.tx_id, result.block_number)
                    .await
                {
                    Ok(held) => held,
                    Err(e) => {
                        error!(id = %row.id, error = %e, "failed to mark outbox row committed");
                        false
                    }
                };

                if lease_held {
                    self.metrics.processed_committed.fetch_add(1, Ordering::Relaxed);
                    if let Ok(typed) = CommandPayload::from_json(row.command_type, &row.payload) {
                        self.run_reconciliation(&*gateway, &row, &typed).await;
                    }
                } else {
                    warn!(id = %row.id, "lease lost before commit could be recorded, skipping reconciliation");
                }
            }
            Err(e) => {
                warn!(id = %row.id, error = %e, "submit failed");
                let code = error_code(row.command_type);
                let _ = self
                    .outbox
                    .complete_failed(row.id, &self.worker_id, &e.to_string(), code)
                    .await;
                self.metrics.processed_failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    async fn run_reconciliation(&self, gateway: &dyn LedgerGateway, row: &OutboxCommand, payload: &CommandPayload) {
        if let Err(e) = reconcile::reconcile(&self.read_model, gateway, &row.tenant_id, payload).await {
            warn!(id = %row.id, error = %e, "post-commit reconciliation failed, read model may lag until the projector catches up");
        }
    }
}

fn error_code(command_type: CommandType) -> &'static str {
    match command_type {
        CommandType::TransferTokens => "TRANSFER_FAILED",
        CommandType::CreateUser => "CREATE_USER_FAILED",
        _ => "SUBMIT_FAILED",
    }
}
