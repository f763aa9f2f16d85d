//! Main event-consumption loop (spec §4.5). A single receiver task wraps
//! `GatewayClient::stream_events` and feeds a `tokio::sync::mpsc` channel;
//! this task drains it straight-line, one event at a time (spec §9 redesign
//! flag: replaces the source's coroutine-style per-event handlers with a
//! plain consumer loop).

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use ledgerflow_db::{CheckpointStore, DbError, ReadModelStore};
use ledgerflow_domain::tenant::TenantId;
use ledgerflow_gateway::{LedgerEvent, LedgerGateway};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::apply::apply;
use crate::error::Result;
use crate::schema::KnownEvent;

pub struct ProjectorWorker {
    pool: PgPool,
    read_model: ReadModelStore,
    checkpoints: CheckpointStore,
    gateway: Arc<dyn LedgerGateway>,
    projector_name: String,
    tenant_id: TenantId,
    reconnect_backoff: Duration,
}

impl ProjectorWorker {
    pub fn new(
        pool: PgPool,
        read_model: ReadModelStore,
        checkpoints: CheckpointStore,
        gateway: Arc<dyn LedgerGateway>,
        projector_name: String,
        tenant_id: TenantId,
        reconnect_backoff: Duration,
    ) -> Self {
        Self {
            pool,
            read_model,
            checkpoints,
            gateway,
            projector_name,
            tenant_id,
            reconnect_backoff,
        }
    }

    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut last_processed_block = match self.checkpoints.load(&self.projector_name).await {
            Ok(state) => state.last_processed_block,
            Err(e) => {
                error!(error = %e, "failed to load projector checkpoint, starting from genesis");
                0
            }
        };

        loop {
            if *shutdown.borrow() {
                info!(projector_name = %self.projector_name, "shutdown requested, stopping projector");
                return;
            }

            info!(projector_name = %self.projector_name, start_block = last_processed_block, "connecting to event stream");

            let (tx, mut rx) = mpsc::channel::<ledgerflow_gateway::Result<LedgerEvent>>(256);
            let gateway = self.gateway.clone();
            let forward = tokio::spawn(async move {
                let mut stream = gateway.stream_events(last_processed_block);
                while let Some(item) = stream.next().await {
                    if tx.send(item).await.is_err() {
                        break;
                    }
                }
            });

            let mut stream_broke = false;
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            forward.abort();
                            return;
                        }
                    }
                    maybe_event = rx.recv() => {
                        match maybe_event {
                            Some(Ok(event)) => {
                                match self.process_event(&event, last_processed_block).await {
                                    Ok(true) => last_processed_block = event.block_number,
                                    Ok(false) => {}
                                    Err(e) => error!(
                                        block_number = event.block_number,
                                        tx_id = %event.tx_id,
                                        error = %e,
                                        "failed to apply event, continuing stream"
                                    ),
                                }
                            }
                            Some(Err(e)) => {
                                warn!(error = %e, "event stream error, reconnecting");
                                stream_broke = true;
                                break;
                            }
                            None => {
                                warn!("event stream closed, reconnecting");
                                stream_broke = true;
                                break;
                            }
                        }
                    }
                }
            }

            forward.abort();
            if stream_broke {
                tokio::select! {
                    _ = tokio::time::sleep(self.reconnect_backoff) => {}
                    _ = shutdown.changed() => {}
                }
            }
        }
    }

    /// Returns `Ok(true)` if the checkpoint advanced to `event.block_number`.
    async fn process_event(&self, event: &LedgerEvent, last_processed_block: i64) -> Result<bool> {
        if event.block_number <= last_processed_block
            && self
                .read_model
                .event_already_recorded(&self.tenant_id, event.block_number, &event.tx_id)
                .await?
        {
            return Ok(false);
        }

        match KnownEvent::parse(&event.event_name, &event.payload) {
            Ok(known) => {
                apply(&self.pool, &self.checkpoints, &self.projector_name, &self.tenant_id, event, &known).await?;
                Ok(true)
            }
            Err(e) => {
                warn!(event_name = %event.event_name, error = %e, "unrecognised event, advancing checkpoint past it");
                self.advance_only(event).await?;
                Ok(true)
            }
        }
    }

    async fn advance_only(&self, event: &LedgerEvent) -> Result<()> {
        let mut transaction = self.pool.begin().await.map_err(DbError::from)?;
        self.checkpoints
            .advance(&mut transaction, &self.projector_name, event.block_number, &event.tx_id)
            .await?;
        transaction.commit().await.map_err(DbError::from)?;
        Ok(())
    }
}
