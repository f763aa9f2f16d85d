//! Shared application state handed to every handler (spec §4.2).

use std::sync::Arc;

use ledgerflow_approvals::ApprovalEngine;
use ledgerflow_db::ReadModelStore;
use ledgerflow_gateway::LedgerGateway;
use ledgerflow_outbox::OutboxStore;
use sqlx::PgPool;

use crate::cache::CacheManager;

pub struct AppState {
    pub pool: PgPool,
    pub read_model: ReadModelStore,
    pub outbox: OutboxStore,
    pub approvals: ApprovalEngine,
    pub cache: CacheManager,
    /// A single gateway connection kept open purely to report circuit-breaker
    /// health on `/ready` (spec §4.2 "readiness checks DB + at least one
    /// gateway identity not OPEN"). This service submits no commands of its
    /// own; all writes go through the outbox.
    pub gateway: Arc<dyn LedgerGateway>,
    pub version: String,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        cache: CacheManager,
        gateway: Arc<dyn LedgerGateway>,
        version: String,
    ) -> Self {
        Self {
            read_model: ReadModelStore::new(pool.clone()),
            outbox: OutboxStore::new(pool.clone()),
            approvals: ApprovalEngine::new(pool.clone()),
            cache,
            gateway,
            version,
            pool,
        }
    }
}
