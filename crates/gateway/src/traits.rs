//! The one surface through which the rest of the workspace touches the
//! permissioned ledger (spec §4.1) — grounded on the stable adapter-trait
//! pattern used for cross-system boundaries in this corpus.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;

use crate::circuit_breaker::CircuitBreakerStats;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SubmitResult {
    pub tx_id: String,
    pub block_number: i64,
    pub payload: Value,
}

#[derive(Debug, Clone)]
pub struct LedgerEvent {
    pub block_number: i64,
    pub tx_id: String,
    pub event_name: String,
    pub payload: Value,
}

/// A single, reusable, resilient transport to the permissioned ledger
/// gateway. Exactly one gateway and one transport per configured identity;
/// never references outbox rows, never owns business logic.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Establishes the mutually-authenticated channel. Idempotent after the
    /// first successful call.
    async fn connect(&self) -> Result<()>;

    /// Endorses, submits and waits for commit. Fails if the commit status is
    /// non-success. Gated by the submit-path circuit breaker.
    async fn submit(&self, contract: &str, function: &str, args: &[String]) -> Result<SubmitResult>;

    /// Read-only query; not rate-limited by the breaker.
    async fn evaluate(&self, contract: &str, function: &str, args: &[String]) -> Result<Value>;

    /// Tails committed events from `start_block` onward. On transport loss
    /// the implementation sleeps a fixed backoff and reconnects from the
    /// same start block — callers (the projector) must tolerate replays of
    /// already-seen events.
    fn stream_events(
        &self,
        start_block: i64,
    ) -> Pin<Box<dyn Stream<Item = Result<LedgerEvent>> + Send>>;

    fn circuit_breaker_stats(&self) -> CircuitBreakerStats;
}
