//! Transactional outbox (spec §3 `OutboxCommand`, §4.3): a durable queue of
//! commands destined for the ledger gateway, written in the same local
//! transaction as the business mutation that produced them.

pub mod error;
pub mod store;

pub use error::{OutboxError, Result};
pub use ledgerflow_domain::outbox::{NewOutboxCommand, OutboxCommand, OutboxStatus, OutboxTunables};
pub use store::OutboxStore;
