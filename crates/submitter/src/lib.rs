//! Outbox submitter worker (C4): leases commands from the transactional
//! outbox, routes them to the permissioned ledger, records the outcome and
//! reconciles the read model for commands the projector can't reconstruct
//! on its own (spec §4.4).

pub mod config;
pub mod error;
pub mod identity;
pub mod reconcile;
pub mod router;
pub mod server;
pub mod telemetry;
pub mod worker;

pub use config::SubmitterConfig;
pub use error::{Result, SubmitterError};
pub use identity::IdentityPool;
pub use worker::{Metrics, SubmitterWorker};
