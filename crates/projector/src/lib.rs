//! Event projector (C5): tails the ledger's committed event stream and
//! maintains the eventually-consistent read model (spec §4.5).

pub mod apply;
pub mod config;
pub mod error;
pub mod schema;
pub mod server;
pub mod telemetry;
pub mod worker;

pub use config::ProjectorConfig;
pub use error::{ProjectorError, Result};
pub use worker::ProjectorWorker;
