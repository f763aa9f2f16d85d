//! LedgerFlow API server
//!
//! HTTP boundary utilities over the read model maintained by the projector,
//! plus a thin wrapper over the multi-sig approval engine (spec §4.2/§6).
//! Routing and auth proper stay out of scope (spec §1 Non-goals); this
//! crate only observes pipeline effects and forwards votes into the outbox.

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use cache::CacheManager;
pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use server::{Server, ServerConfig};
pub use state::AppState;
