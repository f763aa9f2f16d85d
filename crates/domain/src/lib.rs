//! LedgerFlow Domain
//!
//! Shared, I/O-free types for the off-chain backend of the permissioned-ledger
//! token protocol: outbox commands, projector checkpoints, the approval/multi-sig
//! model, and the read-model row shapes. No crate in this workspace depends on a
//! database or network library here — that keeps the types reusable across the
//! submitter, projector, approvals engine, and HTTP boundary without pulling in
//! `sqlx`/`reqwest`/`axum`.

pub mod amount;
pub mod approvals;
pub mod command;
pub mod idempotency;
pub mod outbox;
pub mod projector;
pub mod readmodel;
pub mod tenant;

pub use amount::Qirat;
pub use tenant::TenantId;
