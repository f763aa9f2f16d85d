//! API request handlers
//!
//! This module re-exports all route handlers for convenience.

pub use crate::routes::{
    approvals::vote, health::health_check, health::ready_check, outbox::get_command,
    transactions::get_transaction, wallets::get_wallet,
};
