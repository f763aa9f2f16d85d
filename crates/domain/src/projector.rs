//! Projector checkpoint (spec §3 `ProjectorState`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectorState {
    pub projector_name: String,
    pub last_processed_block: i64,
    pub last_processed_tx_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectorState {
    pub fn genesis(projector_name: impl Into<String>) -> Self {
        Self {
            projector_name: projector_name.into(),
            last_processed_block: 0,
            last_processed_tx_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Invariant 3 (spec §8): checkpoints only increase.
    pub fn can_advance_to(&self, block: i64) -> bool {
        block >= self.last_processed_block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_starts_at_block_zero() {
        let s = ProjectorState::genesis("sdex-projector");
        assert_eq!(s.last_processed_block, 0);
        assert!(s.last_processed_tx_id.is_none());
    }

    #[test]
    fn can_advance_rejects_going_backwards() {
        let mut s = ProjectorState::genesis("p");
        s.last_processed_block = 1000;
        assert!(s.can_advance_to(1000));
        assert!(s.can_advance_to(1050));
        assert!(!s.can_advance_to(999));
    }
}
