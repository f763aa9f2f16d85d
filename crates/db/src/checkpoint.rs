//! `ProjectorState` checkpoint store (spec §4.5 "Start-up"/invariant 3).

use ledgerflow_domain::projector::ProjectorState;
use sqlx::{PgPool, Row};

use crate::error::Result;

pub struct CheckpointStore {
    pool: PgPool,
}

impl CheckpointStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reads the stored checkpoint, or `ProjectorState::genesis` if this
    /// projector has never run.
    pub async fn load(&self, projector_name: &str) -> Result<ProjectorState> {
        let row = sqlx::query("select * from projector_state where projector_name = $1")
            .bind(projector_name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(row) => ProjectorState {
                projector_name: row.try_get("projector_name")?,
                last_processed_block: row.try_get("last_processed_block")?,
                last_processed_tx_id: row.try_get("last_processed_tx_id")?,
                updated_at: row.try_get("updated_at")?,
            },
            None => ProjectorState::genesis(projector_name),
        })
    }

    /// Advances the checkpoint inside the caller's transaction, so the
    /// projection write and the checkpoint advance commit atomically (spec
    /// §4.5 "Per-event processing" step 3).
    pub async fn advance(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        projector_name: &str,
        block_number: i64,
        tx_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            insert into projector_state (projector_name, last_processed_block, last_processed_tx_id, updated_at)
            values ($1, $2, $3, now())
            on conflict (projector_name) do update set
                last_processed_block = excluded.last_processed_block,
                last_processed_tx_id = excluded.last_processed_tx_id,
                updated_at = now()
            "#,
        )
        .bind(projector_name)
        .bind(block_number)
        .bind(tx_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_checkpoint_requires_database() {
        // Requires a live Postgres instance; run with `cargo test -- --ignored`.
    }
}
