//! Database health monitoring, mirrored from the pool-stats pattern used
//! throughout the read side of this workspace.

use sqlx::PgPool;
use tracing::debug;

/// Connection pool statistics.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

impl PoolStats {
    pub fn active(&self) -> u32 {
        self.size.saturating_sub(self.idle as u32)
    }
}

pub struct HealthMonitor {
    pool: PgPool,
}

impl HealthMonitor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn get_pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    pub async fn is_healthy(&self) -> bool {
        let healthy = sqlx::query("select 1").execute(&self.pool).await.is_ok();
        debug!(healthy, "database health probe");
        healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_stats_active_subtracts_idle() {
        let stats = PoolStats { size: 10, idle: 3 };
        assert_eq!(stats.active(), 7);
    }

    #[test]
    fn pool_stats_all_idle_has_no_active() {
        let stats = PoolStats { size: 10, idle: 10 };
        assert_eq!(stats.active(), 0);
    }
}
