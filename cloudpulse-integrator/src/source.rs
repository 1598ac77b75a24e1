//! Metric source adapter
//!
//! Reads the most recent snapshot from the `metrics` table populated by the
//! ingestion agent. Failures are typed and recoverable: the poll loop treats
//! them as "no data this cycle" and retries on the next interval.

use crate::config::MysqlConfig;
use crate::models::MetricSnapshot;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("metrics store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Read-only access to the latest metric snapshot.
///
/// `Ok(None)` means the store is reachable but holds no rows yet; an `Err`
/// means the store could not be reached or the query failed. Callers must
/// treat both as a skipped cycle, never as fatal.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Option<MetricSnapshot>, SourceError>;
}

/// MySQL-backed metric source.
pub struct MySqlMetricSource {
    pool: MySqlPool,
}

// Readings can be NULL when the collector skips a gauge; they count as 0.
const LATEST_QUERY: &str = "\
    SELECT timestamp, \
           CAST(COALESCE(cpu_usage, 0) AS DOUBLE) AS cpu_usage, \
           CAST(COALESCE(memory_usage, 0) AS DOUBLE) AS memory_usage, \
           CAST(COALESCE(disk_usage, 0) AS DOUBLE) AS disk_usage, \
           CAST(COALESCE(net_recv_kbps, 0) AS DOUBLE) AS net_recv_kbps, \
           CAST(COALESCE(net_trans_kbps, 0) AS DOUBLE) AS net_trans_kbps \
    FROM metrics ORDER BY timestamp DESC LIMIT 1";

impl MySqlMetricSource {
    /// Create a source backed by a lazy connection pool.
    ///
    /// No connection is attempted here: the store being down at startup is
    /// the same recoverable condition as the store going down mid-run, and
    /// is surfaced per-fetch instead.
    pub fn connect_lazy(config: &MysqlConfig) -> Result<Self, SourceError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect_lazy(&config.url())?;
        Ok(Self { pool })
    }

    fn row_to_snapshot(row: &MySqlRow) -> Result<MetricSnapshot, sqlx::Error> {
        let timestamp: NaiveDateTime = row.try_get("timestamp")?;
        Ok(MetricSnapshot {
            timestamp: timestamp.and_utc(),
            cpu: row.try_get("cpu_usage")?,
            memory: row.try_get("memory_usage")?,
            disk: row.try_get("disk_usage")?,
            net_recv_kbps: row.try_get("net_recv_kbps")?,
            net_trans_kbps: row.try_get("net_trans_kbps")?,
        })
    }
}

#[async_trait]
impl MetricSource for MySqlMetricSource {
    async fn fetch_latest(&self) -> Result<Option<MetricSnapshot>, SourceError> {
        let row = sqlx::query(LATEST_QUERY).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(Self::row_to_snapshot(&row)?)),
            None => Ok(None),
        }
    }
}
