// Postgres-backed history reader
//
// The events table is written by the downstream pipeline, never by this
// service; all access here is read-only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use clickstitch_core::{ActivityHistory, ActivityRecord, EventKind, Result, WriteError};

#[derive(Debug, Clone, FromRow)]
struct ActivityRow {
    recorded_at: DateTime<Utc>,
    activity_id: String,
    sequence: i32,
}

impl From<ActivityRow> for ActivityRecord {
    fn from(row: ActivityRow) -> Self {
        ActivityRecord {
            recorded_at: row.recorded_at,
            activity_id: row.activity_id,
            sequence: row.sequence,
        }
    }
}

/// Read side of the external event log, backed by Postgres.
#[derive(Clone)]
pub struct PgActivityHistory {
    pool: PgPool,
}

impl PgActivityHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a history reader from a connection URL
    pub async fn from_url(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ActivityHistory for PgActivityHistory {
    async fn latest(
        &self,
        kind: EventKind,
        cookie_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Option<ActivityRecord>> {
        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT recorded_at, activity_id, sequence
            FROM events
            WHERE kind = $1 AND cookie_id = $2
              AND recorded_at >= $3 AND recorded_at <= $4
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(kind.as_str())
        .bind(cookie_id)
        .bind(from)
        .bind(until)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WriteError::history(e.to_string()))?;

        Ok(row.map(ActivityRecord::from))
    }
}
