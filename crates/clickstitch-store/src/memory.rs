// In-memory history for tests and local runs
//
// Mirrors the Postgres reader's window semantics: both bounds
// inclusive, newest record wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

use clickstitch_core::{ActivityHistory, ActivityRecord, EventKind, Result};

#[derive(Debug, Clone)]
struct StoredRecord {
    kind: EventKind,
    cookie_id: String,
    record: ActivityRecord,
}

/// In-memory stand-in for the external event log.
#[derive(Default)]
pub struct InMemoryHistory {
    records: Mutex<Vec<StoredRecord>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, as if the downstream pipeline had persisted it.
    pub fn push(&self, kind: EventKind, cookie_id: impl Into<String>, record: ActivityRecord) {
        self.records.lock().unwrap().push(StoredRecord {
            kind,
            cookie_id: cookie_id.into(),
            record,
        });
    }
}

#[async_trait]
impl ActivityHistory for InMemoryHistory {
    async fn latest(
        &self,
        kind: EventKind,
        cookie_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Option<ActivityRecord>> {
        let records = self.records.lock().unwrap();
        let newest = records
            .iter()
            .filter(|stored| {
                stored.kind == kind
                    && stored.cookie_id == cookie_id
                    && stored.record.recorded_at >= from
                    && stored.record.recorded_at <= until
            })
            .max_by_key(|stored| stored.record.recorded_at)
            .map(|stored| stored.record.clone());

        Ok(newest)
    }
}
