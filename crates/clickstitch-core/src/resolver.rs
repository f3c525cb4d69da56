// Session resolution
//
// One bounded history read, one pure decision. The read here and the
// eventual write of the enriched record are not coordinated: two
// concurrent resolutions for the same cookie id can each observe "no
// continuable record" and both open new sessions. That race is accepted
// and confined to `resolve`; a per-client serialization point would be
// added here, never in `decide`.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::StitchConfig;
use crate::error::{Result, WriteError};
use crate::event::EventKind;
use crate::stitch::{decide, new_activity_id, ActivityRecord, Decision, SessionStamp};
use crate::traits::ActivityHistory;

/// Maps `(kind, cookie_id, now)` to a session stamp by querying the
/// history store and applying the continuation rule.
pub struct SessionResolver {
    history: Arc<dyn ActivityHistory>,
    config: StitchConfig,
}

impl SessionResolver {
    pub fn new(history: Arc<dyn ActivityHistory>, config: StitchConfig) -> Self {
        Self { history, config }
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    /// Resolve the session placement for one event.
    ///
    /// Absence of a prior record is not an error; it is the new-session
    /// branch. Store failure or timeout fails the call instead: a store
    /// outage masquerading as "every event starts a new session" would
    /// corrupt downstream analytics.
    pub async fn resolve(
        &self,
        kind: EventKind,
        cookie_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionStamp> {
        let lookback = chrono::Duration::from_std(self.config.lookback_window)
            .map_err(|e| WriteError::config(format!("lookback window out of range: {e}")))?;
        let from = now - lookback;

        let query = self.history.latest(kind, cookie_id, from, now);
        let latest = tokio::time::timeout(self.config.query_timeout, query)
            .await
            .map_err(|_| WriteError::HistoryTimeout(self.config.query_timeout))??;

        if let Some(record) = &latest {
            check_record(record)?;
        }

        let stamp = match decide(latest.as_ref(), now, self.config.continuation_threshold) {
            Decision::Continue {
                activity_id,
                next_sequence,
            } => SessionStamp {
                activity_id,
                sequence: next_sequence,
            },
            Decision::NewSession => SessionStamp {
                activity_id: new_activity_id(),
                sequence: 1,
            },
        };

        tracing::debug!(
            kind = %kind,
            cookie_id,
            activity_id = %stamp.activity_id,
            sequence = stamp.sequence,
            "session resolved"
        );

        Ok(stamp)
    }
}

/// A record the store handed back but which cannot be carried forward
/// is a hard error, not a silent new session.
fn check_record(record: &ActivityRecord) -> Result<()> {
    if record.activity_id.is_empty() {
        return Err(WriteError::malformed("record has empty activity id"));
    }
    if record.sequence < 1 {
        return Err(WriteError::malformed(format!(
            "record has non-positive sequence {}",
            record.sequence
        )));
    }
    Ok(())
}
