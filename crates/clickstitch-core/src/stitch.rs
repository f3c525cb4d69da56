// The continuation decision
//
// A "session" has no storage of its own; it is reconstructed on every
// call from the newest history record. `decide` is the whole state
// machine: given that record (or its absence) and the clock, pick
// continue-or-new. It performs no I/O so the policy is testable in
// isolation from the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// The newest matching history record, as the store yields it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub recorded_at: DateTime<Utc>,
    pub activity_id: String,
    pub sequence: i32,
}

/// Resolved session placement for one event.
///
/// A named pair rather than a positional tuple: the session id and the
/// 1-based sequence travel together through enrichment and publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SessionStamp {
    pub activity_id: String,
    pub sequence: i32,
}

/// Outcome of the continuation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// No continuable prior event; mint a fresh session id, sequence 1
    NewSession,
    /// Prior event is close enough; reuse its session, bump the sequence
    Continue {
        activity_id: String,
        next_sequence: i32,
    },
}

/// Apply the continuation rule.
///
/// The threshold is exclusive on the continuation side: a gap of exactly
/// `threshold` starts a new session. A record timestamped marginally
/// ahead of `now` (clock skew between writers) counts as a zero gap.
pub fn decide(latest: Option<&ActivityRecord>, now: DateTime<Utc>, threshold: Duration) -> Decision {
    let Some(record) = latest else {
        return Decision::NewSession;
    };

    let within = match now.signed_duration_since(record.recorded_at).to_std() {
        Ok(gap) => gap < threshold,
        // negative gap, record is in the future
        Err(_) => true,
    };

    if within {
        Decision::Continue {
            activity_id: record.activity_id.clone(),
            next_sequence: record.sequence + 1,
        }
    } else {
        Decision::NewSession
    }
}

/// Mint a session identifier: random 128 bits, canonical hyphenated
/// form. No registry is consulted; collision probability is accepted
/// as negligible.
pub fn new_activity_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    const THRESHOLD: Duration = Duration::from_secs(5);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn record_at(recorded_at: DateTime<Utc>) -> ActivityRecord {
        ActivityRecord {
            recorded_at,
            activity_id: "session-s".into(),
            sequence: 7,
        }
    }

    #[test]
    fn test_no_prior_record_starts_new_session() {
        assert_eq!(decide(None, t0(), THRESHOLD), Decision::NewSession);
    }

    #[test]
    fn test_recent_record_continues() {
        let record = record_at(t0());
        let decision = decide(Some(&record), t0() + chrono::Duration::seconds(4), THRESHOLD);
        assert_eq!(
            decision,
            Decision::Continue {
                activity_id: "session-s".into(),
                next_sequence: 8,
            }
        );
    }

    #[test]
    fn test_stale_record_breaks_session() {
        let record = record_at(t0());
        let decision = decide(Some(&record), t0() + chrono::Duration::seconds(6), THRESHOLD);
        assert_eq!(decision, Decision::NewSession);
    }

    #[test]
    fn test_threshold_is_exclusive_on_continuation_side() {
        let record = record_at(t0());

        // 4.999s: still the same burst
        let just_under = t0() + chrono::Duration::milliseconds(4_999);
        assert!(matches!(
            decide(Some(&record), just_under, THRESHOLD),
            Decision::Continue { .. }
        ));

        // exactly 5.000s: not continuing
        let exactly = t0() + chrono::Duration::milliseconds(5_000);
        assert_eq!(decide(Some(&record), exactly, THRESHOLD), Decision::NewSession);
    }

    #[test]
    fn test_record_ahead_of_now_counts_as_zero_gap() {
        let record = record_at(t0() + chrono::Duration::milliseconds(50));
        assert!(matches!(
            decide(Some(&record), t0(), THRESHOLD),
            Decision::Continue { .. }
        ));
    }

    #[test]
    fn test_activity_ids_do_not_collide() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(new_activity_id()), "duplicate activity id");
        }
    }

    #[test]
    fn test_activity_id_is_canonical_uuid() {
        let id = new_activity_id();
        assert_eq!(id.len(), 36);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
