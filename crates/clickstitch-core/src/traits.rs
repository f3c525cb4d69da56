// Collaborator traits for pluggable backends
//
// These traits keep the stitching pipeline independent of concrete
// infrastructure:
// - Postgres / HTTP implementations for production
// - In-memory implementations for examples and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::event::{EnrichedEvent, EventKind};
use crate::stitch::ActivityRecord;

// ============================================================================
// ActivityHistory - read side of the external event log
// ============================================================================

/// Query access to the append-only history of enriched events.
///
/// The store is external and shared; this trait is read-only. The write
/// of the enriched record happens later, downstream of the publisher,
/// outside this service's control.
#[async_trait]
pub trait ActivityHistory: Send + Sync {
    /// The single most recent record for `(kind, cookie_id)` with
    /// `from <= recorded_at <= until`, or `None` if the window is empty.
    async fn latest(
        &self,
        kind: EventKind,
        cookie_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Option<ActivityRecord>>;
}

// ============================================================================
// OriginValidator - upstream application registry
// ============================================================================

/// Verifies an event's origin credentials against the application
/// registry. Must succeed before any session work happens.
#[async_trait]
pub trait OriginValidator: Send + Sync {
    /// `Ok(())` when the token/URL pair is registered;
    /// `Err(WriteError::ValidationRejected)` otherwise.
    async fn validate(&self, application_token: &str, application_url: &str) -> Result<()>;
}

// ============================================================================
// EventPublisher - downstream bus
// ============================================================================

/// Emits enriched events downstream, one logical topic per event kind.
/// Delivery semantics are the publisher's contract, not the resolver's.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, event: &EnrichedEvent) -> Result<()>;
}
