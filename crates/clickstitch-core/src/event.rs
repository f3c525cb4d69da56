// Behavioral event model
//
// Inbound kind-specific DTOs live at the API edge; the pipeline itself
// only sees `TrackedEvent` and, after stitching, `EnrichedEvent`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stitch::SessionStamp;

/// Category of behavioral event. Each kind is routed to its own
/// downstream topic; adding a kind never touches the continuation
/// algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EventKind {
    /// Generic page interaction (page view, navigation, dwell)
    Data,
    /// Button click
    Button,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Data => "data",
            EventKind::Button => "button",
        }
    }

    /// Downstream topic for this kind, one logical topic per kind.
    pub fn topic(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound event after origin validation, before stitching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedEvent {
    pub kind: EventKind,
    /// Opaque client-stable identifier set by the collector
    pub cookie_id: String,
    pub recorded_at: DateTime<Utc>,
    /// Kind-specific fields, carried through untouched
    pub payload: serde_json::Value,
}

impl TrackedEvent {
    /// Attach a resolved session stamp. Pure; every other field is
    /// carried over unchanged. An event is stamped exactly once.
    pub fn stamped(self, stamp: SessionStamp) -> EnrichedEvent {
        EnrichedEvent {
            kind: self.kind,
            cookie_id: self.cookie_id,
            recorded_at: self.recorded_at,
            payload: self.payload,
            activity_id: stamp.activity_id,
            sequence: stamp.sequence,
        }
    }
}

/// The event as forwarded downstream and eventually persisted by the
/// external pipeline as a history record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EnrichedEvent {
    pub kind: EventKind,
    pub cookie_id: String,
    pub recorded_at: DateTime<Utc>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub payload: serde_json::Value,
    /// Session identifier, globally unique by random generation
    pub activity_id: String,
    /// 1-based position of this event within its session
    pub sequence: i32,
}
