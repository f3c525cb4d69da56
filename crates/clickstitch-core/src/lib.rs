// Clickstitch core
//
// Activity stitching: group consecutive events from one client into
// logical sessions. This crate holds the decision logic and the trait
// seams; infrastructure (Postgres history, HTTP registry/forwarder)
// lives in the store and api crates.

pub mod config;
pub mod error;
pub mod event;
pub mod resolver;
pub mod stitch;
pub mod traits;

pub use config::StitchConfig;
pub use error::{Result, WriteError};
pub use event::{EnrichedEvent, EventKind, TrackedEvent};
pub use resolver::SessionResolver;
pub use stitch::{decide, new_activity_id, ActivityRecord, Decision, SessionStamp};
pub use traits::{ActivityHistory, EventPublisher, OriginValidator};
