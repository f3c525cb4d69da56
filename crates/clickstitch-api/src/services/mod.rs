// Services layer for business logic
// Services own the event-handling flow, calling collaborators through core traits

pub mod write;

pub use write::{Origin, WriteService};
