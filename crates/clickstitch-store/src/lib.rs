// History store clients
//
// This crate provides implementations of the core ActivityHistory trait:
// - PgActivityHistory: Postgres reader over the events table
// - InMemoryHistory: in-memory stand-in for tests and local runs

pub mod history;
pub mod memory;

pub use history::PgActivityHistory;
pub use memory::InMemoryHistory;
