//! SQLite job store for hookcron.
//!
//! Persists job records in a single `schedule_jobs` table.

mod backend;
mod schema;

pub use backend::SqliteJobStore;
