//! Storage module for persisting simulation data.
//!
//! Records flow through the [`OutputSink`] trait. [`MemorySink`] keeps them
//! in memory, [`Recorder`] writes them to SQLite and [`QueryBuilder`] reads
//! a recorded database back.

mod database;
mod query;
mod recorder;
mod sink;
pub mod types;

pub use database::{Database, DatabaseStats};
pub use query::QueryBuilder;
pub use recorder::{Recorder, RecorderStats};
pub use sink::{MemorySink, NullSink, OutputSink, ReplicateRecord};
pub use types::RecordingStrategy;
