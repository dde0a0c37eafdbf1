//! Storage module for persistent vector indices
//!
//! Provides the SQLite-backed index and the per-path registry that
//! serializes writers.

mod database;
mod registry;

pub use database::{SqliteIndex, INDEX_FILE};
pub use registry::{IndexRegistry, WriteGuard};
