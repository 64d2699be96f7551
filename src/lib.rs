//! Media Ranker Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod client;
pub mod config;
pub mod record_store;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use record_store::{MediaRecord, RecordDraft, RecordStore, SqliteRecordStore};
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
