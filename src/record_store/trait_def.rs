//! RecordStore trait definition.

use super::models::{MediaRecord, RecordDraft};
use anyhow::Result;

/// Storage backend for media records.
///
/// Every operation is a single round-trip; there are no multi-record
/// atomicity guarantees beyond what the underlying engine provides.
pub trait RecordStore: Send + Sync {
    /// All records, most recently touched first
    /// (`COALESCE(updated_at, date_added)` descending).
    fn list_records(&self) -> Result<Vec<MediaRecord>>;

    /// A single record by id.
    fn get_record(&self, id: &str) -> Result<Option<MediaRecord>>;

    /// Insert a new record, assigning its id and `date_added`.
    fn create_record(&self, draft: &RecordDraft) -> Result<MediaRecord>;

    /// Whole-record overwrite. Refreshes `updated_at` to a value strictly
    /// greater than any prior timestamp. Returns `None` for an unknown id.
    fn update_record(&self, id: &str, draft: &RecordDraft) -> Result<Option<MediaRecord>>;

    /// Replace only `watched_status`, refreshing `updated_at`.
    /// Returns `None` for an unknown id.
    fn update_watched_status(&self, id: &str, watched_status: &str)
        -> Result<Option<MediaRecord>>;

    /// Permanently remove a record. Returns false for an unknown id.
    fn delete_record(&self, id: &str) -> Result<bool>;

    fn records_count(&self) -> usize;
}
