mod models;
mod schema;
mod store;
mod trait_def;
mod validation;

pub use models::{MediaRecord, RecordDraft};
pub use store::SqliteRecordStore;
pub use trait_def::RecordStore;
pub use validation::{validate_draft, ValidationPolicy};
