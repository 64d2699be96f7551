//! Platform-agnostic client library: the table view, the edit session, the
//! watched-status codec, and the HTTP/session plumbing a UI shell wires
//! together.

pub mod api;
pub mod edit_session;
pub mod fields;
pub mod prefs;
pub mod table_state;
pub mod watched_status;

pub use api::{ApiClient, ClientError, SessionManager};
pub use edit_session::{EditSession, EditState, FormFields, Submission};
pub use prefs::{InMemoryPreferenceStore, JsonFilePreferenceStore, PreferenceStore};
pub use table_state::{SortColumn, SortDirection, TableState};
