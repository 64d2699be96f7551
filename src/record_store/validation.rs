//! Draft validation.
//!
//! The store accepts whatever survives deserialization; requiredness is a
//! server policy applied here so failures can name the offending fields.

use super::models::RecordDraft;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValidationPolicy {
    /// Only `title` and `synopsis` must be present.
    Baseline,
    /// All descriptive and tracking fields must be present.
    Strict,
}

/// Checks `draft` against `policy`, returning the names of the missing
/// fields (wire keys) on failure.
pub fn validate_draft(draft: &RecordDraft, policy: ValidationPolicy) -> Result<(), Vec<String>> {
    let mut missing = Vec::new();

    if draft.title.trim().is_empty() {
        missing.push("title".to_string());
    }
    if draft.synopsis.trim().is_empty() {
        missing.push("synopsis".to_string());
    }

    if policy == ValidationPolicy::Strict {
        if draft.category.trim().is_empty() {
            missing.push("category".to_string());
        }
        if draft.media_type.trim().is_empty() {
            missing.push("type".to_string());
        }
        if draft.watched_status.trim().is_empty() {
            missing.push("watched_status".to_string());
        }
        if draft.release_year.is_none() {
            missing.push("release_year".to_string());
        }
        if draft.length_or_episodes.is_none() {
            missing.push("length_or_episodes".to_string());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}
