//! The admin edit session: an idle/editing state machine mirroring one
//! record's fields into an editable form.
//!
//! The session builds payloads and tracks state; actually sending them is
//! the caller's business (see `api`).

use crate::record_store::{MediaRecord, RecordDraft};

use super::watched_status::{pack, unpack};

fn is_series_like(category: &str) -> bool {
    category.trim().eq_ignore_ascii_case("series")
}

/// Form fields as the operator sees them. Numerics stay strings until
/// submit, matching raw form input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormFields {
    pub title: String,
    pub category: String,
    pub media_type: String,
    pub watched_status: String,
    pub recommendations: String,
    pub release_year: String,
    pub length_or_episodes: String,
    pub synopsis: String,
    pub comment: String,
    pub image: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EditState {
    Idle,
    Editing {
        /// `Some` targets the update operation, `None` the create operation.
        target_id: Option<String>,
        fields: FormFields,
    },
}

/// What submit should do with the built payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    Create(RecordDraft),
    Update(String, RecordDraft),
}

#[derive(Default)]
pub struct EditSession {
    state: EditState,
    pub skip_delete_confirmation: bool,
}

impl Default for EditState {
    fn default() -> Self {
        EditState::Idle
    }
}

impl EditSession {
    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    /// Opens a blank form targeting the create operation.
    pub fn start_create(&mut self) {
        self.state = EditState::Editing {
            target_id: None,
            fields: FormFields::default(),
        };
    }

    /// Copies the record's fields into the form. Series statuses with an
    /// embedded `(S<n> E<m>)` marker are split into separate season/episode
    /// fields; everything else shows the raw status.
    pub fn start_edit(&mut self, record: &MediaRecord) {
        let mut fields = FormFields {
            title: record.title.clone(),
            category: record.category.clone(),
            media_type: record.media_type.clone(),
            watched_status: record.watched_status.clone(),
            recommendations: record.recommendations.clone(),
            release_year: record.release_year.to_string(),
            length_or_episodes: record.length_or_episodes.to_string(),
            synopsis: record.synopsis.clone(),
            comment: record.comment.clone().unwrap_or_default(),
            image: record.image.clone().unwrap_or_default(),
            season: None,
            episode: None,
        };

        if is_series_like(&record.category) {
            let unpacked = unpack(&record.watched_status);
            if unpacked.season.is_some() {
                fields.watched_status = unpacked.status;
                fields.season = unpacked.season;
                fields.episode = unpacked.episode;
            }
        }

        self.state = EditState::Editing {
            target_id: Some(record.id.clone()),
            fields,
        };
    }

    pub fn fields_mut(&mut self) -> Option<&mut FormFields> {
        match &mut self.state {
            EditState::Editing { fields, .. } => Some(fields),
            EditState::Idle => None,
        }
    }

    /// Builds the outbound payload. Season/episode are re-merged into the
    /// status only for an in-progress series; numerics are coerced, with
    /// junk input surfacing as absent for the validation layer to name.
    pub fn build_submission(&self) -> Option<Submission> {
        let (target_id, fields) = match &self.state {
            EditState::Editing { target_id, fields } => (target_id, fields),
            EditState::Idle => return None,
        };

        let watched_status =
            if is_series_like(&fields.category) && fields.watched_status == "In Progress" {
                pack(&fields.watched_status, fields.season, fields.episode)
            } else {
                fields.watched_status.clone()
            };

        let opt = |s: &str| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };
        let draft = RecordDraft {
            title: fields.title.trim().to_string(),
            category: fields.category.trim().to_string(),
            media_type: fields.media_type.trim().to_string(),
            watched_status,
            recommendations: fields.recommendations.clone(),
            release_year: fields.release_year.trim().parse().ok(),
            length_or_episodes: fields.length_or_episodes.trim().parse().ok(),
            synopsis: fields.synopsis.trim().to_string(),
            comment: opt(&fields.comment),
            image: opt(&fields.image),
        };

        Some(match target_id {
            Some(id) => Submission::Update(id.clone(), draft),
            None => Submission::Create(draft),
        })
    }

    /// Success clears back to idle; failure keeps the form untouched so the
    /// operator can fix and retry.
    pub fn finish_submit(&mut self, success: bool) {
        if success {
            self.state = EditState::Idle;
        }
    }

    pub fn cancel(&mut self) {
        self.state = EditState::Idle;
    }

    /// The yes/no prompt text for a delete, or `None` when confirmation is
    /// skipped. `position` is the record's 1-based display row.
    pub fn delete_confirmation(&self, record: &MediaRecord, position: usize) -> Option<String> {
        if self.skip_delete_confirmation {
            return None;
        }
        Some(format!(
            "Delete \"{}\" (row {})? This cannot be undone.",
            record.title, position
        ))
    }
}
