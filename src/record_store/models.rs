//! Media record models.
//!
//! Wire keys use the underscore convention (`release_year`, `watched_status`);
//! the client-side logical names are camelCase and are bridged once, at the
//! loose-JSON boundary in `crate::client::fields`.

use serde::{Deserialize, Deserializer, Serialize};

/// A single catalog entry (movie/series/game) with descriptive and tracking
/// fields, as stored and as serialized on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub watched_status: String,
    pub recommendations: String,
    pub release_year: i64,
    pub length_or_episodes: i64,
    pub synopsis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub date_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl MediaRecord {
    /// The timestamp that drives recency ordering: `updated_at` when present,
    /// `date_added` otherwise.
    pub fn touched_at(&self) -> &str {
        self.updated_at.as_deref().unwrap_or(&self.date_added)
    }
}

/// Incoming record fields for create and full-update requests.
///
/// Everything is optional at the serde level; requiredness is a policy
/// decision applied afterwards (see `validation`). Numeric fields accept
/// JSON numbers or numeric strings, since some client revisions send the raw
/// form input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub watched_status: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default, deserialize_with = "deserialize_loose_int")]
    pub release_year: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_loose_int")]
    pub length_or_episodes: Option<i64>,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Accepts an integer, a float (truncated), or a numeric string.
/// Empty or unparseable strings count as absent so the validation layer can
/// report the field by name instead of the deserializer rejecting the body.
fn deserialize_loose_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LooseInt {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let value: Option<LooseInt> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(LooseInt::Int(n)) => Some(n),
        Some(LooseInt::Float(f)) => Some(f as i64),
        Some(LooseInt::Text(s)) => s.trim().parse::<i64>().ok(),
    })
}
