//! Field-name bridging between the client's camelCase logical names and the
//! underscore wire keys.
//!
//! This is the only place the two conventions meet; everything past
//! `record_from_loose_json` works with the typed `MediaRecord`.

use crate::record_store::MediaRecord;
use serde_json::Value;

fn wire_key(logical: &str) -> Option<&'static str> {
    Some(match logical {
        "releaseYear" => "release_year",
        "lengthOrEpisodes" => "length_or_episodes",
        "watchedStatus" => "watched_status",
        "dateAdded" => "date_added",
        "updatedAt" => "updated_at",
        _ => return None,
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolves `logical` against a loose JSON object: exact key first, then the
/// mapped underscore key, then a capitalized variant, then empty string.
pub fn get_field(record: &Value, logical: &str) -> String {
    let object = match record.as_object() {
        Some(object) => object,
        None => return String::new(),
    };

    if let Some(value) = object.get(logical) {
        return value_to_string(value);
    }
    if let Some(mapped) = wire_key(logical) {
        if let Some(value) = object.get(mapped) {
            return value_to_string(value);
        }
    }
    if let Some(value) = object.get(&capitalize(logical)) {
        return value_to_string(value);
    }
    String::new()
}

/// Builds a typed record from whatever key convention the payload uses.
/// Absent numerics come out as 0, absent strings as empty.
pub fn record_from_loose_json(value: &Value) -> MediaRecord {
    let opt = |s: String| if s.is_empty() { None } else { Some(s) };
    MediaRecord {
        id: get_field(value, "id"),
        title: get_field(value, "title"),
        category: get_field(value, "category"),
        media_type: get_field(value, "type"),
        watched_status: get_field(value, "watchedStatus"),
        recommendations: get_field(value, "recommendations"),
        release_year: get_field(value, "releaseYear").parse().unwrap_or(0),
        length_or_episodes: get_field(value, "lengthOrEpisodes").parse().unwrap_or(0),
        synopsis: get_field(value, "synopsis"),
        comment: opt(get_field(value, "comment")),
        image: opt(get_field(value, "image")),
        date_added: get_field(value, "dateAdded"),
        updated_at: opt(get_field(value, "updatedAt")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exact_key_wins() {
        let record = json!({"releaseYear": 1999, "release_year": 2000});
        assert_eq!(get_field(&record, "releaseYear"), "1999");
    }

    #[test]
    fn falls_back_to_wire_key() {
        let record = json!({"release_year": 2000, "watched_status": "In Progress"});
        assert_eq!(get_field(&record, "releaseYear"), "2000");
        assert_eq!(get_field(&record, "watchedStatus"), "In Progress");
    }

    #[test]
    fn falls_back_to_capitalized_then_empty() {
        let record = json!({"Title": "Dune"});
        assert_eq!(get_field(&record, "title"), "Dune");
        assert_eq!(get_field(&record, "synopsis"), "");
    }

    #[test]
    fn null_reads_as_empty() {
        let record = json!({"comment": null});
        assert_eq!(get_field(&record, "comment"), "");
    }

    #[test]
    fn loose_json_builds_a_record_from_wire_keys() {
        let record = record_from_loose_json(&json!({
            "id": "r1",
            "title": "Dune",
            "category": "movie",
            "type": "live action",
            "watched_status": "Not Started",
            "recommendations": "",
            "release_year": "2021",
            "length_or_episodes": 155,
            "synopsis": "Spice.",
            "date_added": "2024-01-01T00:00:00Z"
        }));

        assert_eq!(record.release_year, 2021);
        assert_eq!(record.length_or_episodes, 155);
        assert_eq!(record.media_type, "live action");
        assert!(record.updated_at.is_none());
    }
}
