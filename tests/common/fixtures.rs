//! Test fixture creation for the records database
//!
//! Each test server gets its own temporary database seeded with a small
//! set of records covering the three media categories.

use super::constants::*;
use anyhow::Result;
use media_ranker_server::record_store::{RecordDraft, RecordStore, SqliteRecordStore};
use std::path::PathBuf;
use tempfile::TempDir;

fn draft(
    title: &str,
    category: &str,
    media_type: &str,
    watched_status: &str,
    release_year: i64,
    length_or_episodes: i64,
    synopsis: &str,
) -> RecordDraft {
    RecordDraft {
        title: title.to_string(),
        category: category.to_string(),
        media_type: media_type.to_string(),
        watched_status: watched_status.to_string(),
        recommendations: String::new(),
        release_year: Some(release_year),
        length_or_episodes: Some(length_or_episodes),
        synopsis: synopsis.to_string(),
        comment: None,
        image: None,
    }
}

/// Creates a temporary records database seeded with one movie, one series,
/// and one game. Returns (temp_dir, db_path).
pub fn create_test_db_with_records() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("records.db");

    let store = SqliteRecordStore::new(&db_path)?;
    store.create_record(&draft(
        SEED_MOVIE_TITLE,
        "movie",
        "anime",
        "Completed (1)\n2023-11-02",
        1988,
        124,
        "Neo-Tokyo is about to explode.",
    ))?;
    store.create_record(&draft(
        SEED_SERIES_TITLE,
        "series",
        "anime",
        "In Progress (S1 E12)",
        2004,
        74,
        "A surgeon saves the wrong life.",
    ))?;
    store.create_record(&draft(
        SEED_GAME_TITLE,
        "game",
        "game",
        "Not Started",
        2019,
        20,
        "A solar system stuck in a loop.",
    ))?;

    Ok((dir, db_path))
}
