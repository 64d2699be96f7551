//! SQLite-backed record store.

use super::models::{MediaRecord, RecordDraft};
use super::schema::{RECORDS_VERSIONED_SCHEMAS, TABLE_MEDIA_RECORDS};
use super::trait_def::RecordStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = RECORDS_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &RECORDS_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        info!("Creating records db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    // Databases predating versioned schemas report user_version 0; figure out
    // their effective version from the columns that exist.
    let mut current_version = if db_version < BASE_DB_VERSION as i64 {
        let has_comment = conn
            .query_row(
                "SELECT 1 FROM pragma_table_info('media_records') WHERE name = 'comment'",
                [],
                |r| r.get::<_, i32>(0),
            )
            .ok()
            == Some(1);
        if has_comment {
            1
        } else {
            0
        }
    } else {
        (db_version - BASE_DB_VERSION as i64) as usize
    };

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in RECORDS_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating records db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
                current_version = schema.version;
            }
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    } else if db_version < BASE_DB_VERSION as i64 {
        // Legacy database already at the latest shape; stamp it.
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
    }

    latest_schema.validate(conn)
}

const RECORD_COLUMNS: &str = "id, title, category, type, watched_status, recommendations, \
     release_year, length_or_episodes, synopsis, image, date_added, updated_at, comment";

fn row_to_record(row: &Row) -> rusqlite::Result<MediaRecord> {
    let image: Option<String> = row.get(9)?;
    Ok(MediaRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        media_type: row.get(3)?,
        watched_status: row.get(4)?,
        recommendations: row.get(5)?,
        release_year: row.get(6)?,
        length_or_episodes: row.get(7)?,
        synopsis: row.get(8)?,
        image: image.filter(|s| !s.is_empty()),
        date_added: row.get(10)?,
        updated_at: row.get(11)?,
        comment: row.get(12)?,
    })
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A fresh timestamp guaranteed to be strictly greater than `prior`, even if
/// the prior write landed within the same microsecond.
fn timestamp_after(prior: &str) -> String {
    let now = Utc::now();
    match DateTime::parse_from_rfc3339(prior) {
        Ok(prev) if now <= prev => (prev.with_timezone(&Utc) + Duration::microseconds(1))
            .to_rfc3339_opts(SecondsFormat::Micros, true),
        _ => now.to_rfc3339_opts(SecondsFormat::Micros, true),
    }
}

impl SqliteRecordStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let mut conn = Connection::open_with_flags(
            db_path.as_ref(),
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open records database")?;

        migrate_if_needed(&mut conn)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(SqliteRecordStore {
            conn: Mutex::new(conn),
        })
    }

    fn fetch_record(conn: &Connection, id: &str) -> Result<Option<MediaRecord>> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            RECORD_COLUMNS, TABLE_MEDIA_RECORDS
        );
        match conn.query_row(&query, params![id], row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl RecordStore for SqliteRecordStore {
    fn list_records(&self) -> Result<Vec<MediaRecord>> {
        let conn = self.conn.lock().unwrap();
        let query = format!(
            "SELECT {} FROM {} ORDER BY COALESCE(updated_at, date_added) DESC",
            RECORD_COLUMNS, TABLE_MEDIA_RECORDS
        );
        let mut stmt = conn.prepare(&query)?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn get_record(&self, id: &str) -> Result<Option<MediaRecord>> {
        let conn = self.conn.lock().unwrap();
        Self::fetch_record(&conn, id)
    }

    fn create_record(&self, draft: &RecordDraft) -> Result<MediaRecord> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        let date_added = now_rfc3339();

        conn.execute(
            &format!(
                "INSERT INTO {} (id, title, category, type, watched_status, recommendations, \
                 release_year, length_or_episodes, synopsis, image, date_added, updated_at, comment) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL, ?12)",
                TABLE_MEDIA_RECORDS
            ),
            params![
                id,
                draft.title,
                draft.category,
                draft.media_type,
                draft.watched_status,
                draft.recommendations,
                draft.release_year.unwrap_or(0),
                draft.length_or_episodes.unwrap_or(0),
                draft.synopsis,
                draft.image,
                date_added,
                draft.comment,
            ],
        )
        .with_context(|| format!("Failed to insert record {}", draft.title))?;

        Self::fetch_record(&conn, &id)?
            .with_context(|| format!("Record {} missing right after insert", id))
    }

    fn update_record(&self, id: &str, draft: &RecordDraft) -> Result<Option<MediaRecord>> {
        let conn = self.conn.lock().unwrap();
        let existing = match Self::fetch_record(&conn, id)? {
            Some(record) => record,
            None => return Ok(None),
        };
        let updated_at = timestamp_after(existing.touched_at());

        conn.execute(
            &format!(
                "UPDATE {} SET title = ?1, category = ?2, type = ?3, watched_status = ?4, \
                 recommendations = ?5, release_year = ?6, length_or_episodes = ?7, \
                 synopsis = ?8, image = ?9, comment = ?10, updated_at = ?11 WHERE id = ?12",
                TABLE_MEDIA_RECORDS
            ),
            params![
                draft.title,
                draft.category,
                draft.media_type,
                draft.watched_status,
                draft.recommendations,
                draft.release_year.unwrap_or(0),
                draft.length_or_episodes.unwrap_or(0),
                draft.synopsis,
                draft.image,
                draft.comment,
                updated_at,
                id,
            ],
        )
        .with_context(|| format!("Failed to update record {}", id))?;

        Self::fetch_record(&conn, id)
    }

    fn update_watched_status(
        &self,
        id: &str,
        watched_status: &str,
    ) -> Result<Option<MediaRecord>> {
        let conn = self.conn.lock().unwrap();
        let existing = match Self::fetch_record(&conn, id)? {
            Some(record) => record,
            None => return Ok(None),
        };
        let updated_at = timestamp_after(existing.touched_at());

        conn.execute(
            &format!(
                "UPDATE {} SET watched_status = ?1, updated_at = ?2 WHERE id = ?3",
                TABLE_MEDIA_RECORDS
            ),
            params![watched_status, updated_at, id],
        )
        .with_context(|| format!("Failed to update watched status of record {}", id))?;

        Self::fetch_record(&conn, id)
    }

    fn delete_record(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", TABLE_MEDIA_RECORDS),
            params![id],
        )?;
        Ok(deleted > 0)
    }

    fn records_count(&self) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", TABLE_MEDIA_RECORDS),
            [],
            |r| r.get::<_, i64>(0),
        )
        .unwrap_or(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_tmp_store() -> (SqliteRecordStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("records.db");
        let store = SqliteRecordStore::new(&db_path).unwrap();
        (store, temp_dir)
    }

    fn draft(title: &str) -> RecordDraft {
        RecordDraft {
            title: title.to_string(),
            category: "series".to_string(),
            media_type: "anime".to_string(),
            watched_status: "Not Started".to_string(),
            recommendations: "".to_string(),
            release_year: Some(2010),
            length_or_episodes: Some(24),
            synopsis: "A test synopsis.".to_string(),
            comment: None,
            image: None,
        }
    }

    #[test]
    fn create_assigns_id_and_date_added() {
        let (store, _tmp) = create_tmp_store();
        let record = store.create_record(&draft("First")).unwrap();

        assert!(!record.id.is_empty());
        assert!(!record.date_added.is_empty());
        assert!(record.updated_at.is_none());
        assert_eq!(record.title, "First");
        assert_eq!(store.records_count(), 1);
    }

    #[test]
    fn list_orders_by_most_recently_touched() {
        let (store, _tmp) = create_tmp_store();
        let first = store.create_record(&draft("First")).unwrap();
        let second = store.create_record(&draft("Second")).unwrap();

        // Newest creation first.
        let listed = store.list_records().unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        // Updating the older record moves it to the front.
        store.update_record(&first.id, &draft("First!")).unwrap();
        let listed = store.list_records().unwrap();
        assert_eq!(listed[0].id, first.id);

        let touched: Vec<String> = listed.iter().map(|r| r.touched_at().to_string()).collect();
        let mut sorted = touched.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(touched, sorted);
    }

    #[test]
    fn update_refreshes_updated_at_strictly() {
        let (store, _tmp) = create_tmp_store();
        let record = store.create_record(&draft("Thing")).unwrap();

        let updated = store
            .update_record(&record.id, &draft("Thing v2"))
            .unwrap()
            .unwrap();
        let first_updated_at = updated.updated_at.clone().unwrap();
        assert!(first_updated_at > record.date_added);

        let updated_again = store
            .update_record(&record.id, &draft("Thing v3"))
            .unwrap()
            .unwrap();
        assert!(updated_again.updated_at.unwrap() > first_updated_at);
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let (store, _tmp) = create_tmp_store();
        assert!(store
            .update_record("no-such-id", &draft("x"))
            .unwrap()
            .is_none());
        assert!(store
            .update_watched_status("no-such-id", "Completed (1)")
            .unwrap()
            .is_none());
    }

    #[test]
    fn update_watched_status_only_touches_status() {
        let (store, _tmp) = create_tmp_store();
        let record = store.create_record(&draft("Show")).unwrap();

        let updated = store
            .update_watched_status(&record.id, "Completed (1)\n2024-05-01")
            .unwrap()
            .unwrap();

        assert_eq!(updated.watched_status, "Completed (1)\n2024-05-01");
        assert_eq!(updated.title, "Show");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn delete_removes_permanently() {
        let (store, _tmp) = create_tmp_store();
        let record = store.create_record(&draft("Doomed")).unwrap();

        assert!(store.delete_record(&record.id).unwrap());
        assert!(store.get_record(&record.id).unwrap().is_none());
        assert!(store
            .list_records()
            .unwrap()
            .iter()
            .all(|r| r.id != record.id));

        // Second delete of the same id reports absence.
        assert!(!store.delete_record(&record.id).unwrap());
    }

    #[test]
    fn empty_image_reads_back_as_none() {
        let (store, _tmp) = create_tmp_store();
        let mut d = draft("No image");
        d.image = Some("".to_string());
        let record = store.create_record(&d).unwrap();
        assert!(record.image.is_none());
    }

    #[test]
    fn migrates_legacy_v0_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("records.db");

        // A pre-versioning database without the comment column.
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute(
                "CREATE TABLE media_records (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    category TEXT NOT NULL,
                    type TEXT NOT NULL,
                    watched_status TEXT NOT NULL,
                    recommendations TEXT NOT NULL,
                    release_year INTEGER NOT NULL,
                    length_or_episodes INTEGER NOT NULL,
                    synopsis TEXT NOT NULL,
                    image TEXT,
                    date_added TEXT NOT NULL,
                    updated_at TEXT
                )",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO media_records (id, title, category, type, watched_status, \
                 recommendations, release_year, length_or_episodes, synopsis, image, date_added) \
                 VALUES ('old-id', 'Old', 'movie', 'live action', 'Completed (1)', '', 1980, 90, \
                 'vintage', NULL, '2020-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
        }

        let store = SqliteRecordStore::new(&db_path).unwrap();
        let record = store.get_record("old-id").unwrap().unwrap();
        assert_eq!(record.title, "Old");
        assert!(record.comment.is_none());

        // The migrated column is writable.
        let mut d = draft("Old");
        d.comment = Some("migrated".to_string());
        let updated = store.update_record("old-id", &d).unwrap().unwrap();
        assert_eq!(updated.comment.as_deref(), Some("migrated"));
    }

    #[test]
    fn timestamp_after_is_strictly_greater() {
        let prior = now_rfc3339();
        let next = timestamp_after(&prior);
        assert!(next > prior);

        let far_future = "2999-01-01T00:00:00.000000Z";
        let bumped = timestamp_after(far_future);
        assert!(bumped.as_str() > far_future);
    }
}
