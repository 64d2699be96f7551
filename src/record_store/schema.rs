//! Versioned schema for the media records database.
//!
//! Version 0 is the original layout; version 1 adds the free-form `comment`
//! column introduced by a later client revision.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use anyhow::Result;
use rusqlite::Connection;

pub const TABLE_MEDIA_RECORDS: &str = "media_records";

const MEDIA_RECORDS_TABLE_V0: Table = Table {
    name: TABLE_MEDIA_RECORDS,
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("category", &SqlType::Text, non_null = true),
        sqlite_column!("type", &SqlType::Text, non_null = true),
        sqlite_column!("watched_status", &SqlType::Text, non_null = true),
        sqlite_column!("recommendations", &SqlType::Text, non_null = true),
        sqlite_column!("release_year", &SqlType::Integer, non_null = true),
        sqlite_column!("length_or_episodes", &SqlType::Integer, non_null = true),
        sqlite_column!("synopsis", &SqlType::Text, non_null = true),
        sqlite_column!("image", &SqlType::Text),
        sqlite_column!("date_added", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Text),
    ],
};

const MEDIA_RECORDS_TABLE_V1: Table = Table {
    name: TABLE_MEDIA_RECORDS,
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("category", &SqlType::Text, non_null = true),
        sqlite_column!("type", &SqlType::Text, non_null = true),
        sqlite_column!("watched_status", &SqlType::Text, non_null = true),
        sqlite_column!("recommendations", &SqlType::Text, non_null = true),
        sqlite_column!("release_year", &SqlType::Integer, non_null = true),
        sqlite_column!("length_or_episodes", &SqlType::Integer, non_null = true),
        sqlite_column!("synopsis", &SqlType::Text, non_null = true),
        sqlite_column!("image", &SqlType::Text),
        sqlite_column!("date_added", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Text),
        sqlite_column!("comment", &SqlType::Text),
    ],
};

fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    conn.execute("ALTER TABLE media_records ADD COLUMN comment TEXT;", [])?;
    Ok(())
}

pub const RECORDS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[MEDIA_RECORDS_TABLE_V0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[MEDIA_RECORDS_TABLE_V1],
        migration: Some(migrate_v0_to_v1),
    },
];
