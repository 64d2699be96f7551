//! Derived table view over the fetched record set: search filter, sort
//! cycle, and persisted column widths. Everything here is local; the server
//! is never consulted.

use crate::record_store::MediaRecord;
use anyhow::Result;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use super::prefs::PreferenceStore;

pub const MIN_COLUMN_WIDTH: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The display fields a column header can sort by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Title,
    Category,
    MediaType,
    WatchedStatus,
    Recommendations,
    ReleaseYear,
    LengthOrEpisodes,
    Synopsis,
}

impl SortColumn {
    fn is_numeric(&self) -> bool {
        matches!(self, SortColumn::ReleaseYear | SortColumn::LengthOrEpisodes)
    }

    fn string_value<'a>(&self, record: &'a MediaRecord) -> &'a str {
        match self {
            SortColumn::Title => &record.title,
            SortColumn::Category => &record.category,
            SortColumn::MediaType => &record.media_type,
            SortColumn::WatchedStatus => &record.watched_status,
            SortColumn::Recommendations => &record.recommendations,
            SortColumn::Synopsis => &record.synopsis,
            SortColumn::ReleaseYear | SortColumn::LengthOrEpisodes => "",
        }
    }

    fn numeric_value(&self, record: &MediaRecord) -> i64 {
        match self {
            SortColumn::ReleaseYear => record.release_year,
            SortColumn::LengthOrEpisodes => record.length_or_episodes,
            _ => 0,
        }
    }
}

struct ActiveDrag {
    column: String,
    start_width: f64,
    start_x: f64,
}

pub struct TableState {
    records: Vec<MediaRecord>,
    search_query: String,
    sort: Option<(SortColumn, SortDirection)>,
    column_widths: HashMap<String, f64>,
    prefs: Arc<dyn PreferenceStore>,
    widths_key: String,
    drag: Option<ActiveDrag>,
}

fn matches_query(record: &MediaRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let haystacks = [
        record.title.clone(),
        record.category.clone(),
        record.media_type.clone(),
        record.watched_status.clone(),
        record.recommendations.clone(),
        record.synopsis.clone(),
        record.release_year.to_string(),
        record.length_or_episodes.to_string(),
    ];
    haystacks
        .iter()
        .any(|field| field.to_lowercase().contains(query))
}

impl TableState {
    /// `view_key` namespaces the persisted widths so each table keeps its
    /// own layout.
    pub fn new(prefs: Arc<dyn PreferenceStore>, view_key: &str) -> Self {
        let widths_key = format!("column_widths.{}", view_key);
        let column_widths = prefs
            .get(&widths_key)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        TableState {
            records: Vec::new(),
            search_query: String::new(),
            sort: None,
            column_widths,
            prefs,
            widths_key,
            drag: None,
        }
    }

    pub fn set_records(&mut self, records: Vec<MediaRecord>) {
        self.records = records;
    }

    /// Replaces a single record in place (used by the paths that splice the
    /// server's response instead of re-fetching).
    pub fn splice_record(&mut self, updated: MediaRecord) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.id == updated.id) {
            *existing = updated;
        }
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.trim().to_lowercase();
    }

    pub fn sort_state(&self) -> Option<(SortColumn, SortDirection)> {
        self.sort
    }

    /// Header activation: unsorted column goes ascending, ascending goes
    /// descending, descending resets to the default recency order.
    pub fn cycle_sort(&mut self, column: SortColumn) {
        self.sort = match self.sort {
            Some((current, SortDirection::Ascending)) if current == column => {
                Some((column, SortDirection::Descending))
            }
            Some((current, SortDirection::Descending)) if current == column => None,
            _ => Some((column, SortDirection::Ascending)),
        };
    }

    /// The filtered, sorted view with 1-based row indices.
    pub fn visible_rows(&self) -> Vec<(usize, &MediaRecord)> {
        let mut rows: Vec<&MediaRecord> = self
            .records
            .iter()
            .filter(|record| matches_query(record, &self.search_query))
            .collect();

        match self.sort {
            None => {
                rows.sort_by(|a, b| b.touched_at().cmp(a.touched_at()));
            }
            Some((column, direction)) => {
                rows.sort_by(|a, b| {
                    let ordering = if column.is_numeric() {
                        column.numeric_value(a).cmp(&column.numeric_value(b))
                    } else {
                        column
                            .string_value(a)
                            .to_lowercase()
                            .cmp(&column.string_value(b).to_lowercase())
                    };
                    match direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                });
            }
        }

        rows.into_iter()
            .enumerate()
            .map(|(i, record)| (i + 1, record))
            .collect()
    }

    /// The display position (1-based) of a record in the current view, if
    /// visible. Used by the delete confirmation prompt.
    pub fn display_position(&self, id: &str) -> Option<usize> {
        self.visible_rows()
            .into_iter()
            .find(|(_, record)| record.id == id)
            .map(|(index, _)| index)
    }

    pub fn column_width(&self, column: &str) -> Option<f64> {
        self.column_widths.get(column).copied()
    }

    pub fn begin_resize(&mut self, column: &str, start_width: f64, start_x: f64) {
        self.drag = Some(ActiveDrag {
            column: column.to_string(),
            start_width,
            start_x,
        });
    }

    /// Live width update during the drag; nothing is persisted yet.
    pub fn resize_to(&mut self, pointer_x: f64) {
        if let Some(drag) = &self.drag {
            let new_width = (drag.start_width + (pointer_x - drag.start_x)).max(MIN_COLUMN_WIDTH);
            self.column_widths.insert(drag.column.clone(), new_width);
        }
    }

    /// Drag release: persist the final widths.
    pub fn end_resize(&mut self) -> Result<()> {
        if self.drag.take().is_some() {
            self.prefs.set(&self.widths_key, json!(self.column_widths))?;
        }
        Ok(())
    }
}
