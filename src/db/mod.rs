// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Data access layer.
//!
//! This module handles all interactions with the SQLite catalogue, including
//! schema creation and the search queries behind the search engine. It uses
//! cached statements for the frequently executed queries.
//!
//! # Tables
//!
//! * `artists` - Unique album artist names.
//! * `albums` - Groups tracks under titles, linked to artists.
//! * `tracks` - Individual audio files with metadata and file paths.

mod model;
pub(crate) mod scan;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::model::{SearchBy, SearchResult};

/// Upper bound on rows returned for a single query.
const MAX_RESULTS: usize = 2000;

/// Opens a connection to the SQLite database and configures performance
/// settings.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging for better concurrency.
/// * **Performance Tuning**: Sets synchronous mode to `NORMAL` and increases
///   the cache size.
/// * **Constraints**: Enforces foreign key integrity.
/// * **Schema**: Executes [`create_schema`] to ensure all tables and indices
///   exist.
///
/// # Errors
///
/// Returns an error if the database file cannot be opened, the initial PRAGMA
/// configuration fails or the schema cannot be created.
pub(crate) fn init_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        anyhow::bail!(
            "Failed to switch to WAL mode. Current mode: {}",
            journal_mode
        );
    }

    conn.execute_batch(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -64000; -- Use 64MB of RAM for cache
    ",
    )?;

    conn.set_prepared_statement_cache_capacity(100);

    create_schema(&conn)?;

    Ok(conn)
}

/// Create the database schema.
///
/// Creates the `artists`, `albums` and `tracks` tables if they do not already
/// exist, with cascading foreign keys and indices on the join columns. The
/// whole operation runs in one transaction.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE
        );

        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artist_id INTEGER NOT NULL,
            title TEXT NOT NULL COLLATE NOCASE,
            UNIQUE (artist_id, title),
            FOREIGN KEY (artist_id) REFERENCES artists (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_albums_artist_id ON albums (artist_id);

        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            durable_id INTEGER NOT NULL UNIQUE,
            album_id INTEGER NOT NULL,
            track_number INTEGER,
            title TEXT NOT NULL COLLATE NOCASE,
            artist TEXT NOT NULL COLLATE NOCASE,
            duration INTEGER NOT NULL,
            genre TEXT,
            year INTEGER,
            filename TEXT NOT NULL UNIQUE,
            FOREIGN KEY (album_id) REFERENCES albums (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_tracks_album_id ON tracks (album_id);

        COMMIT;",
    )
    .context("Failed to create schema")
}

pub(crate) fn count_tracks(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))
}

/// Searches the catalogue.
///
/// The query is split on whitespace and every word must match at least one
/// searched column: artist, album artist, album and title when searching
/// songs; album and album artist when searching albums. Matching is a
/// case-insensitive substring match.
pub(crate) fn search(
    conn: &Connection,
    query: &str,
    search_by: SearchBy,
) -> rusqlite::Result<Vec<SearchResult>> {
    let columns: &[&str] = match search_by {
        SearchBy::Songs => &["tr.artist", "ar.name", "al.title", "tr.title"],
        SearchBy::Albums => &["al.title", "ar.name"],
    };

    let mut sql = String::from(
        "
        SELECT tr.durable_id, tr.artist, ar.name, al.title, tr.title, tr.track_number, tr.year, tr.genre, tr.duration, tr.filename
        FROM tracks tr
        JOIN albums al ON tr.album_id = al.id
        JOIN artists ar ON al.artist_id = ar.id
    ",
    );

    let mut filters = Vec::new();
    let mut params = Vec::new();

    for token in query.split_whitespace() {
        let pattern = like_pattern(token);
        let clause: Vec<String> = columns
            .iter()
            .map(|column| format!("{column} LIKE ? ESCAPE '\\'"))
            .collect();
        filters.push(format!("({})", clause.join(" OR ")));
        params.extend(std::iter::repeat_n(pattern, columns.len()));
    }

    if !filters.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filters.join(" AND "));
    }

    sql.push_str(&format!(
        " ORDER BY ar.name, al.title, tr.track_number, tr.title LIMIT {MAX_RESULTS}"
    ));

    let mut stmt = conn.prepare_cached(&sql)?;
    let results = stmt
        .query_map(rusqlite::params_from_iter(params), SearchResult::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(results)
}

/// Wraps `token` for a substring `LIKE` match, escaping wildcards.
fn like_pattern(token: &str) -> String {
    let mut pattern = String::with_capacity(token.len() + 2);
    pattern.push('%');
    for c in token.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
