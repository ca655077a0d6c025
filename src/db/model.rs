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

//! Database row mapping for domain models.
//!
//! This module provides the conversion logic between raw SQLite result rows
//! and high-level domain models.

use std::time::Duration;

use rusqlite::Row;

use crate::model::{ResultId, SearchResult};

impl SearchResult {
    /// Maps an SQLite row to a [`SearchResult`] instance.
    ///
    /// This is a helper function designed to be used with
    /// [`rusqlite::Statement::query_map`]; the column order matches the
    /// select list in [`crate::db::search`].
    ///
    /// # Errors
    ///
    /// Returns a [`rusqlite::Error`] if the row does not contain enough
    /// columns or a column cannot be converted to the required Rust type.
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let seconds: i64 = row.get(8)?;

        Ok(Self {
            id: ResultId(row.get(0)?),
            artist: row.get(1)?,
            album_artist: row.get(2)?,
            album: row.get(3)?,
            title: row.get(4)?,
            track_number: row.get(5)?,
            year: row.get(6)?,
            genre: row.get(7)?,
            duration: Duration::from_secs(seconds.max(0) as u64),
            filename: row.get(9)?,
        })
    }
}
