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

//! Domain models and core data structures.
//!
//! This module defines the records produced by a catalogue search, the
//! search mode, and the artwork payload attached to album containers.

pub mod grouping;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub use grouping::{GroupBy, Grouping};

/// Stable identifier of a catalogue track.
///
/// Derived from the track's file path at indexing time, so the same file keeps
/// the same id across re-scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultId(pub i64);

/// A single track returned by a catalogue search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: ResultId,
    pub artist: String,
    pub album_artist: Option<String>,
    pub album: String,
    pub title: String,
    pub track_number: Option<u32>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub duration: Duration,
    pub filename: String,
}

impl SearchResult {
    /// The album artist if tagged, otherwise the track artist.
    pub fn effective_album_artist(&self) -> &str {
        self.album_artist
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.artist)
    }
}

/// What a search query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchBy {
    #[default]
    Songs,
    Albums,
}

impl SearchBy {
    pub fn toggle(self) -> Self {
        match self {
            Self::Songs => Self::Albums,
            Self::Albums => Self::Songs,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Songs => "songs",
            Self::Albums => "albums",
        }
    }
}

impl fmt::Display for SearchBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cover art read from a track's embedded pictures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

#[cfg(test)]
pub(crate) fn test_result(id: i64, artist: &str, album: &str, title: &str) -> SearchResult {
    SearchResult {
        id: ResultId(id),
        artist: artist.to_string(),
        album_artist: None,
        album: album.to_string(),
        title: title.to_string(),
        track_number: None,
        year: None,
        genre: None,
        duration: Duration::from_secs(180),
        filename: format!("/music/{artist}/{album}/{title}.mp3"),
    }
}
