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

//! Hierarchical grouping of search results.
//!
//! A [`Grouping`] is an ordered triple of [`GroupBy`] levels. Each level maps a
//! result to the text of the container it belongs to at that depth; `None`
//! levels are skipped.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::model::SearchResult;

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";
const UNKNOWN_GENRE: &str = "Unknown Genre";
const UNKNOWN_YEAR: &str = "Unknown Year";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GroupBy {
    #[default]
    None,
    Artist,
    AlbumArtist,
    Album,
    YearAlbum,
    Year,
    Genre,
}

impl GroupBy {
    /// Containers of these types stand for a single album and may show art.
    pub fn is_album(self) -> bool {
        matches!(self, Self::Album | Self::YearAlbum)
    }

    /// Containers of these types may show cover art.
    pub fn has_art(self) -> bool {
        self.is_album() || self == Self::AlbumArtist
    }

    /// Display text of the container `result` falls into at this level.
    pub fn container_text(self, result: &SearchResult) -> Option<String> {
        let text = match self {
            Self::None => return None,
            Self::Artist => non_empty(&result.artist, UNKNOWN_ARTIST),
            Self::AlbumArtist => non_empty(result.effective_album_artist(), UNKNOWN_ARTIST),
            Self::Album => non_empty(&result.album, UNKNOWN_ALBUM),
            Self::YearAlbum => match result.year.filter(|y| *y > 0) {
                Some(year) => format!("{year} - {}", non_empty(&result.album, UNKNOWN_ALBUM)),
                None => non_empty(&result.album, UNKNOWN_ALBUM),
            },
            Self::Year => match result.year.filter(|y| *y > 0) {
                Some(year) => year.to_string(),
                None => UNKNOWN_YEAR.to_string(),
            },
            Self::Genre => non_empty(result.genre.as_deref().unwrap_or(""), UNKNOWN_GENRE),
        };

        Some(text)
    }

    /// Text that finds the container `result` falls into when searched for.
    pub fn search_text(self, result: &SearchResult) -> Option<String> {
        match self {
            Self::YearAlbum => Some(non_empty(&result.album, UNKNOWN_ALBUM)),
            _ => self.container_text(result),
        }
    }

    /// Key used to order sibling containers of this type.
    pub fn sort_key(self, result: &SearchResult, text: &str) -> String {
        match self {
            Self::Year | Self::YearAlbum => {
                let year = result.year.filter(|y| *y > 0).unwrap_or(0);
                format!("{year:04}{}", text.to_lowercase())
            }
            _ => text.to_lowercase(),
        }
    }

    /// Section heading shown above top-level containers of this type.
    ///
    /// Text groupings are divided by first character, year groupings by
    /// decade.
    pub fn divider(self, result: &SearchResult, text: &str) -> Option<String> {
        match self {
            Self::None => None,
            Self::Year | Self::YearAlbum => Some(match result.year.filter(|y| *y > 0) {
                Some(year) => format!("{}s", year - year % 10),
                None => UNKNOWN_YEAR.to_string(),
            }),
            _ => {
                let first = text.chars().next()?;
                Some(if first.is_ascii_digit() {
                    "0-9".to_string()
                } else if first.is_alphabetic() {
                    first.to_uppercase().collect()
                } else {
                    "…".to_string()
                })
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Artist => "artist",
            Self::AlbumArtist => "albumartist",
            Self::Album => "album",
            Self::YearAlbum => "yearalbum",
            Self::Year => "year",
            Self::Genre => "genre",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GroupBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "-" => Ok(Self::None),
            "artist" => Ok(Self::Artist),
            "albumartist" => Ok(Self::AlbumArtist),
            "album" => Ok(Self::Album),
            "yearalbum" => Ok(Self::YearAlbum),
            "year" => Ok(Self::Year),
            "genre" => Ok(Self::Genre),
            other => anyhow::bail!("unknown grouping '{other}'"),
        }
    }
}

/// Three grouping levels, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grouping {
    pub first: GroupBy,
    pub second: GroupBy,
    pub third: GroupBy,
}

impl Default for Grouping {
    fn default() -> Self {
        Self::new(GroupBy::Artist, GroupBy::Album, GroupBy::None)
    }
}

impl Grouping {
    pub const fn new(first: GroupBy, second: GroupBy, third: GroupBy) -> Self {
        Self {
            first,
            second,
            third,
        }
    }

    /// The groupings offered for quick selection.
    pub const PRESETS: [Grouping; 7] = [
        Grouping::new(GroupBy::Artist, GroupBy::None, GroupBy::None),
        Grouping::new(GroupBy::Artist, GroupBy::Album, GroupBy::None),
        Grouping::new(GroupBy::Artist, GroupBy::YearAlbum, GroupBy::None),
        Grouping::new(GroupBy::AlbumArtist, GroupBy::Album, GroupBy::None),
        Grouping::new(GroupBy::Album, GroupBy::None, GroupBy::None),
        Grouping::new(GroupBy::Genre, GroupBy::Artist, GroupBy::Album),
        Grouping::new(GroupBy::None, GroupBy::None, GroupBy::None),
    ];

    /// Active (non-`None`) levels in order.
    pub fn levels(&self) -> impl Iterator<Item = GroupBy> {
        [self.first, self.second, self.third]
            .into_iter()
            .filter(|g| *g != GroupBy::None)
    }

    /// The preset after this one, or the first preset for a custom grouping.
    pub fn next_preset(&self) -> Grouping {
        match Self::PRESETS.iter().position(|g| g == self) {
            Some(idx) => Self::PRESETS[(idx + 1) % Self::PRESETS.len()],
            None => Self::PRESETS[0],
        }
    }

}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let levels: Vec<&str> = self.levels().map(GroupBy::label).collect();
        if levels.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&levels.join("/"))
        }
    }
}

fn non_empty(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
