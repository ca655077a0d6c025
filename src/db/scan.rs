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

//! Media library indexing and database persistence.
//!
//! This module discovers audio files on the local filesystem and rebuilds the
//! catalogue the search engine queries. It uses `WalkDir` for directory
//! traversal and `Lofty` for metadata extraction.
//!
//! Large library scans are performed within a single SQLite transaction, and
//! artist and album ids are cached during processing to avoid redundant
//! lookups.

use std::{collections::HashMap, path::Path, sync::mpsc::Sender};

use anyhow::{Context, Result};
use lofty::{prelude::*, probe::Probe, tag::ItemKey};
use rusqlite::{Connection, Transaction, params};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use xxhash_rust::xxh3::xxh3_64;

use crate::events::{AppEvent, CatalogEvent};

const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "flac", "ogg", "opus", "m4a", "wav"];

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Progress is reported every this many files.
const PROGRESS_INTERVAL: usize = 25;

#[derive(Default)]
struct IdCache {
    artists: HashMap<String, i64>,
    albums: HashMap<(i64, String), i64>,
}

/// Rebuilds the catalogue from every directory in `roots`.
///
/// All existing records are removed first. Files whose tags cannot be read
/// are skipped.
///
/// # Returns
///
/// The number of tracks in the catalogue after the scan.
///
/// # Errors
///
/// Returns an error if the transaction fails or database constraints are
/// violated during insertion.
pub(crate) fn process_music_library(
    conn: &mut Connection,
    roots: &[String],
    event_tx: &Sender<AppEvent>,
) -> Result<i64> {
    let mut cache = IdCache::default();

    let tx = conn.transaction()?;

    tx.execute("DELETE FROM tracks", [])?;
    tx.execute("DELETE FROM albums", [])?;
    tx.execute("DELETE FROM artists", [])?;
    tx.execute(
        "DELETE FROM sqlite_sequence WHERE name IN ('artists', 'albums', 'tracks')",
        [],
    )?;

    for root in roots {
        info!(directory = %root, "scanning");
        let _ = event_tx.send(AppEvent::Catalog(CatalogEvent::StartedDirectory(root.clone())));

        let mut count = 0;
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| is_audio_file(e.path()))
        {
            if index_file(&tx, &mut cache, entry.path())? {
                count += 1;
                if count % PROGRESS_INTERVAL == 0 {
                    let _ = event_tx.send(AppEvent::Catalog(CatalogEvent::ProcessedFile(count)));
                }
            }
        }

        let _ = event_tx.send(AppEvent::Catalog(CatalogEvent::FinishedDirectory(
            root.clone(),
            count,
        )));
    }

    tx.commit().context("Failed to commit transaction")?;

    let total = crate::db::count_tracks(conn)?;
    info!(total, "scan complete");

    Ok(total)
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}

/// Stable id for a track, derived from its path.
pub(crate) fn durable_id(filename: &str) -> i64 {
    xxh3_64(filename.as_bytes()) as i64
}

/// Reads one file's tags and inserts it. Returns `false` if it was skipped.
fn index_file(tx: &Transaction, cache: &mut IdCache, path: &Path) -> Result<bool> {
    let tagged_file = match Probe::open(path).and_then(|p| p.read()) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable file");
            return Ok(false);
        }
    };

    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        debug!(path = %path.display(), "skipping file without tags");
        return Ok(false);
    };

    let Some(filename) = path.to_str().map(str::to_string) else {
        warn!(path = %path.display(), "skipping path with invalid UTF-8");
        return Ok(false);
    };

    let artist = tag
        .artist()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
    let album_title = tag
        .album()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());
    let title = tag
        .title()
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        });
    let genre = tag.genre().map(|s| s.to_string()).filter(|s| !s.is_empty());
    let track_number = tag.track();
    let duration = i64::try_from(tagged_file.properties().duration().as_secs()).unwrap_or(0);

    let year = tag
        .get(&ItemKey::Year)
        .and_then(|item| item.value().text())
        .and_then(parse_year);

    let album_artist = tag
        .get(&ItemKey::AlbumArtist)
        .and_then(|item| item.value().text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| artist.clone());

    let artist_id = if let Some(&id) = cache.artists.get(&album_artist) {
        id
    } else {
        tx.execute(
            "INSERT OR IGNORE INTO artists (name) VALUES (?)",
            params![album_artist],
        )?;
        let id: i64 = tx.query_row(
            "SELECT id FROM artists WHERE name = ?",
            params![album_artist],
            |r| r.get(0),
        )?;
        cache.artists.insert(album_artist.clone(), id);
        id
    };

    let album_key = (artist_id, album_title.clone());
    let album_id = if let Some(&id) = cache.albums.get(&album_key) {
        id
    } else {
        tx.execute(
            "INSERT OR IGNORE INTO albums (artist_id, title) VALUES (?, ?)",
            params![artist_id, album_title],
        )?;
        let id: i64 = tx.query_row(
            "SELECT id FROM albums WHERE artist_id = ? AND title = ?",
            params![artist_id, album_title],
            |r| r.get(0),
        )?;
        cache.albums.insert(album_key, id);
        id
    };

    tx.execute(
        "INSERT OR IGNORE INTO tracks (durable_id, album_id, track_number, title, artist, duration, genre, year, filename)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            durable_id(&filename),
            album_id,
            track_number,
            title,
            artist,
            duration,
            genre,
            year,
            filename
        ],
    )?;

    Ok(true)
}

/// Takes the year from a tag value such as `1959` or `1959-08-17`.
fn parse_year(text: &str) -> Option<i32> {
    text.trim().get(..4)?.parse().ok().filter(|y| *y > 0)
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::mpsc};

    use super::*;

    #[test]
    fn parses_years() {
        assert_eq!(parse_year("1959"), Some(1959));
        assert_eq!(parse_year(" 1961-06-25"), Some(1961));
        assert_eq!(parse_year("59"), None);
        assert_eq!(parse_year("n/a "), None);
    }

    #[test]
    fn recognises_audio_extensions() {
        assert!(is_audio_file(Path::new("/a/b.MP3")));
        assert!(is_audio_file(Path::new("b.flac")));
        assert!(!is_audio_file(Path::new("cover.jpg")));
        assert!(!is_audio_file(Path::new("README")));
    }

    #[test]
    fn durable_ids_are_stable() {
        assert_eq!(durable_id("/music/a.mp3"), durable_id("/music/a.mp3"));
        assert_ne!(durable_id("/music/a.mp3"), durable_id("/music/b.mp3"));
    }

    #[test]
    fn scan_replaces_catalogue_and_skips_unreadable_files() {
        let (_db_dir, mut conn) = crate::db::tests::seeded_catalogue();
        let media = tempfile::tempdir().unwrap();
        fs::write(media.path().join("broken.mp3"), b"not audio").unwrap();
        fs::write(media.path().join("notes.txt"), b"ignored").unwrap();

        let (event_tx, event_rx) = mpsc::channel();
        let roots = vec![media.path().to_string_lossy().to_string()];
        let total = process_music_library(&mut conn, &roots, &event_tx).unwrap();

        assert_eq!(total, 0);
        let events: Vec<AppEvent> = event_rx.try_iter().collect();
        assert!(matches!(
            events.last(),
            Some(AppEvent::Catalog(CatalogEvent::FinishedDirectory(_, 0)))
        ));
    }
}
