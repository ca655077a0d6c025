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

//! Playlist management.
//!
//! This module receives tracks exported from the search view. A
//! [`PlaylistBundle`] carries the selected results and how they should be
//! placed; any [`PlaylistSink`] can consume it. [`Playlists`] is the sink the
//! application uses: named playlists, one of them active, and a play queue.

use tracing::info;

use crate::model::SearchResult;

const DEFAULT_PLAYLIST_NAME: &str = "Playlist";

/// How exported tracks are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Add to the end of the active playlist.
    #[default]
    Append,
    /// Clear the active playlist first.
    Replace,
    /// Append and queue the tracks to play next.
    Enqueue,
    /// Put the tracks in a new playlist and make it active.
    OpenInNew,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistBundle {
    pub results: Vec<SearchResult>,
    pub placement: Placement,
}

pub trait PlaylistSink {
    fn add_to_playlist(&mut self, bundle: PlaylistBundle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<SearchResult>,
}

impl Playlist {
    fn new(name: String) -> Self {
        Self {
            name,
            tracks: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Playlists {
    playlists: Vec<Playlist>,
    active: usize,
    queued: Vec<SearchResult>,
}

impl Default for Playlists {
    fn default() -> Self {
        Self::new()
    }
}

impl Playlists {
    pub fn new() -> Self {
        Self {
            playlists: vec![Playlist::new(DEFAULT_PLAYLIST_NAME.to_string())],
            active: 0,
            queued: Vec::new(),
        }
    }

    pub fn active(&self) -> &Playlist {
        &self.playlists[self.active]
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn queued(&self) -> impl Iterator<Item = &SearchResult> {
        self.queued.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.queued.len()
    }

    pub fn clear_queue(&mut self) {
        self.queued.clear();
    }

    /// Makes the next playlist active, wrapping around.
    pub fn cycle_active(&mut self) {
        self.active = (self.active + 1) % self.playlists.len();
    }

    fn active_mut(&mut self) -> &mut Playlist {
        &mut self.playlists[self.active]
    }

    /// A name for a new playlist that doesn't clash with existing ones.
    fn unique_name(&self, base: &str) -> String {
        let taken = |name: &str| self.playlists.iter().any(|p| p.name == name);
        if !taken(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base} ({n})"))
            .find(|name| !taken(name))
            .unwrap_or_else(|| base.to_string())
    }
}

impl PlaylistSink for Playlists {
    fn add_to_playlist(&mut self, bundle: PlaylistBundle) {
        let PlaylistBundle { results, placement } = bundle;
        if results.is_empty() {
            return;
        }
        info!(count = results.len(), ?placement, "adding tracks to playlist");

        match placement {
            Placement::Append => self.active_mut().tracks.extend(results),
            Placement::Replace => {
                let active = self.active_mut();
                active.tracks.clear();
                active.tracks.extend(results);
            }
            Placement::Enqueue => {
                self.queued.extend(results.iter().cloned());
                self.active_mut().tracks.extend(results);
            }
            Placement::OpenInNew => {
                let name = self.unique_name(&results[0].album);
                let mut playlist = Playlist::new(name);
                playlist.tracks = results;
                self.playlists.push(playlist);
                self.active = self.playlists.len() - 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_result;

    fn bundle(placement: Placement, titles: &[&str]) -> PlaylistBundle {
        PlaylistBundle {
            results: titles
                .iter()
                .enumerate()
                .map(|(i, t)| test_result(i as i64, "Artist", "Album", t))
                .collect(),
            placement,
        }
    }

    fn active_titles(playlists: &Playlists) -> Vec<&str> {
        playlists
            .active()
            .tracks
            .iter()
            .map(|t| t.title.as_str())
            .collect()
    }

    #[test]
    fn append_and_replace() {
        let mut playlists = Playlists::new();
        playlists.add_to_playlist(bundle(Placement::Append, &["a", "b"]));
        playlists.add_to_playlist(bundle(Placement::Append, &["c"]));
        assert_eq!(active_titles(&playlists), vec!["a", "b", "c"]);

        playlists.add_to_playlist(bundle(Placement::Replace, &["d"]));
        assert_eq!(active_titles(&playlists), vec!["d"]);
    }

    #[test]
    fn enqueue_appends_and_queues() {
        let mut playlists = Playlists::new();
        playlists.add_to_playlist(bundle(Placement::Enqueue, &["a", "b"]));
        assert_eq!(active_titles(&playlists), vec!["a", "b"]);
        assert_eq!(playlists.queue_len(), 2);
        let queued: Vec<&str> = playlists.queued().map(|t| t.title.as_str()).collect();
        assert_eq!(queued, vec!["a", "b"]);
    }

    #[test]
    fn open_in_new_creates_active_playlist() {
        let mut playlists = Playlists::new();
        playlists.add_to_playlist(bundle(Placement::Append, &["a"]));
        playlists.add_to_playlist(bundle(Placement::OpenInNew, &["b"]));
        playlists.add_to_playlist(bundle(Placement::OpenInNew, &["c"]));

        let names: Vec<&str> = playlists.playlists().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Playlist", "Album", "Album (2)"]);
        assert_eq!(active_titles(&playlists), vec!["c"]);

        playlists.cycle_active();
        assert_eq!(active_titles(&playlists), vec!["a"]);
    }

    #[test]
    fn empty_bundles_are_ignored() {
        let mut playlists = Playlists::new();
        playlists.add_to_playlist(bundle(Placement::OpenInNew, &[]));
        assert_eq!(playlists.playlists().len(), 1);
    }
}
