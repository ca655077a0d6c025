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

//! Input handling for the playlist view.

use crossterm::event::{KeyCode, KeyEvent};

use crate::{components::PlaylistView, playlist::Playlists};

impl PlaylistView {
    pub fn process_key(&mut self, key: KeyEvent, playlists: &mut Playlists) {
        let len = playlists.active().tracks.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if len == 0 {
                    return;
                }
                let next = self.table_state.selected().map_or(0, |i| (i + 1).min(len - 1));
                self.table_state.select(Some(next));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if len == 0 {
                    return;
                }
                let previous = self.table_state.selected().map_or(0, |i| i.saturating_sub(1));
                self.table_state.select(Some(previous));
            }
            KeyCode::Tab => {
                playlists.cycle_active();
                self.table_state.select(None);
            }
            KeyCode::Char('c') => playlists.clear_queue(),
            _ => {}
        }
    }
}
