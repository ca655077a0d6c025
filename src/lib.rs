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

//! # quaver
//!
//! A terminal music library search tool.
//!
//! Typing into the search field queries a local catalogue in the background.
//! Results stream into a hidden list and replace the visible one once typing
//! pauses, grouped into a tree of artists, albums, years or genres. Selected
//! tracks can be sent to playlists.
//!
//! The search machinery lives in [`search`]: a [`search::QueryDispatcher`]
//! that issues queries and drops responses to superseded ones, and a
//! [`search::ResultPresenter`] that double-buffers and debounces the results.

pub mod app;
pub mod commander;
pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod playlist;
pub mod render;
pub mod search;
pub mod tasks;
pub mod theme;

mod util;
