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

//! Errors raised by the task worker while serving the search engine.
//!
//! The `Display` text of an [`EngineError`] is what the search view shows in
//! place of results, so messages are written for the user.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("The catalogue is empty, use :scan to index your music")]
    EmptyCatalogue,

    #[error("Catalogue query failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Could not read artwork from {path}: {source}")]
    Artwork {
        path: String,
        #[source]
        source: lofty::error::LoftyError,
    },
}
