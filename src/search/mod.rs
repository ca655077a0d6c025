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

//! Search-as-you-type over the music catalogue.
//!
//! # Organization
//!
//! * [`engine`]: The [`SearchEngine`] seam and the catalogue-backed engine
//!   that runs queries on the task worker.
//! * [`dispatcher`]: Issues one search per edit and drops responses to
//!   superseded searches.
//! * [`presenter`]: Double-buffered result containers swapped after a quiet
//!   period.
//! * [`container`]: Grouped storage for one set of results.
//!
//! Engine responses reach the main loop as [`SearchEvent`]s tagged with the
//! id of the request that produced them.

pub mod container;
pub mod dispatcher;
pub mod engine;
pub mod presenter;

use std::fmt;

pub use container::{Node, NodeId, NodeKind, ResultContainer, Row};
pub use dispatcher::QueryDispatcher;
pub use engine::{CatalogSearchEngine, SearchEngine};
pub use presenter::{Panel, PresenterState, ResultPresenter, SWAP_MODELS_TIMEOUT};

use crate::model::{Artwork, SearchResult};

/// Identifies one search issued by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchId(pub u32);

impl SearchId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one artwork load. Independent of [`SearchId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtRequestId(pub u32);

impl ArtRequestId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Responses delivered by a [`SearchEngine`].
#[derive(Debug)]
pub enum SearchEvent {
    /// A batch of results. A search may deliver several.
    Results(SearchId, Vec<SearchResult>),
    Error(SearchId, String),
    ArtLoaded(ArtRequestId, Option<Artwork>),
}
