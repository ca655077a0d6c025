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

//! Debounced, double-buffered presentation of search results.
//!
//! Two [`ResultContainer`]s take turns being visible. A new query clears the
//! back container and makes it the write target while the front stays on
//! screen; once input has been quiet for [`SWAP_MODELS_TIMEOUT`] (or straight
//! away for an explicit search) the roles are exchanged. Swapping exchanges an
//! index, never the data.
//!
//! Art requests refer to nodes of the front container. Node ids mean nothing
//! after a swap or regroup, so the request map is emptied at both points.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::{
    model::{Artwork, Grouping, SearchResult},
    search::{ArtRequestId, NodeId, NodeKind, ResultContainer},
};

/// Quiet period before freshly collected results replace the visible ones.
pub const SWAP_MODELS_TIMEOUT: Duration = Duration::from_millis(250);

pub const HELP_TEXT: &str = "Enter search terms above to find music";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterState {
    /// Help or error text is shown instead of results.
    Idle,
    /// The back container is collecting results and a swap is pending.
    Populating,
    /// The front container is shown and no swap is pending.
    Visible,
}

/// What the result area should display.
#[derive(Debug, Clone, Copy)]
pub enum Panel<'a> {
    Help(&'a str),
    Error(&'a str),
    Results(&'a ResultContainer),
}

pub struct ResultPresenter {
    containers: [ResultContainer; 2],
    front: usize,
    write_target: usize,
    state: PresenterState,
    swap_delay: Duration,
    swap_deadline: Option<Instant>,
    art_requests: HashMap<ArtRequestId, NodeId>,
    use_pretty_covers: bool,
    query_empty: bool,
    error: Option<String>,
    showing_results: bool,
}

impl ResultPresenter {
    pub fn new(grouping: Grouping) -> Self {
        Self::with_swap_delay(grouping, SWAP_MODELS_TIMEOUT)
    }

    pub fn with_swap_delay(grouping: Grouping, swap_delay: Duration) -> Self {
        Self {
            containers: [ResultContainer::new(grouping), ResultContainer::new(grouping)],
            front: 0,
            write_target: 0,
            state: PresenterState::Idle,
            swap_delay,
            swap_deadline: None,
            art_requests: HashMap::new(),
            use_pretty_covers: true,
            query_empty: true,
            error: None,
            showing_results: false,
        }
    }

    pub fn state(&self) -> PresenterState {
        self.state
    }

    pub fn front(&self) -> &ResultContainer {
        &self.containers[self.front]
    }

    pub fn back(&self) -> &ResultContainer {
        &self.containers[1 - self.front]
    }

    pub fn grouping(&self) -> Grouping {
        self.front().grouping()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn swap_pending(&self) -> bool {
        self.swap_deadline.is_some()
    }

    pub fn pending_art_requests(&self) -> usize {
        self.art_requests.len()
    }

    pub fn set_use_pretty_covers(&mut self, enabled: bool) {
        self.use_pretty_covers = enabled;
    }

    pub fn panel(&self) -> Panel<'_> {
        if let Some(error) = &self.error {
            Panel::Error(error)
        } else if self.showing_results {
            Panel::Results(self.front())
        } else {
            Panel::Help(HELP_TEXT)
        }
    }

    /// Prepares for the results of a new query and (re)arms the swap timer.
    pub fn begin_query(&mut self, query_is_empty: bool, now: Instant) {
        self.error = None;
        self.query_empty = query_is_empty;

        let back = 1 - self.front;
        self.containers[back].clear();
        self.write_target = back;

        self.state = PresenterState::Populating;
        self.swap_deadline = Some(now + self.swap_delay);
    }

    /// Adds results for the current query to the write target.
    ///
    /// The write target stays the same container across the swap, so results
    /// that arrive afterwards stream into the visible list.
    pub fn add_results(&mut self, results: Vec<SearchResult>) {
        if results.is_empty() {
            return;
        }
        self.containers[self.write_target].add_results(results);
    }

    /// Replaces the result view with `message` until the next query.
    pub fn show_error(&mut self, message: String) {
        self.error = Some(message);
        self.showing_results = false;
        if self.state == PresenterState::Visible {
            self.state = PresenterState::Idle;
        }
    }

    /// Swaps the front and back containers immediately.
    pub fn swap_now(&mut self) {
        self.swap_deadline = None;
        self.swap();
    }

    /// Swaps if the quiet period has elapsed. Returns whether it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.swap_deadline {
            Some(deadline) if now >= deadline => {
                self.swap_deadline = None;
                self.swap();
                true
            }
            _ => false,
        }
    }

    fn swap(&mut self) {
        self.art_requests.clear();
        self.front = 1 - self.front;

        self.showing_results = !self.query_empty && self.error.is_none();
        self.state = if self.showing_results {
            PresenterState::Visible
        } else {
            PresenterState::Idle
        };

        debug!(
            visible = self.front().len(),
            state = ?self.state,
            "result containers swapped"
        );
    }

    /// Regroups both containers, keeping their results.
    pub fn set_grouping(&mut self, grouping: Grouping) {
        self.art_requests.clear();
        for container in &mut self.containers {
            container.set_grouping(grouping);
        }
    }

    /// Marks `node` of the front container as loading art and returns the
    /// track to load it from.
    ///
    /// Returns `None` when covers are disabled, the node cannot show art, or a
    /// load is already underway.
    pub fn request_art(&mut self, node: NodeId) -> Option<SearchResult> {
        if !self.use_pretty_covers {
            return None;
        }

        let front = &mut self.containers[self.front];
        let entry = front.node_mut(node)?;
        if entry.loading_art {
            return None;
        }
        let NodeKind::Container(group_by) = entry.kind else {
            return None;
        };
        if !group_by.has_art() {
            return None;
        }
        entry.loading_art = true;

        front.first_leaf(node).cloned()
    }

    pub fn track_art_request(&mut self, id: ArtRequestId, node: NodeId) {
        self.art_requests.insert(id, node);
    }

    /// Applies loaded art if its request is still valid.
    pub fn art_loaded(&mut self, id: ArtRequestId, art: Option<Artwork>) {
        let Some(node) = self.art_requests.remove(&id) else {
            return;
        };
        if let Some(art) = art {
            if let Some(entry) = self.containers[self.front].node_mut(node) {
                entry.art = Some(art);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupBy, test_result};

    fn titles(container: &ResultContainer) -> Vec<String> {
        container.results().iter().map(|r| r.title.clone()).collect()
    }

    fn album_node(presenter: &ResultPresenter) -> NodeId {
        let front = presenter.front();
        front
            .rows()
            .into_iter()
            .find(|row| {
                matches!(
                    front.node(row.node).unwrap().kind,
                    NodeKind::Container(GroupBy::Album)
                )
            })
            .unwrap()
            .node
    }

    #[test]
    fn starts_idle_with_help() {
        let presenter = ResultPresenter::new(Grouping::default());
        assert_eq!(presenter.state(), PresenterState::Idle);
        assert!(matches!(presenter.panel(), Panel::Help(HELP_TEXT)));
    }

    #[test]
    fn results_become_visible_after_quiet_period() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());

        presenter.begin_query(false, start);
        presenter.add_results(vec![test_result(1, "A", "X", "Track A")]);
        assert_eq!(presenter.state(), PresenterState::Populating);
        assert!(presenter.front().is_empty());
        assert_eq!(titles(presenter.back()), vec!["Track A"]);

        assert!(!presenter.tick(start + Duration::from_millis(100)));
        assert!(presenter.tick(start + SWAP_MODELS_TIMEOUT));
        assert_eq!(presenter.state(), PresenterState::Visible);
        assert!(matches!(presenter.panel(), Panel::Results(c) if c.len() == 1));

        // Late batches stream into the visible container.
        presenter.add_results(vec![test_result(2, "A", "X", "Track B")]);
        assert_eq!(titles(presenter.front()), vec!["Track A", "Track B"]);
    }

    #[test]
    fn typing_restarts_the_timer() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());

        presenter.begin_query(false, start);
        presenter.begin_query(false, start + Duration::from_millis(200));
        assert!(!presenter.tick(start + Duration::from_millis(300)));
        assert!(presenter.tick(start + Duration::from_millis(450)));
    }

    #[test]
    fn front_is_untouched_while_populating() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());
        presenter.begin_query(false, start);
        presenter.add_results(vec![test_result(1, "A", "X", "old")]);
        presenter.swap_now();

        presenter.begin_query(false, start);
        presenter.add_results(vec![test_result(2, "A", "X", "new")]);
        assert_eq!(titles(presenter.front()), vec!["old"]);
        assert_eq!(titles(presenter.back()), vec!["new"]);

        presenter.swap_now();
        assert_eq!(titles(presenter.front()), vec!["new"]);
        assert!(!presenter.swap_pending());
    }

    #[test]
    fn empty_query_swaps_to_help() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());
        presenter.begin_query(true, start);
        presenter.tick(start + SWAP_MODELS_TIMEOUT);

        assert_eq!(presenter.state(), PresenterState::Idle);
        assert!(matches!(presenter.panel(), Panel::Help(_)));
    }

    #[test]
    fn error_replaces_results() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());
        presenter.begin_query(false, start);
        presenter.add_results(vec![test_result(1, "A", "X", "one")]);
        presenter.swap_now();

        presenter.show_error("catalogue unavailable".to_string());
        assert_eq!(presenter.state(), PresenterState::Idle);
        assert!(matches!(presenter.panel(), Panel::Error("catalogue unavailable")));

        presenter.begin_query(false, start);
        assert!(presenter.error().is_none());
    }

    #[test]
    fn error_while_populating_lands_idle() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());
        presenter.begin_query(false, start);
        presenter.show_error("boom".to_string());
        assert_eq!(presenter.state(), PresenterState::Populating);

        presenter.tick(start + SWAP_MODELS_TIMEOUT);
        assert_eq!(presenter.state(), PresenterState::Idle);
        assert!(matches!(presenter.panel(), Panel::Error("boom")));
    }

    #[test]
    fn art_requests_are_cleared_by_swap_and_regroup() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());
        presenter.begin_query(false, start);
        presenter.add_results(vec![test_result(1, "A", "X", "one")]);
        presenter.swap_now();

        let node = album_node(&presenter);
        let source = presenter.request_art(node).unwrap();
        assert_eq!(source.title, "one");
        assert!(presenter.request_art(node).is_none());
        presenter.track_art_request(ArtRequestId(1), node);
        assert_eq!(presenter.pending_art_requests(), 1);

        presenter.set_grouping(Grouping::default());
        assert_eq!(presenter.pending_art_requests(), 0);

        let node = album_node(&presenter);
        presenter.request_art(node).unwrap();
        presenter.track_art_request(ArtRequestId(2), node);
        presenter.begin_query(false, start);
        presenter.swap_now();
        assert_eq!(presenter.pending_art_requests(), 0);

        // A response for a dropped request changes nothing.
        presenter.art_loaded(
            ArtRequestId(2),
            Some(Artwork {
                mime_type: None,
                data: vec![1],
            }),
        );
        assert!(presenter.front().rows().iter().all(|row| {
            presenter.front().node(row.node).unwrap().art.is_none()
        }));
    }

    #[test]
    fn loaded_art_is_attached_to_front_node() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());
        presenter.begin_query(false, start);
        presenter.add_results(vec![test_result(1, "A", "X", "one")]);
        presenter.swap_now();

        let node = album_node(&presenter);
        presenter.request_art(node).unwrap();
        presenter.track_art_request(ArtRequestId(7), node);
        presenter.art_loaded(
            ArtRequestId(7),
            Some(Artwork {
                mime_type: Some("image/png".into()),
                data: vec![0x89],
            }),
        );

        assert!(presenter.front().node(node).unwrap().art.is_some());
        assert_eq!(presenter.pending_art_requests(), 0);
    }

    #[test]
    fn art_is_only_requested_for_albums_with_covers_enabled() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());
        presenter.begin_query(false, start);
        presenter.add_results(vec![test_result(1, "A", "X", "one")]);
        presenter.swap_now();

        let artist = presenter.front().rows()[1].node;
        assert!(presenter.request_art(artist).is_none());

        presenter.set_use_pretty_covers(false);
        let album = album_node(&presenter);
        assert!(presenter.request_art(album).is_none());
    }

    #[test]
    fn art_is_requested_for_album_artist_containers() {
        let start = Instant::now();
        let grouping = Grouping::new(GroupBy::AlbumArtist, GroupBy::None, GroupBy::None);
        let mut presenter = ResultPresenter::new(grouping);
        presenter.begin_query(false, start);
        presenter.add_results(vec![test_result(1, "A", "X", "one")]);
        presenter.swap_now();

        let front = presenter.front();
        let node = front
            .rows()
            .into_iter()
            .find(|row| {
                matches!(
                    front.node(row.node).unwrap().kind,
                    NodeKind::Container(GroupBy::AlbumArtist)
                )
            })
            .unwrap()
            .node;

        let track = presenter.request_art(node).unwrap();
        assert_eq!(track.title, "one");
        assert!(presenter.front().node(node).unwrap().loading_art);
        assert!(presenter.request_art(node).is_none());
    }

    #[test]
    fn regroup_while_populating_keeps_back_results() {
        let start = Instant::now();
        let mut presenter = ResultPresenter::new(Grouping::default());
        presenter.begin_query(false, start);
        presenter.add_results(vec![
            test_result(1, "A", "X", "one"),
            test_result(2, "B", "Y", "two"),
        ]);

        let grouping = Grouping::new(GroupBy::Album, GroupBy::None, GroupBy::None);
        presenter.set_grouping(grouping);
        assert_eq!(presenter.back().len(), 2);
        assert_eq!(presenter.back().grouping(), grouping);
        assert_eq!(presenter.front().grouping(), grouping);
        assert_eq!(presenter.state(), PresenterState::Populating);
    }
}
