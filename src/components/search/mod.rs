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

//! The search view.
//!
//! Ties together the text field, a [`QueryDispatcher`] and a
//! [`ResultPresenter`]. Every edit of the search text starts a new query;
//! results are collected out of sight and shown once typing pauses. Rows of
//! the visible results can be marked and exported to a playlist as a
//! [`PlaylistBundle`].

mod event;
mod render;

use std::{collections::HashSet, ops::Range, time::Instant};

use anyhow::Result;
use ratatui::widgets::ListState;
use tracing::debug;
use tui_input::Input;

use crate::{
    config::SettingsHandle,
    model::{Grouping, SearchBy},
    playlist::{Placement, PlaylistBundle},
    search::{
        NodeId, NodeKind, Panel, QueryDispatcher, ResultPresenter, Row, SearchEngine, SearchEvent,
    },
};

/// Which part of the view receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFocus {
    #[default]
    Search,
    Results,
}

pub struct SearchView<E> {
    dispatcher: QueryDispatcher<E>,
    presenter: ResultPresenter,
    settings: SettingsHandle,
    search_by: SearchBy,
    input: Input,
    focus: SearchFocus,
    list_state: ListState,
    marked: HashSet<NodeId>,
    visible: Range<usize>,
}

impl<E: SearchEngine> SearchView<E> {
    pub fn new(engine: E, settings: SettingsHandle) -> Self {
        let search = settings.borrow().config().search;

        let mut presenter = ResultPresenter::new(search.grouping);
        presenter.set_use_pretty_covers(search.pretty_covers);

        Self {
            dispatcher: QueryDispatcher::new(engine),
            presenter,
            settings,
            search_by: search.search_by,
            input: Input::default(),
            focus: SearchFocus::Search,
            list_state: ListState::default(),
            marked: HashSet::new(),
            visible: 0..0,
        }
    }

    pub fn query(&self) -> &str {
        self.input.value()
    }

    pub fn search_by(&self) -> SearchBy {
        self.search_by
    }

    pub fn grouping(&self) -> Grouping {
        self.presenter.grouping()
    }

    pub fn focus(&self) -> SearchFocus {
        self.focus
    }

    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    pub fn dispatcher(&self) -> &QueryDispatcher<E> {
        &self.dispatcher
    }

    /// Row index of the cursor in the result list.
    pub fn cursor(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    /// Starts a query for the current text; results appear once input has
    /// been quiet for the swap delay.
    pub fn text_edited(&mut self, now: Instant) {
        let text = self.input.value();
        self.presenter.begin_query(text.trim().is_empty(), now);
        self.dispatcher.submit(text, self.search_by);
    }

    /// Replaces the search text with `query` and shows its results without
    /// waiting.
    pub fn start_search(&mut self, query: &str, now: Instant) {
        self.input = Input::new(query.to_string());
        self.focus = SearchFocus::Search;
        self.text_edited(now);
        self.presenter.swap_now();
        self.reset_selection();
    }

    /// Runs the current text again, if there is any.
    pub fn refresh(&mut self, now: Instant) {
        if !self.query().trim().is_empty() {
            self.text_edited(now);
        }
    }

    /// Applies an engine response, ignoring anything from a superseded search.
    pub fn handle_search_event(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::Results(id, results) => {
                if let Some(results) = self.dispatcher.accept_results(id, results) {
                    self.presenter.add_results(results);
                }
            }
            SearchEvent::Error(id, message) => {
                if let Some(message) = self.dispatcher.accept_error(id, message) {
                    self.presenter.show_error(message);
                }
            }
            SearchEvent::ArtLoaded(id, art) => self.presenter.art_loaded(id, art),
        }
    }

    /// Advances the swap timer. Returns whether the visible results changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let swapped = self.presenter.tick(now);
        if swapped {
            self.reset_selection();
        }
        swapped
    }

    /// Regroups the results in place and saves the grouping.
    pub fn set_grouping(&mut self, grouping: Grouping) -> Result<()> {
        self.apply_grouping(grouping);
        self.settings
            .borrow_mut()
            .update(|config| config.search.grouping = grouping)
    }

    /// Saves the search mode, then runs the current text again with it.
    pub fn set_search_by(&mut self, search_by: SearchBy, now: Instant) -> Result<()> {
        let saved = self
            .settings
            .borrow_mut()
            .update(|config| config.search.search_by = search_by);
        self.search_by = search_by;
        self.refresh(now);
        saved
    }

    pub fn set_pretty_covers(&mut self, enabled: bool) -> Result<()> {
        self.presenter.set_use_pretty_covers(enabled);
        self.settings
            .borrow_mut()
            .update(|config| config.search.pretty_covers = enabled)
    }

    /// Re-reads the settings file and applies any search preferences that
    /// changed.
    pub fn reload_settings(&mut self, now: Instant) -> Result<()> {
        self.settings.borrow_mut().reload()?;
        let search = self.settings.borrow().config().search;

        self.presenter.set_use_pretty_covers(search.pretty_covers);
        if search.grouping != self.grouping() {
            self.apply_grouping(search.grouping);
        }
        if search.search_by != self.search_by {
            self.search_by = search.search_by;
            self.refresh(now);
        }
        debug!(search_by = %self.search_by, grouping = %self.grouping(), "search settings applied");
        Ok(())
    }

    /// Requests art for album rows currently on screen.
    pub fn load_visible_art(&mut self) {
        let rows = self.rows();
        let end = self.visible.end.min(rows.len());
        let start = self.visible.start.min(end);
        for row in &rows[start..end] {
            if let Some(result) = self.presenter.request_art(row.node) {
                let id = self.dispatcher.engine_mut().load_art_async(&result);
                self.presenter.track_art_request(id, row.node);
            }
        }
    }

    /// The tracks an export acts on: marked rows, else the cursor row, else
    /// the first row with tracks. `None` when there is nothing to export.
    pub fn selected_bundle(&self, placement: Placement) -> Option<PlaylistBundle> {
        let Panel::Results(front) = self.presenter.panel() else {
            return None;
        };

        let rows = self.rows();
        let nodes = match self.selected_nodes(&rows) {
            nodes if !nodes.is_empty() => nodes,
            _ => rows
                .iter()
                .map(|row| row.node)
                .find(|node| self.is_selectable(*node))
                .into_iter()
                .collect(),
        };

        let results = front.child_results(&nodes);
        if results.is_empty() {
            return None;
        }
        Some(PlaylistBundle { results, placement })
    }

    /// Searches for what the single selected row stands for. Returns whether
    /// a search was started.
    pub fn search_for_this(&mut self, now: Instant) -> bool {
        let rows = self.rows();
        let text = match self.selected_nodes(&rows).as_slice() {
            [node] => self.search_text(*node),
            _ => None,
        };
        match text {
            Some(text) => {
                self.start_search(&text, now);
                true
            }
            None => false,
        }
    }

    /// Containers search for their underlying value, without any year prefix.
    fn search_text(&self, id: NodeId) -> Option<String> {
        let front = self.presenter.front();
        let node = front.node(id)?;
        let from_result = match node.kind {
            NodeKind::Container(group_by) => {
                front.first_leaf(id).and_then(|r| group_by.search_text(r))
            }
            _ => None,
        };
        Some(from_result.unwrap_or_else(|| node.text.clone()))
    }

    /// Rows of the result list, empty while help or an error is shown.
    fn rows(&self) -> Vec<Row> {
        match self.presenter.panel() {
            Panel::Results(front) => front.rows(),
            _ => Vec::new(),
        }
    }

    /// Marked rows in display order, or the cursor row.
    fn selected_nodes(&self, rows: &[Row]) -> Vec<NodeId> {
        if !self.marked.is_empty() {
            return rows
                .iter()
                .map(|row| row.node)
                .filter(|node| self.marked.contains(node))
                .collect();
        }

        self.list_state
            .selected()
            .and_then(|idx| rows.get(idx))
            .map(|row| row.node)
            .filter(|node| self.is_selectable(*node))
            .into_iter()
            .collect()
    }

    fn is_selectable(&self, node: NodeId) -> bool {
        self.presenter
            .front()
            .node(node)
            .is_some_and(|n| !matches!(n.kind, NodeKind::Divider))
    }

    fn apply_grouping(&mut self, grouping: Grouping) {
        self.presenter.set_grouping(grouping);
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        self.marked.clear();
        if self.focus == SearchFocus::Results {
            self.list_state.select(Some(0));
        } else {
            self.list_state.select(None);
        }
        *self.list_state.offset_mut() = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::{ConfigLocation, Settings},
        model::{GroupBy, SearchResult, test_result},
        search::{PresenterState, SearchId, engine::testing::FakeEngine},
    };

    const LATER: Duration = Duration::from_millis(300);

    pub(super) fn view() -> (TempDir, SearchView<FakeEngine>) {
        let dir = tempfile::tempdir().unwrap();
        let settings =
            Settings::load(ConfigLocation::Path(dir.path().join("quaver.toml"))).into_handle();
        (dir, SearchView::new(FakeEngine::default(), settings))
    }

    pub(super) fn jazz() -> Vec<SearchResult> {
        vec![
            test_result(1, "Miles Davis", "Kind of Blue", "So What"),
            test_result(2, "Miles Davis", "Kind of Blue", "Blue in Green"),
            test_result(3, "John Coltrane", "Blue Train", "Blue Train"),
        ]
    }

    fn current_id(view: &SearchView<FakeEngine>) -> SearchId {
        view.dispatcher().last_search_id().unwrap()
    }

    #[test]
    fn typing_shows_results_after_quiet_period() {
        let (_dir, mut view) = view();
        let now = Instant::now();

        view.input = Input::new("jazz".into());
        view.text_edited(now);
        let id = current_id(&view);
        view.handle_search_event(SearchEvent::Results(id, jazz()));

        assert!(!view.tick(now + Duration::from_millis(100)));
        assert_eq!(view.presenter().state(), PresenterState::Populating);

        assert!(view.tick(now + LATER));
        assert_eq!(view.presenter().state(), PresenterState::Visible);
        assert_eq!(view.presenter().front().len(), 3);
    }

    #[test]
    fn stale_results_are_ignored() {
        let (_dir, mut view) = view();
        let now = Instant::now();

        view.start_search("blue", now);
        let stale = current_id(&view);
        view.start_search("train", now);

        view.handle_search_event(SearchEvent::Results(stale, jazz()));
        assert!(view.presenter().front().is_empty());
    }

    #[test]
    fn start_search_swaps_immediately() {
        let (_dir, mut view) = view();
        view.start_search("jazz", Instant::now());
        assert_eq!(view.query(), "jazz");
        assert!(!view.presenter().swap_pending());
        assert_eq!(view.presenter().state(), PresenterState::Visible);
    }

    #[test]
    fn search_by_change_reruns_query_and_persists() {
        let (_dir, mut view) = view();
        let now = Instant::now();
        view.start_search("blue", now);

        view.set_search_by(SearchBy::Albums, now).unwrap();

        let searches = &view.dispatcher().engine().searches;
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[1].1, "blue");
        assert_eq!(searches[1].2, SearchBy::Albums);
        assert_eq!(
            view.settings.borrow().config().search.search_by,
            SearchBy::Albums
        );
    }

    #[test]
    fn selected_bundle_prefers_marks_then_cursor_then_first_row() {
        let (_dir, mut view) = view();
        view.start_search("jazz", Instant::now());
        let id = current_id(&view);
        view.handle_search_event(SearchEvent::Results(id, jazz()));

        // Nothing selected: first non-divider row, the "John Coltrane" artist.
        let bundle = view.selected_bundle(Placement::Append).unwrap();
        let titles: Vec<_> = bundle.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Blue Train"]);

        let rows = view.rows();
        let miles = rows
            .iter()
            .position(|row| view.presenter().front().node(row.node).unwrap().text == "Miles Davis")
            .unwrap();
        view.list_state.select(Some(miles));
        let bundle = view.selected_bundle(Placement::Replace).unwrap();
        assert_eq!(bundle.results.len(), 2);
        assert_eq!(bundle.placement, Placement::Replace);

        view.marked.insert(rows[0].node);
        view.marked.insert(rows[miles].node);
        let bundle = view.selected_bundle(Placement::Append).unwrap();
        assert_eq!(bundle.results.len(), 2);
    }

    #[test]
    fn nothing_to_export_without_results() {
        let (_dir, view) = view();
        assert!(view.selected_bundle(Placement::Append).is_none());
    }

    #[test]
    fn search_for_this_uses_single_selected_row() {
        let (_dir, mut view) = view();
        let now = Instant::now();
        view.start_search("blue", now);
        let id = current_id(&view);
        view.handle_search_event(SearchEvent::Results(id, jazz()));

        assert!(!view.search_for_this(now));

        let rows = view.rows();
        let album = rows
            .iter()
            .position(|row| view.presenter().front().node(row.node).unwrap().text == "Kind of Blue")
            .unwrap();
        view.list_state.select(Some(album));

        assert!(view.search_for_this(now));
        assert_eq!(view.query(), "Kind of Blue");
        assert_eq!(view.dispatcher().engine().searches.last().unwrap().1, "Kind of Blue");
    }

    #[test]
    fn search_for_this_drops_year_from_albums() {
        let (_dir, mut view) = view();
        let now = Instant::now();
        view.set_grouping(Grouping::new(GroupBy::YearAlbum, GroupBy::None, GroupBy::None))
            .unwrap();
        view.start_search("blue", now);
        let id = current_id(&view);
        let mut results = jazz();
        results[0].year = Some(1959);
        view.handle_search_event(SearchEvent::Results(id, results));

        let rows = view.rows();
        let album = rows
            .iter()
            .position(|row| {
                view.presenter().front().node(row.node).unwrap().text == "1959 - Kind of Blue"
            })
            .unwrap();
        view.list_state.select(Some(album));

        assert!(view.search_for_this(now));
        assert_eq!(view.query(), "Kind of Blue");
    }

    #[test]
    fn grouping_change_keeps_results_and_clears_marks() {
        let (_dir, mut view) = view();
        view.start_search("jazz", Instant::now());
        let id = current_id(&view);
        view.handle_search_event(SearchEvent::Results(id, jazz()));
        let first = view.rows()[0].node;
        view.marked.insert(first);

        let grouping = Grouping::new(GroupBy::Album, GroupBy::None, GroupBy::None);
        view.set_grouping(grouping).unwrap();

        assert_eq!(view.marked_count(), 0);
        assert_eq!(view.grouping(), grouping);
        assert_eq!(view.presenter().front().len(), 3);
        assert_eq!(view.settings.borrow().config().search.grouping, grouping);
    }

    #[test]
    fn visible_album_rows_request_art_once() {
        let (_dir, mut view) = view();
        view.start_search("jazz", Instant::now());
        let id = current_id(&view);
        view.handle_search_event(SearchEvent::Results(id, jazz()));
        view.visible = 0..view.rows().len();

        view.load_visible_art();
        view.load_visible_art();

        assert_eq!(view.dispatcher().engine().art_requests.len(), 2);
        assert_eq!(view.presenter().pending_art_requests(), 2);
    }

    #[test]
    fn reload_applies_external_changes() {
        let (dir, mut view) = view();
        let now = Instant::now();
        view.start_search("blue", now);

        let mut other = Settings::load(ConfigLocation::Path(dir.path().join("quaver.toml")));
        other
            .update(|c| {
                c.search.search_by = SearchBy::Albums;
                c.search.grouping = Grouping::new(GroupBy::Genre, GroupBy::None, GroupBy::None);
            })
            .unwrap();

        view.reload_settings(now).unwrap();
        assert_eq!(view.search_by(), SearchBy::Albums);
        assert_eq!(view.grouping().first, GroupBy::Genre);
        assert_eq!(view.dispatcher().engine().searches.len(), 2);
    }
}
