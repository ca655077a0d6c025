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

//! Event routing for the search view.
//!
//! This module maps keyboard input to search field editing, result list
//! navigation and playlist export.

use std::{sync::mpsc::Sender, time::Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tui_input::backend::crossterm::EventHandler;

use crate::{
    components::{SearchFocus, SearchView},
    events::AppEvent,
    playlist::Placement,
    search::SearchEngine,
};

impl<E: SearchEngine> SearchView<E> {
    pub fn process_key(
        &mut self,
        key: KeyEvent,
        now: Instant,
        event_tx: &Sender<AppEvent>,
    ) -> Result<()> {
        // Bindings that work in both the search field and the result list
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => return self.export(Placement::Append, event_tx),
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                return self.export(Placement::Replace, event_tx);
            }
            (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                return self.export(Placement::OpenInNew, event_tx);
            }
            (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                return self.export(Placement::Enqueue, event_tx);
            }
            (KeyCode::Char('f'), KeyModifiers::CONTROL) => {
                self.search_for_this(now);
                return Ok(());
            }
            (KeyCode::Tab, _) => return self.set_search_by(self.search_by().toggle(), now),
            (KeyCode::Char('g'), KeyModifiers::CONTROL) => {
                return self.set_grouping(self.grouping().next_preset());
            }
            (KeyCode::Esc, _) => {
                self.clear_search(now);
                return Ok(());
            }
            _ => {}
        }

        match self.focus {
            SearchFocus::Search => self.process_search_field_key(key, now),
            SearchFocus::Results => self.process_result_list_key(key, now),
        }
        Ok(())
    }

    fn process_search_field_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Down => self.focus_results((!self.rows().is_empty()).then_some(0)),
            KeyCode::Up => self.focus_results(self.rows().len().checked_sub(1)),
            _ => self.edit(key, now),
        }
    }

    fn process_result_list_key(&mut self, key: KeyEvent, now: Instant) {
        let len = self.rows().len();
        match (key.code, key.modifiers) {
            (KeyCode::Down, _) => {
                let next = self.list_state.selected().map_or(0, |i| i + 1);
                if next < len {
                    self.list_state.select(Some(next));
                }
            }
            (KeyCode::Up, _) => match self.list_state.selected() {
                Some(i) if i > 0 => self.list_state.select(Some(i - 1)),
                _ => self.focus_search(),
            },
            (KeyCode::PageDown, _) => {
                let page = self.visible.len().max(1);
                let next = self.list_state.selected().map_or(0, |i| i + page);
                self.list_state.select(len.checked_sub(1).map(|last| next.min(last)));
            }
            (KeyCode::PageUp, _) => {
                let page = self.visible.len().max(1);
                let previous = self.list_state.selected().map_or(0, |i| i.saturating_sub(page));
                self.list_state.select(Some(previous).filter(|_| len > 0));
            }
            (KeyCode::Char(' '), _) => {
                self.toggle_mark_current();
                let next = self.list_state.selected().map_or(0, |i| i + 1);
                if next < len {
                    self.list_state.select(Some(next));
                }
            }
            (KeyCode::Char(_), modifiers)
                if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.focus_search();
                self.edit(key, now);
            }
            (KeyCode::Backspace, _) => {
                self.focus_search();
                self.edit(key, now);
            }
            _ => {}
        }
    }

    /// Forwards `key` to the text field and starts a query if the text
    /// changed.
    fn edit(&mut self, key: KeyEvent, now: Instant) {
        let before = self.input.value().to_string();
        self.input.handle_event(&Event::Key(key));
        if self.input.value() != before {
            self.text_edited(now);
        }
    }

    fn clear_search(&mut self, now: Instant) {
        self.focus_search();
        if !self.query().is_empty() {
            self.input.reset();
            self.text_edited(now);
        }
    }

    fn export(&mut self, placement: Placement, event_tx: &Sender<AppEvent>) -> Result<()> {
        if let Some(bundle) = self.selected_bundle(placement) {
            event_tx.send(AppEvent::AddToPlaylist(bundle))?;
            self.marked.clear();
        }
        Ok(())
    }

    fn toggle_mark_current(&mut self) {
        let rows = self.rows();
        let Some(row) = self.list_state.selected().and_then(|i| rows.get(i)) else {
            return;
        };
        if !self.is_selectable(row.node) {
            return;
        }
        if !self.marked.remove(&row.node) {
            self.marked.insert(row.node);
        }
    }

    fn focus_results(&mut self, row: Option<usize>) {
        if row.is_none() {
            return;
        }
        self.focus = SearchFocus::Results;
        self.list_state.select(row);
    }

    fn focus_search(&mut self) {
        self.focus = SearchFocus::Search;
        self.list_state.select(None);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::{
        components::search::tests::{jazz, view},
        search::SearchEvent,
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_issues_a_search_per_edit() {
        let (_dir, mut view) = view();
        let (tx, _rx) = mpsc::channel();
        let now = Instant::now();

        for c in "abc".chars() {
            view.process_key(key(KeyCode::Char(c)), now, &tx).unwrap();
        }

        let engine = view.dispatcher().engine();
        let queries: Vec<_> = engine.searches.iter().map(|s| s.1.as_str()).collect();
        assert_eq!(queries, vec!["a", "ab", "abc"]);
        assert_eq!(engine.cancelled.len(), 2);
    }

    #[test]
    fn navigation_marking_and_export() {
        let (_dir, mut view) = view();
        let (tx, rx) = mpsc::channel();
        let now = Instant::now();

        view.start_search("jazz", now);
        let id = view.dispatcher().last_search_id().unwrap();
        view.handle_search_event(SearchEvent::Results(id, jazz()));

        view.process_key(key(KeyCode::Down), now, &tx).unwrap();
        assert_eq!(view.focus(), SearchFocus::Results);
        assert_eq!(view.cursor(), Some(0));

        // Row 0 is a divider and cannot be marked; row 1 is "John Coltrane".
        view.process_key(key(KeyCode::Char(' ')), now, &tx).unwrap();
        assert_eq!(view.marked_count(), 0);
        view.process_key(key(KeyCode::Char(' ')), now, &tx).unwrap();
        assert_eq!(view.marked_count(), 1);

        view.process_key(ctrl('n'), now, &tx).unwrap();
        match rx.try_recv() {
            Ok(AppEvent::AddToPlaylist(bundle)) => {
                assert_eq!(bundle.placement, Placement::OpenInNew);
                assert_eq!(bundle.results.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(view.marked_count(), 0);
    }

    #[test]
    fn printable_keys_in_results_return_to_search_field() {
        let (_dir, mut view) = view();
        let (tx, _rx) = mpsc::channel();
        let now = Instant::now();

        view.start_search("blue", now);
        let id = view.dispatcher().last_search_id().unwrap();
        view.handle_search_event(SearchEvent::Results(id, jazz()));
        view.process_key(key(KeyCode::Down), now, &tx).unwrap();

        view.process_key(key(KeyCode::Char('s')), now, &tx).unwrap();
        assert_eq!(view.focus(), SearchFocus::Search);
        assert_eq!(view.query(), "blues");
    }

    #[test]
    fn escape_clears_the_search() {
        let (_dir, mut view) = view();
        let (tx, _rx) = mpsc::channel();
        let now = Instant::now();

        view.start_search("blue", now);
        view.process_key(key(KeyCode::Esc), now, &tx).unwrap();

        assert_eq!(view.query(), "");
        assert_eq!(view.dispatcher().last_search_id(), None);
    }

    #[test]
    fn tab_toggles_search_mode() {
        let (_dir, mut view) = view();
        let (tx, _rx) = mpsc::channel();
        view.process_key(key(KeyCode::Tab), Instant::now(), &tx).unwrap();
        assert_eq!(view.search_by(), crate::model::SearchBy::Albums);
    }
}
