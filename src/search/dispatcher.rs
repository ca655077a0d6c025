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

//! Query dispatch and response correlation.

use tracing::debug;

use crate::{
    model::{SearchBy, SearchResult},
    search::{SearchEngine, SearchId},
};

/// Issues searches on behalf of the search view and decides which responses
/// are still wanted.
///
/// Only the most recently issued search is current. Responses carrying any
/// other id are dropped, whether or not the engine honoured the cancellation.
pub struct QueryDispatcher<E> {
    engine: E,
    last_search_id: Option<SearchId>,
}

impl<E: SearchEngine> QueryDispatcher<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            last_search_id: None,
        }
    }

    /// Cancels the previous search and starts one for the trimmed `text`.
    ///
    /// Returns `None` without touching the engine when `text` is blank.
    pub fn submit(&mut self, text: &str, search_by: SearchBy) -> Option<SearchId> {
        if let Some(previous) = self.last_search_id.take() {
            self.engine.cancel_search(previous);
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let id = self.engine.search_async(trimmed, search_by);
        debug!(%id, query = trimmed, %search_by, "search issued");
        self.last_search_id = Some(id);
        Some(id)
    }

    pub fn last_search_id(&self) -> Option<SearchId> {
        self.last_search_id
    }

    pub fn is_current(&self, id: SearchId) -> bool {
        self.last_search_id == Some(id)
    }

    /// Passes `results` through if they belong to the current search.
    pub fn accept_results(
        &self,
        id: SearchId,
        results: Vec<SearchResult>,
    ) -> Option<Vec<SearchResult>> {
        if !self.is_current(id) {
            debug!(%id, count = results.len(), "dropping stale results");
            return None;
        }
        if results.is_empty() {
            return None;
        }
        Some(results)
    }

    /// Passes `message` through if it belongs to the current search.
    pub fn accept_error(&self, id: SearchId, message: String) -> Option<String> {
        if !self.is_current(id) {
            debug!(%id, %message, "dropping stale search error");
            return None;
        }
        Some(message)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::test_result, search::engine::testing::FakeEngine};

    #[test]
    fn blank_queries_do_not_reach_the_engine() {
        let mut dispatcher = QueryDispatcher::new(FakeEngine::default());
        for _ in 0..3 {
            assert_eq!(dispatcher.submit("   ", SearchBy::Songs), None);
        }
        assert!(dispatcher.engine().searches.is_empty());
        assert!(dispatcher.engine().cancelled.is_empty());
    }

    #[test]
    fn new_search_cancels_previous() {
        let mut dispatcher = QueryDispatcher::new(FakeEngine::default());
        let first = dispatcher.submit("a", SearchBy::Songs).unwrap();
        let second = dispatcher.submit(" ab ", SearchBy::Albums).unwrap();

        assert_ne!(first, second);
        assert_eq!(dispatcher.engine().cancelled, vec![first]);
        assert_eq!(
            dispatcher.engine().searches,
            vec![
                (first, "a".to_string(), SearchBy::Songs),
                (second, "ab".to_string(), SearchBy::Albums)
            ]
        );
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut dispatcher = QueryDispatcher::new(FakeEngine::default());
        let first = dispatcher.submit("a", SearchBy::Songs).unwrap();
        let second = dispatcher.submit("ab", SearchBy::Songs).unwrap();

        let song = test_result(1, "Artist", "Album", "Song X");
        assert!(dispatcher.accept_results(first, vec![song.clone()]).is_none());
        assert!(dispatcher.accept_error(first, "boom".into()).is_none());
        assert_eq!(
            dispatcher.accept_results(second, vec![song.clone()]),
            Some(vec![song])
        );
        assert!(dispatcher.accept_results(second, vec![]).is_none());
    }

    #[test]
    fn clearing_the_query_makes_everything_stale() {
        let mut dispatcher = QueryDispatcher::new(FakeEngine::default());
        let id = dispatcher.submit("jazz", SearchBy::Songs).unwrap();
        assert_eq!(dispatcher.submit("", SearchBy::Songs), None);

        assert_eq!(dispatcher.engine().cancelled, vec![id]);
        assert!(!dispatcher.is_current(id));
        assert!(dispatcher.accept_error(id, "late".into()).is_none());
    }
}
