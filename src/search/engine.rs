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

//! Search engine seam.
//!
//! The search view only depends on [`SearchEngine`]. The production engine,
//! [`CatalogSearchEngine`], forwards work to the task worker thread which owns
//! the catalogue database; responses come back to the main loop as
//! [`SearchEvent`](crate::search::SearchEvent)s.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, mpsc::Sender},
};

use tracing::{debug, warn};

use crate::{
    model::{SearchBy, SearchResult},
    search::{ArtRequestId, SearchId},
    tasks::AppTask,
};

/// Asynchronous search backend.
///
/// Implementations must never deliver a response before the call that issued
/// its id has returned; responses are queued, not invoked inline.
pub trait SearchEngine {
    /// Starts a search and returns the id its responses will carry.
    fn search_async(&mut self, query: &str, search_by: SearchBy) -> SearchId;

    /// Asks the engine to stop working on `id`. Best effort: responses may
    /// still arrive.
    fn cancel_search(&mut self, id: SearchId);

    /// Starts loading cover art for the album `result` belongs to.
    fn load_art_async(&mut self, result: &SearchResult) -> ArtRequestId;
}

/// Searches still wanted by the engine's client.
///
/// Shared with the task worker, which checks it before and while running a
/// search. Ids leave the set on cancellation or completion.
#[derive(Debug, Clone, Default)]
pub struct InFlightSearches(Arc<Mutex<HashSet<SearchId>>>);

impl InFlightSearches {
    fn lock(&self) -> MutexGuard<'_, HashSet<SearchId>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, id: SearchId) {
        self.lock().insert(id);
    }

    pub fn contains(&self, id: SearchId) -> bool {
        self.lock().contains(&id)
    }

    /// Returns `true` if `id` was still in flight.
    pub fn remove(&self, id: SearchId) -> bool {
        self.lock().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Engine backed by the local catalogue database.
pub struct CatalogSearchEngine {
    task_tx: Sender<AppTask>,
    in_flight: InFlightSearches,
    next_search_id: SearchId,
    next_art_id: ArtRequestId,
}

impl CatalogSearchEngine {
    pub fn new(task_tx: Sender<AppTask>, in_flight: InFlightSearches) -> Self {
        Self {
            task_tx,
            in_flight,
            next_search_id: SearchId(1),
            next_art_id: ArtRequestId(1),
        }
    }
}

impl SearchEngine for CatalogSearchEngine {
    fn search_async(&mut self, query: &str, search_by: SearchBy) -> SearchId {
        let id = self.next_search_id;
        self.next_search_id = id.next();

        self.in_flight.insert(id);
        let task = AppTask::Search {
            id,
            query: query.to_string(),
            search_by,
        };
        if self.task_tx.send(task).is_err() {
            warn!(%id, "task worker has gone away, search dropped");
            self.in_flight.remove(id);
        }

        id
    }

    fn cancel_search(&mut self, id: SearchId) {
        if self.in_flight.remove(id) {
            debug!(%id, "search cancelled");
        }
    }

    fn load_art_async(&mut self, result: &SearchResult) -> ArtRequestId {
        let id = self.next_art_id;
        self.next_art_id = id.next();

        let task = AppTask::LoadArt {
            id,
            filename: result.filename.clone(),
        };
        if self.task_tx.send(task).is_err() {
            warn!(art_id = id.0, "task worker has gone away, art load dropped");
        }

        id
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records calls instead of searching.
    #[derive(Debug, Default)]
    pub(crate) struct FakeEngine {
        pub(crate) searches: Vec<(SearchId, String, SearchBy)>,
        pub(crate) cancelled: Vec<SearchId>,
        pub(crate) art_requests: Vec<(ArtRequestId, SearchResult)>,
        next_id: u32,
        next_art_id: u32,
    }

    impl SearchEngine for FakeEngine {
        fn search_async(&mut self, query: &str, search_by: SearchBy) -> SearchId {
            self.next_id += 1;
            let id = SearchId(self.next_id);
            self.searches.push((id, query.to_string(), search_by));
            id
        }

        fn cancel_search(&mut self, id: SearchId) {
            self.cancelled.push(id);
        }

        fn load_art_async(&mut self, result: &SearchResult) -> ArtRequestId {
            self.next_art_id += 1;
            let id = ArtRequestId(self.next_art_id);
            self.art_requests.push((id, result.clone()));
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::model::test_result;

    #[test]
    fn search_posts_task_and_tracks_in_flight() {
        let (task_tx, task_rx) = mpsc::channel();
        let in_flight = InFlightSearches::default();
        let mut engine = CatalogSearchEngine::new(task_tx, in_flight.clone());

        let first = engine.search_async("jazz", SearchBy::Songs);
        let second = engine.search_async("jazz piano", SearchBy::Albums);
        assert_eq!(second, first.next());
        assert!(in_flight.contains(first));

        engine.cancel_search(first);
        engine.cancel_search(first);
        assert!(!in_flight.contains(first));
        assert!(in_flight.contains(second));

        match task_rx.recv().unwrap() {
            AppTask::Search { id, query, search_by } => {
                assert_eq!(id, first);
                assert_eq!(query, "jazz");
                assert_eq!(search_by, SearchBy::Songs);
            }
            other => panic!("unexpected task {other:?}"),
        }
    }

    #[test]
    fn art_ids_are_independent_of_search_ids() {
        let (task_tx, task_rx) = mpsc::channel();
        let mut engine = CatalogSearchEngine::new(task_tx, InFlightSearches::default());

        engine.search_async("a", SearchBy::Songs);
        engine.search_async("b", SearchBy::Songs);
        let art = engine.load_art_async(&test_result(1, "A", "B", "C"));
        assert_eq!(art, ArtRequestId(1));

        let tasks: Vec<AppTask> = task_rx.try_iter().collect();
        assert!(matches!(tasks.last(), Some(AppTask::LoadArt { .. })));
    }

    #[test]
    fn closed_worker_does_not_leave_searches_in_flight() {
        let (task_tx, task_rx) = mpsc::channel();
        drop(task_rx);
        let in_flight = InFlightSearches::default();
        let mut engine = CatalogSearchEngine::new(task_tx, in_flight.clone());

        engine.search_async("a", SearchBy::Songs);
        assert!(in_flight.is_empty());
    }
}
