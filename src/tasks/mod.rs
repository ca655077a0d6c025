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

//! Asynchronous application task processing.
//!
//! This module implements the command pattern used to offload blocking work
//! (catalogue queries, artwork extraction, library scans) from the main UI
//! thread. A dedicated worker owns the database connection, translates each
//! [`AppTask`] into database or file operations and sends the outcome back to
//! the main loop as [`AppEvent`]s.
//!
//! The worker is what makes the search engine asynchronous from the search
//! view's point of view: a search returns an id immediately and its results
//! arrive later as queued events.

mod handlers;

use std::{
    path::PathBuf,
    sync::mpsc::{Receiver, Sender},
    thread,
};

use anyhow::Result;
use rusqlite::Connection;
use tracing::{error, info};

use crate::{
    db,
    events::AppEvent,
    model::SearchBy,
    search::{ArtRequestId, SearchId, engine::InFlightSearches},
};

#[derive(Debug)]
pub enum AppTask {
    Search {
        id: SearchId,
        query: String,
        search_by: SearchBy,
    },
    LoadArt {
        id: ArtRequestId,
        filename: String,
    },
    ScanCatalog(Vec<String>),
}

/// Spawns a background thread to process application tasks.
///
/// The worker opens its own database connection and then blocks on
/// `task_rx` until every sender has been dropped. If the database cannot be
/// opened a [`AppEvent::FatalError`] is sent and the worker exits.
pub fn spawn_task_worker(
    database_file: PathBuf,
    in_flight: InFlightSearches,
    task_rx: Receiver<AppTask>,
    event_tx: Sender<AppEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut conn = match db::init_db(&database_file) {
            Ok(conn) => conn,
            Err(e) => {
                error!(error = %format!("{e:#}"), "failed to initialise database");
                let _ = event_tx.send(AppEvent::FatalError(format!("{e:#}")));
                return;
            }
        };
        info!(path = %database_file.display(), "task worker started");

        run_task_loop(&mut conn, &in_flight, &task_rx, &event_tx);
    })
}

/// Processes tasks until the channel closes.
pub(crate) fn run_task_loop(
    conn: &mut Connection,
    in_flight: &InFlightSearches,
    task_rx: &Receiver<AppTask>,
    event_tx: &Sender<AppEvent>,
) {
    while let Ok(task) = task_rx.recv() {
        let mut ctx = TaskContext {
            event_tx,
            in_flight,
            conn: &mut *conn,
        };

        if let Err(e) = handle_task(task, &mut ctx) {
            let _ = event_tx.send(AppEvent::Error(format!("{e:#}")));
        }
    }
}

/// Bundles shared resources required by task handlers to simplify resource
/// passing when invoking those handler functions.
struct TaskContext<'a> {
    event_tx: &'a Sender<AppEvent>,
    in_flight: &'a InFlightSearches,
    conn: &'a mut Connection,
}

/// Orchestrates the execution of a single task.
fn handle_task(task: AppTask, ctx: &mut TaskContext) -> Result<()> {
    match task {
        AppTask::Search {
            id,
            query,
            search_by,
        } => handlers::search(ctx, id, &query, search_by),
        AppTask::LoadArt { id, filename } => handlers::load_art(ctx, id, &filename),
        AppTask::ScanCatalog(roots) => handlers::scan_catalog(ctx, &roots),
    }
}
