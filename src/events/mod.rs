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

//! Application events and the main event loop.
//!
//! Every helper thread (key reader, tick timer, task worker) talks to the main
//! thread by sending an [`AppEvent`]. The loop in [`process_events`] owns all
//! view state: it applies one event at a time and redraws afterwards, so no
//! state is ever shared between threads.

mod handlers;
use handlers::*;

use std::io::Stdout;

use anyhow::{Result, anyhow};
use crossterm::event::KeyEvent;
use ratatui::{Terminal, prelude::CrosstermBackend};
use tracing::error;

use crate::{
    app::App, commander::Command, playlist::PlaylistBundle, render::draw, search::SearchEvent,
};

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),

    /// Periodic wake-up that drives the result swap timer.
    Tick,

    Search(SearchEvent),
    Catalog(CatalogEvent),

    AddToPlaylist(PlaylistBundle),

    Command(Command),

    Error(String),
    FatalError(String),

    ExitApplication,
}

/// Progress of a catalogue scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Started,
    StartedDirectory(String),
    ProcessedFile(usize),
    FinishedDirectory(String, usize),
    Finished(i64),
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until an exit event is received or the event channel
/// is closed. A fatal error from a worker ends the loop with that error.
pub fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    redraw(terminal, app)?;

    while let Ok(event) = app.event_rx.recv() {
        match event {
            AppEvent::ExitApplication => break,
            AppEvent::FatalError(message) => {
                error!(%message, "fatal error");
                return Err(anyhow!(message));
            }
            AppEvent::Key(key) => handle_key_event(app, key)?,
            AppEvent::Tick => handle_tick(app),
            AppEvent::Search(search_event) => app.search_view.handle_search_event(search_event),
            AppEvent::Catalog(catalog_event) => handle_catalog_event(app, catalog_event),
            AppEvent::AddToPlaylist(bundle) => handle_add_to_playlist(app, bundle),
            AppEvent::Command(command) => handle_command(app, command)?,
            AppEvent::Error(message) => handle_error(app, message),
        }

        redraw(terminal, app)?;
    }
    Ok(())
}

/// Draws a frame, then asks for art for whatever album rows ended up on
/// screen.
fn redraw(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;
    app.search_view.load_visible_art();
    Ok(())
}
