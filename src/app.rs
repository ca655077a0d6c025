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

//! Application state and lifecycle.
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is restored even when the main loop fails. Communication
//! between the UI and background threads is handled via `std::sync::mpsc`
//! channels:
//!
//! * The **Main Thread** owns [`App`], manages the terminal and renders.
//! * The **Task Worker** owns the catalogue database and answers searches,
//!   artwork requests and scans.
//! * The **Input** and **Tick** threads turn key presses and the passage of
//!   time into [`AppEvent`]s.

use std::{
    io,
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::{
    commander::Commander,
    components::{PlaylistView, SearchView},
    config::{Settings, SettingsHandle},
    events::{AppEvent, process_events},
    playlist::Playlists,
    search::{CatalogSearchEngine, engine::InFlightSearches},
    tasks::{self, AppTask},
    theme::Theme,
    util,
};

/// Tick period. Bounds how late the result swap can fire after its deadline.
const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainView {
    Search,
    Playlists,
}

/// Application state.
pub struct App {
    pub settings: SettingsHandle,

    pub theme: Theme,
    pub main_view: MainView,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub task_tx: Sender<AppTask>,

    pub search_view: SearchView<CatalogSearchEngine>,
    pub playlist_view: PlaylistView,
    pub playlists: Playlists,

    pub commander: Commander,

    /// Latest status or error message for the footer.
    pub status: Option<String>,
}

impl App {
    /// Create a new instance of application state.
    pub fn new(settings: SettingsHandle, task_tx: Sender<AppTask>, in_flight: InFlightSearches) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        let engine = CatalogSearchEngine::new(task_tx.clone(), in_flight);

        Self {
            search_view: SearchView::new(engine, settings.clone()),
            settings,
            theme: Theme::default(),
            main_view: MainView::Search,
            event_tx,
            event_rx,
            task_tx,
            playlist_view: PlaylistView::new(),
            playlists: Playlists::new(),
            commander: Commander::new(),
            status: None,
        }
    }
}

/// Runs the application until the user quits.
///
/// Starts the task worker, takes over the terminal, and hands control to
/// [`process_events`]. The terminal is restored whatever the outcome.
pub fn run(settings: Settings) -> Result<()> {
    let database_file = settings.database_path()?;
    let settings = settings.into_handle();

    let (task_tx, task_rx) = mpsc::channel();
    let in_flight = InFlightSearches::default();

    let mut app = App::new(settings, task_tx, in_flight.clone());

    // Spawn a background worker to process application tasks asynchronously.
    tasks::spawn_task_worker(database_file, in_flight, task_rx, app.event_tx.clone());

    let mut terminal = setup_terminal(&app.theme)?;
    let res = run_event_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal);

    info!("application exiting");
    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Sets the terminal background color based on the provided theme.
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(theme: &Theme) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    if let Some(hex) = Theme::to_hex(theme.background_colour) {
        util::term::set_terminal_bg(&hex);
    }

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`]. It is best-effort
/// and does not return a result, as it runs during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg();
    terminal.show_cursor().ok();
}

/// Spawns the input and tick threads, then processes events until the user
/// quits.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    // Spawn a thread to translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(Event::Key(key)) = event::read() {
                if tx_keys.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
        }
    });

    // Spawn a thread to send a periodic tick application event, this drives
    // the result swap timer and is the minimum "frame rate" of the UI.
    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    process_events(terminal, app)
}
