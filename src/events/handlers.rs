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

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

use crate::{
    app::{App, MainView},
    commander::Command,
    components::SearchFocus,
    events::{AppEvent, CatalogEvent},
    playlist::{PlaylistBundle, PlaylistSink},
    tasks::AppTask,
};

/// Routes a key press to the commander, the global bindings or the active
/// view, in that order.
pub(super) fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    // The search field takes every printable key, including ':'.
    let typing = app.main_view == MainView::Search && app.search_view.focus() == SearchFocus::Search;
    if app.commander.handle_key(key, !typing, &app.event_tx)? {
        return Ok(());
    }

    if process_global_key_event(app, key)? {
        return Ok(());
    }

    let outcome = match app.main_view {
        MainView::Search => app
            .search_view
            .process_key(key, Instant::now(), &app.event_tx),
        MainView::Playlists => {
            app.playlist_view.process_key(key, &mut app.playlists);
            Ok(())
        }
    };
    if let Err(e) = outcome {
        handle_error(app, format!("{e:#}"));
    }
    Ok(())
}

fn process_global_key_event(app: &mut App, key: KeyEvent) -> Result<bool> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => app.event_tx.send(AppEvent::ExitApplication)?,
        (KeyCode::F(1), _) => app.main_view = MainView::Search,
        (KeyCode::F(2), _) => app.main_view = MainView::Playlists,
        _ => return Ok(false),
    }
    Ok(true)
}

pub(super) fn handle_tick(app: &mut App) {
    app.search_view.tick(Instant::now());
}

pub(super) fn handle_catalog_event(app: &mut App, catalog_event: CatalogEvent) {
    let status = match catalog_event {
        CatalogEvent::Started => "Scanning catalogue".to_string(),
        CatalogEvent::StartedDirectory(dir) => format!("Scanning {dir}"),
        CatalogEvent::ProcessedFile(count) => format!("Scanned {count} files"),
        CatalogEvent::FinishedDirectory(dir, count) => format!("Scanned {count} files in {dir}"),
        CatalogEvent::Finished(total) => {
            info!(total, "catalogue scan finished");
            app.search_view.refresh(Instant::now());
            format!("Catalogue updated, {total} tracks")
        }
    };
    app.status = Some(status);
}

pub(super) fn handle_add_to_playlist(app: &mut App, bundle: PlaylistBundle) {
    let count = bundle.results.len();
    app.playlists.add_to_playlist(bundle);
    app.status = Some(format!(
        "Added {count} tracks to {}",
        app.playlists.active().name
    ));
}

pub(super) fn handle_command(app: &mut App, command: Command) -> Result<()> {
    let now = Instant::now();
    let outcome = match command {
        Command::Quit => {
            app.event_tx.send(AppEvent::ExitApplication)?;
            Ok(())
        }
        Command::Scan => {
            let media_dirs = app.settings.borrow().config().media_dirs.clone();
            if media_dirs.is_empty() {
                handle_error(app, "No media directories configured".to_string());
            } else {
                app.task_tx.send(AppTask::ScanCatalog(media_dirs))?;
            }
            Ok(())
        }
        Command::Reload => app.search_view.reload_settings(now),
        Command::SearchBy(search_by) => app.search_view.set_search_by(search_by, now),
        Command::Group(grouping) => app.search_view.set_grouping(grouping),
        Command::Covers(enabled) => app.search_view.set_pretty_covers(enabled),
    };

    if let Err(e) = outcome {
        handle_error(app, format!("{e:#}"));
    }
    Ok(())
}

pub(super) fn handle_error(app: &mut App, message: String) {
    warn!(%message, "error reported");
    app.status = Some(message);
}
