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

use std::{path::Path, sync::mpsc::Sender};

use anyhow::Result;
use lofty::{file::TaggedFileExt, probe::Probe};
use tracing::{debug, warn};

use crate::{
    db::{self, scan},
    error::EngineError,
    events::{AppEvent, CatalogEvent},
    model::{Artwork, SearchBy, SearchResult},
    search::{ArtRequestId, SearchEvent, SearchId},
    tasks::TaskContext,
};

/// Results are delivered in batches of this size.
pub(super) const RESULT_BATCH_SIZE: usize = 50;

pub(super) fn search(
    ctx: &mut TaskContext,
    id: SearchId,
    query: &str,
    search_by: SearchBy,
) -> Result<()> {
    if !ctx.in_flight.contains(id) {
        debug!(%id, "search cancelled before it started");
        return Ok(());
    }

    let outcome = run_search(ctx, query, search_by);
    match outcome {
        Ok(results) => {
            debug!(%id, count = results.len(), "search finished");
            let in_flight = ctx.in_flight;
            stream_results(ctx.event_tx, id, &results, || in_flight.contains(id))?;
        }
        Err(e) => {
            warn!(%id, error = %e, "search failed");
            ctx.event_tx
                .send(AppEvent::Search(SearchEvent::Error(id, e.to_string())))?;
        }
    }

    ctx.in_flight.remove(id);
    Ok(())
}

/// Sends `results` in batches, stopping as soon as `wanted` reports that the
/// search was cancelled.
pub(super) fn stream_results(
    event_tx: &Sender<AppEvent>,
    id: SearchId,
    results: &[SearchResult],
    mut wanted: impl FnMut() -> bool,
) -> Result<()> {
    for batch in results.chunks(RESULT_BATCH_SIZE) {
        if !wanted() {
            debug!(%id, "search cancelled while streaming");
            break;
        }
        event_tx.send(AppEvent::Search(SearchEvent::Results(id, batch.to_vec())))?;
    }
    Ok(())
}

fn run_search(
    ctx: &mut TaskContext,
    query: &str,
    search_by: SearchBy,
) -> Result<Vec<SearchResult>, EngineError> {
    if db::count_tracks(ctx.conn)? == 0 {
        return Err(EngineError::EmptyCatalogue);
    }
    Ok(db::search(ctx.conn, query, search_by)?)
}

pub(super) fn load_art(ctx: &mut TaskContext, id: ArtRequestId, filename: &str) -> Result<()> {
    let art = match read_embedded_art(Path::new(filename)) {
        Ok(art) => art,
        Err(e) => {
            warn!(art_id = id.0, error = %e, "art load failed");
            None
        }
    };

    ctx.event_tx
        .send(AppEvent::Search(SearchEvent::ArtLoaded(id, art)))?;

    Ok(())
}

/// Returns the first picture embedded in the file's tags.
fn read_embedded_art(path: &Path) -> Result<Option<Artwork>, EngineError> {
    let to_error = |source: lofty::error::LoftyError| EngineError::Artwork {
        path: path.display().to_string(),
        source,
    };
    let tagged_file = Probe::open(path)
        .and_then(|p| p.read())
        .map_err(to_error)?;

    let art = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .and_then(|tag| tag.pictures().first())
        .map(|picture| Artwork {
            mime_type: picture.mime_type().map(|m| m.as_str().to_string()),
            data: picture.data().to_vec(),
        });

    Ok(art)
}

pub(super) fn scan_catalog(ctx: &mut TaskContext, roots: &[String]) -> Result<()> {
    ctx.event_tx.send(AppEvent::Catalog(CatalogEvent::Started))?;

    let total = scan::process_music_library(ctx.conn, roots, ctx.event_tx)?;

    ctx.event_tx
        .send(AppEvent::Catalog(CatalogEvent::Finished(total)))?;

    Ok(())
}
