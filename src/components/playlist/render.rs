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

//! UI rendering logic for the playlist view.
//!
//! This module draws a header summarising the active playlist and a track
//! table below it, using the colours of the current theme.

use std::{collections::HashMap, fmt::Write, time::Duration};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    prelude::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table},
};

use crate::{
    components::PlaylistView, playlist::Playlists, theme::Theme, util::format::format_time,
};

impl PlaylistView {
    pub fn draw(&mut self, f: &mut Frame, area: Rect, playlists: &Playlists, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let active = playlists.active();
        let total: Duration = active.tracks.iter().map(|t| t.duration).sum();

        let mut header_text = format!(
            "{} | {} tracks | {}",
            active.name,
            active.tracks.len(),
            format_time(total)
        );
        if playlists.playlists().len() > 1 {
            let _ = write!(header_text, " | {} playlists", playlists.playlists().len());
        }
        if playlists.queue_len() > 0 {
            let _ = write!(header_text, " | {} queued", playlists.queue_len());
        }

        let header_block = Block::default()
            .borders(Borders::BOTTOM)
            .padding(Padding::horizontal(1));
        f.render_widget(Paragraph::new(header_text).block(header_block), chunks[0]);

        let queue: HashMap<_, _> = playlists
            .queued()
            .enumerate()
            .map(|(position, track)| (track.id, position + 1))
            .collect();

        let rows = active.tracks.iter().map(|track| {
            let number = track
                .track_number
                .map(|n| format!("{n:02}"))
                .unwrap_or_default();
            Row::new(vec![
                Cell::from(
                    Line::from(format_time(track.duration))
                        .style(Style::default().fg(theme.table_time_fg))
                        .alignment(Alignment::Right),
                ),
                Cell::from(
                    Line::from(queue.get(&track.id).map(|p| p.to_string()).unwrap_or_default())
                        .style(Style::default().fg(theme.accent_colour))
                        .alignment(Alignment::Right),
                ),
                Cell::from(Line::from(track.artist.as_str()).style(Style::default().fg(theme.table_artist_fg))),
                Cell::from(Line::from(track.album.as_str()).style(Style::default().fg(theme.table_album_fg))),
                Cell::from(
                    Line::from(number)
                        .style(Style::default().fg(theme.table_track_number_fg))
                        .alignment(Alignment::Right),
                ),
                Cell::from(Line::from(track.title.as_str()).style(Style::default().fg(theme.table_track_fg))),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(3),
                Constraint::Percentage(20),
                Constraint::Percentage(25),
                Constraint::Length(5),
                Constraint::Percentage(55),
            ],
        )
        .header(
            Row::new(vec![
                Cell::from(Line::from("Time").alignment(Alignment::Right)),
                Cell::from(Line::from("Q").alignment(Alignment::Right)),
                Cell::from("Artist"),
                Cell::from("Album"),
                Cell::from(Line::from("Track").alignment(Alignment::Right)),
                Cell::from("Title"),
            ])
            .style(Style::default().add_modifier(Modifier::BOLD).fg(theme.accent_colour))
            .bottom_margin(1),
        )
        .row_highlight_style(Style::default().bg(theme.highlight_colour))
        .block(Block::default().padding(Padding::horizontal(1)));

        f.render_stateful_widget(table, chunks[1], &mut self.table_state);
    }
}
