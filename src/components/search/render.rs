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

//! UI rendering logic for the search view.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::{
    components::{SearchFocus, SearchView},
    search::{Node, NodeKind, Panel, ResultContainer, SearchEngine},
    theme::Theme,
    util::format::format_time,
};

impl<E: SearchEngine> SearchView<E> {
    pub fn draw(&mut self, f: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.draw_search_field(f, chunks[0], theme);
        self.draw_results(f, chunks[1], theme);
    }

    fn draw_search_field(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let border = if self.focus == SearchFocus::Search {
            theme.accent_colour
        } else {
            theme.border_colour
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" Search {} | {} ", self.search_by(), self.grouping()))
            .padding(Padding::horizontal(1));

        let inner = block.inner(area);
        f.render_widget(Paragraph::new(self.query()).block(block), area);

        if self.focus == SearchFocus::Search {
            let cursor_x = inner.x + self.input.visual_cursor() as u16;
            f.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
        }
    }

    fn draw_results(&mut self, f: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default().padding(Padding::horizontal(1));

        let front = match self.presenter.panel() {
            Panel::Help(text) => {
                let help = Paragraph::new(text)
                    .style(Style::default().fg(theme.table_time_fg))
                    .alignment(Alignment::Center)
                    .block(block.padding(Padding::top(area.height / 2)));
                f.render_widget(help, area);
                self.visible = 0..0;
                return;
            }
            Panel::Error(message) => {
                let error = Paragraph::new(message)
                    .style(Style::default().fg(theme.error_colour))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(block.padding(Padding::top(area.height / 2)));
                f.render_widget(error, area);
                self.visible = 0..0;
                return;
            }
            Panel::Results(front) => front,
        };

        let items: Vec<ListItem> = front
            .rows()
            .into_iter()
            .filter_map(|row| {
                let node = front.node(row.node)?;
                let marked = self.marked.contains(&row.node);
                Some(ListItem::new(row_line(front, node, marked, theme)))
            })
            .collect();
        let row_count = items.len();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(theme.highlight_colour));
        f.render_stateful_widget(list, area, &mut self.list_state);

        let start = self.list_state.offset();
        self.visible = start..(start + area.height as usize).min(row_count);
    }
}

fn row_line<'a>(front: &ResultContainer, node: &'a Node, marked: bool, theme: &Theme) -> Line<'a> {
    let indent = "  ".repeat(node.depth);
    let marker = if marked {
        Span::styled("+", Style::default().fg(theme.background_colour).bg(theme.accent_colour))
    } else {
        Span::raw(" ")
    };

    match node.kind {
        NodeKind::Divider => Line::from(vec![
            marker,
            Span::styled(
                node.text.as_str(),
                Style::default()
                    .fg(theme.accent_colour)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),

        NodeKind::Container(group_by) => {
            let colour = if group_by.is_album() {
                theme.table_album_fg
            } else {
                theme.table_artist_fg
            };
            let art = if node.art.is_some() {
                "\u{25a3} "
            } else if group_by.has_art() {
                "\u{25a1} "
            } else {
                ""
            };
            Line::from(vec![
                marker,
                Span::raw(indent),
                Span::styled(art, Style::default().fg(theme.table_time_fg)),
                Span::styled(node.text.as_str(), Style::default().fg(colour)),
            ])
        }

        NodeKind::Track(index) => {
            let Some(result) = front.results().get(index) else {
                return Line::from(marker);
            };
            let number = result
                .track_number
                .map(|n| format!("{n:02} "))
                .unwrap_or_default();
            Line::from(vec![
                marker,
                Span::raw(indent),
                Span::styled(number, Style::default().fg(theme.table_track_number_fg)),
                Span::styled(node.text.as_str(), Style::default().fg(theme.table_track_fg)),
                Span::styled(
                    format!("  {}", format_time(result.duration)),
                    Style::default().fg(theme.table_time_fg),
                ),
            ])
        }
    }
}
