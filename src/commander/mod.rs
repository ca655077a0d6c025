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

//! Command-line input logic and state management.
//!
//! This module implements the logic for a command-line processing component,
//! handling a text input component, and dispatching a corresponding
//! application event when typing is finished and a command is submitted.

use std::sync::mpsc::Sender;

use anyhow::{Result, bail};
use crossterm::event::{Event, KeyCode, KeyEvent};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    events::AppEvent,
    model::{GroupBy, Grouping, SearchBy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Scan,
    Reload,
    SearchBy(SearchBy),
    Group(Grouping),
    Covers(bool),
}

/// Parses a command line, without the leading `:`.
pub fn parse_command(buffer: &str) -> Result<Command> {
    let parts: Vec<&str> = buffer.split_whitespace().collect();

    let command = match parts.as_slice() {
        ["q"] | ["quit"] => Command::Quit,

        ["scan"] => Command::Scan,

        ["reload"] => Command::Reload,

        ["by", "songs"] => Command::SearchBy(SearchBy::Songs),
        ["by", "albums"] => Command::SearchBy(SearchBy::Albums),
        ["by", ..] => bail!("Usage: by songs|albums"),

        ["group", levels @ ..] if (1..=3).contains(&levels.len()) => {
            let mut parsed = [GroupBy::None; 3];
            for (slot, level) in parsed.iter_mut().zip(levels) {
                *slot = level.parse()?;
            }
            Command::Group(Grouping::new(parsed[0], parsed[1], parsed[2]))
        }
        ["group", ..] => bail!("Usage: group <level> [level] [level]"),

        ["covers", "on"] => Command::Covers(true),
        ["covers", "off"] => Command::Covers(false),
        ["covers", ..] => bail!("Usage: covers on|off"),

        [] => bail!("No command"),

        [cmd, ..] => bail!("Unknown command: {cmd}"),
    };

    Ok(command)
}

#[derive(Default)]
pub struct Commander {
    active: bool,
    pub(crate) input: Input,
}

impl Commander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Handles `key` if the command line is open, or opens it on `:` when
    /// `can_open` allows. Returns whether the key was consumed.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        can_open: bool,
        event_tx: &Sender<AppEvent>,
    ) -> Result<bool> {
        if !self.active {
            if can_open && key.code == KeyCode::Char(':') {
                self.active = true;
            }
            return Ok(self.active);
        }

        match key.code {
            KeyCode::Esc => {
                self.input.reset();
                self.active = false;
            }

            KeyCode::Enter => {
                let buffer = self.input.value().trim().to_string();
                self.input.reset();
                self.active = false;
                if !buffer.is_empty() {
                    let event = match parse_command(&buffer) {
                        Ok(command) => AppEvent::Command(command),
                        Err(e) => AppEvent::Error(e.to_string()),
                    };
                    event_tx.send(event)?;
                }
            }

            _ => {
                // Delegate all other keys to the managed input component.
                self.input.handle_event(&Event::Key(key));
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("q").unwrap(), Command::Quit);
        assert_eq!(parse_command(" scan ").unwrap(), Command::Scan);
        assert_eq!(
            parse_command("by albums").unwrap(),
            Command::SearchBy(SearchBy::Albums)
        );
        assert_eq!(parse_command("covers off").unwrap(), Command::Covers(false));
        assert_eq!(
            parse_command("group genre year").unwrap(),
            Command::Group(Grouping::new(GroupBy::Genre, GroupBy::Year, GroupBy::None))
        );
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(parse_command("group").is_err());
        assert!(parse_command("group a b c d").is_err());
        assert!(parse_command("group colour").is_err());
        assert!(parse_command("by mood").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn typed_command_is_sent_on_enter() {
        let (tx, rx) = mpsc::channel();
        let mut commander = Commander::new();

        assert!(!commander.handle_key(key(KeyCode::Char(':')), false, &tx).unwrap());
        assert!(commander.handle_key(key(KeyCode::Char(':')), true, &tx).unwrap());
        for c in "scan".chars() {
            commander.handle_key(key(KeyCode::Char(c)), true, &tx).unwrap();
        }
        commander.handle_key(key(KeyCode::Enter), true, &tx).unwrap();

        assert!(!commander.active());
        assert!(matches!(rx.try_recv(), Ok(AppEvent::Command(Command::Scan))));
    }

    #[test]
    fn unknown_command_reports_error() {
        let (tx, rx) = mpsc::channel();
        let mut commander = Commander::new();
        commander.handle_key(key(KeyCode::Char(':')), true, &tx).unwrap();
        commander.handle_key(key(KeyCode::Char('x')), true, &tx).unwrap();
        commander.handle_key(key(KeyCode::Enter), true, &tx).unwrap();

        assert!(matches!(rx.try_recv(), Ok(AppEvent::Error(m)) if m.contains("Unknown command")));
    }
}
