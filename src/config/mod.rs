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

//! Application configuration.
//!
//! This module manages the application configuration file. Components do not
//! read the file themselves; they are handed a [`SettingsHandle`] at
//! construction, read the cached [`AppConfig`] from it and write changes back
//! through [`Settings::update`]. [`Settings::reload`] re-reads the file.

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Grouping, SearchBy};

const CONFIG_NAME: &str = "quaver";

const DEFAULT_DATABASE_FILE: &str = "quaver.db";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub media_dirs: Vec<String>,
    /// Catalogue database, relative paths are resolved against the
    /// configuration directory.
    pub database_file: String,
    pub search: SearchSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            media_dirs: vec![],
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            search: SearchSettings::default(),
        }
    }
}

/// Persisted search view preferences.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub search_by: SearchBy,
    pub grouping: Grouping,
    pub pretty_covers: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            search_by: SearchBy::Songs,
            grouping: Grouping::default(),
            pretty_covers: true,
        }
    }
}

/// Where the configuration file lives.
#[derive(Debug, Clone)]
pub enum ConfigLocation {
    /// The platform configuration directory for this application.
    Default,
    Path(PathBuf),
}

impl ConfigLocation {
    pub fn file_path(&self) -> Result<PathBuf> {
        match self {
            Self::Default => confy::get_configuration_file_path(CONFIG_NAME, None)
                .context("Failed to locate configuration file"),
            Self::Path(path) => Ok(path.clone()),
        }
    }

    /// Directory holding the configuration file and its companions.
    pub fn directory(&self) -> Result<PathBuf> {
        let file = self.file_path()?;
        Ok(file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")))
    }

    fn load(&self) -> Result<AppConfig> {
        let config = match self {
            Self::Default => confy::load(CONFIG_NAME, None),
            Self::Path(path) => confy::load_path(path),
        };
        config.context("Failed to load configuration")
    }

    fn store(&self, config: &AppConfig) -> Result<()> {
        let stored = match self {
            Self::Default => confy::store(CONFIG_NAME, None, config),
            Self::Path(path) => confy::store_path(path, config),
        };
        stored.context("Failed to save configuration")
    }
}

/// Cached configuration with explicit reload and write-through updates.
#[derive(Debug)]
pub struct Settings {
    location: ConfigLocation,
    config: AppConfig,
    /// Set while the file on disk could not be parsed. Saving is refused so
    /// the defaults never overwrite it.
    unreadable: bool,
}

pub type SettingsHandle = Rc<RefCell<Settings>>;

impl Settings {
    /// Loads the configuration, falling back to defaults if the file cannot
    /// be parsed. Changes are then kept in memory only, until a [`reload`]
    /// succeeds.
    ///
    /// [`reload`]: Settings::reload
    pub fn load(location: ConfigLocation) -> Self {
        match location.load() {
            Ok(config) => Self {
                location,
                config,
                unreadable: false,
            },
            Err(e) => {
                warn!(error = %format!("{e:#}"), "using default configuration");
                Self {
                    location,
                    config: AppConfig::default(),
                    unreadable: true,
                }
            }
        }
    }

    pub fn into_handle(self) -> SettingsHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Re-reads the configuration file, keeping the cached copy on failure.
    pub fn reload(&mut self) -> Result<()> {
        self.config = self.location.load()?;
        self.unreadable = false;
        debug!("configuration reloaded");
        Ok(())
    }

    /// Applies `change` to the cached configuration and saves it.
    ///
    /// The change is applied even when saving fails or is refused.
    pub fn update(&mut self, change: impl FnOnce(&mut AppConfig)) -> Result<()> {
        change(&mut self.config);
        if self.unreadable {
            bail!("Configuration file is unreadable, not saving until :reload succeeds");
        }
        self.location.store(&self.config)
    }

    /// Absolute path of the catalogue database.
    pub fn database_path(&self) -> Result<PathBuf> {
        let file = PathBuf::from(&self.config.database_file);
        if file.is_absolute() {
            return Ok(file);
        }
        Ok(self.location.directory()?.join(file))
    }
}
