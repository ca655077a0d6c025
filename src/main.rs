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

//! # quaver
//!
//! Entry point: loads the configuration, starts logging and runs the
//! terminal application.

use anyhow::{Context, Result};
use tracing::info;

use quaver::{
    app,
    config::{ConfigLocation, Settings},
    logging,
};

fn main() -> Result<()> {
    let location = ConfigLocation::Default;

    let log_directory = location.directory()?;
    logging::init(&log_directory).context("Failed to initialise logging")?;

    let settings = Settings::load(location);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        media_dirs = settings.config().media_dirs.len(),
        "starting"
    );

    app::run(settings)
}
