// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use anyhow::Result;

use super::App;
use crate::cli::UnitChoice;
use crate::format;

/// Switch the preferred unit and show the resulting settings.
pub fn cmd_unit(app: &mut App, choice: UnitChoice) -> Result<()> {
    let unit = choice.resolve(app.unit);
    app.settings.set_preferred_unit(unit)?;
    app.unit = unit;
    println!("Unit changed to: {unit}");
    cmd_status(app)
}

pub fn cmd_status(app: &App) -> Result<()> {
    print!("{}", format::status_section(app.unit, &app.cache.info()));
    Ok(())
}
