//! CLI command implementations.

pub mod access;
pub mod check;
pub mod validate;

use crate::roster;
use crate::settings::Settings;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Resolve the student IDs a command operates on: an explicit ID list
/// wins, then an explicit roster file, then the course roster from
/// settings.
pub(crate) fn resolve_ids(
    settings: &Settings,
    roster_path: Option<PathBuf>,
    students: Vec<String>,
) -> Result<Vec<String>> {
    if !students.is_empty() {
        return Ok(students);
    }
    let path = roster_path.unwrap_or_else(|| settings.roster.clone());
    let ids = roster::load_roster(&path)?;
    if ids.is_empty() {
        bail!("roster {} contains no student IDs", path.display());
    }
    Ok(ids)
}
