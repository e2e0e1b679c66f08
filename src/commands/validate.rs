//! Standalone config validation, for staff writing new checklists.

use crate::config;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn execute(path: &Path) -> Result<()> {
    let problems = config::parse_problems(path)?;
    println!(
        "{} {}: {} problem(s) parse cleanly",
        "ok".green(),
        path.display(),
        problems.len()
    );
    Ok(())
}
