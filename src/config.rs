//! Assignment checklist configs.
//!
//! One JSON document per assignment, looked up case-insensitively as
//! `<assignment>_cfg.json` in the configured directory. The on-disk
//! filename's casing becomes the canonical assignment id so log and
//! results names always agree with it.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_SUFFIX: &str = "_cfg.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config for {0}; are you sure the assignment id is correct?")]
    Missing(String),
    #[error("cannot read config directory {dir}: {source}")]
    DirUnreadable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing config file {path}:\n{source}\n\nPlease contact course staff.")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate problem number {number} in {path}")]
    DuplicateProblem { number: u32, path: PathBuf },
}

/// One numbered checklist entry within an assignment.
///
/// `files` drives the existence check, `compile_files` the compilation
/// check. Patterns may contain `*` wildcards, expanded per student at
/// check time. Any list may be null or absent to skip that check.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSpec {
    pub number: u32,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub compile_files: Option<Vec<String>>,
    /// Reserved for TA testbench checks; parsed but not acted on yet.
    #[serde(default)]
    pub test_files: Option<Vec<String>>,
    /// Top modules to elaborate individually after a shared analyze pass.
    #[serde(default)]
    pub specific_modules: Option<Vec<String>>,
}

/// A parsed assignment config. Problems are sorted by ascending number,
/// independent of their order in the source file.
#[derive(Debug, Clone)]
pub struct AssignmentConfig {
    /// Canonical assignment id, cased as the config filename on disk.
    pub id: String,
    pub problems: Vec<ProblemSpec>,
}

/// Locate the config for `assignment` in `cfg_dir`, matching the filename
/// case-insensitively. Returns the path and the canonical id taken from
/// the on-disk name.
pub fn find_config(cfg_dir: &Path, assignment: &str) -> Result<(PathBuf, String), ConfigError> {
    let target = format!("{}{}", assignment, CONFIG_SUFFIX).to_lowercase();
    let entries = fs::read_dir(cfg_dir).map_err(|source| ConfigError::DirUnreadable {
        dir: cfg_dir.to_path_buf(),
        source,
    })?;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.to_lowercase() == target {
            let canonical = name[..name.len() - CONFIG_SUFFIX.len()].to_string();
            return Ok((entry.path(), canonical));
        }
    }
    Err(ConfigError::Missing(assignment.to_string()))
}

/// Parse and validate the problem list in one config file.
pub fn parse_problems(path: &Path) -> Result<Vec<ProblemSpec>, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut problems: Vec<ProblemSpec> =
        serde_json::from_str(&contents).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    problems.sort_by_key(|p| p.number);
    for pair in problems.windows(2) {
        if pair[0].number == pair[1].number {
            return Err(ConfigError::DuplicateProblem {
                number: pair[0].number,
                path: path.to_path_buf(),
            });
        }
    }
    Ok(problems)
}

/// Load the checklist for `assignment` from `cfg_dir`.
pub fn load(cfg_dir: &Path, assignment: &str) -> Result<AssignmentConfig, ConfigError> {
    let (path, id) = find_config(cfg_dir, assignment)?;
    let problems = parse_problems(&path)?;
    Ok(AssignmentConfig { id, problems })
}
