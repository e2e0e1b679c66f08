//! Course environment settings.
//!
//! Directory layout, course identity, and toolchain limits live in a small
//! TOML file so staff can point the tool at a test course tree without
//! rebuilding. Every field has a default matching the production AFS layout.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_COURSE_DIR: &str = "/afs/ece.cmu.edu/class/ee240";
const DEFAULT_COURSE_LABEL: &str = "18240";
const DEFAULT_ACL_GROUP: &str = "ee240";

/// Default upper bound on one external compile invocation.
pub const DEFAULT_COMPILE_TIMEOUT_SECS: u64 = 120;

/// On-disk settings schema. All fields optional; anything left out falls
/// back to the production defaults in [`Settings::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    course: Option<String>,
    group: Option<String>,
    course_dir: Option<PathBuf>,
    handin_dir: Option<PathBuf>,
    cfg_dir: Option<PathBuf>,
    results_dir: Option<PathBuf>,
    roster: Option<PathBuf>,
    compile_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Course label used in report headers (e.g. "18240").
    pub course: String,
    /// ACL group prefix for permission mutations (e.g. "ee240").
    pub group: String,
    /// Directory holding one subdirectory per student.
    pub handin_dir: PathBuf,
    /// Directory holding `<assignment>_cfg.json` checklists.
    pub cfg_dir: PathBuf,
    /// Directory the aggregate results artifact is written into.
    pub results_dir: PathBuf,
    /// Default roster file (one student ID per line).
    pub roster: PathBuf,
    pub compile_timeout: Duration,
}

impl Settings {
    /// Load settings from an explicit TOML file, or fall back to the
    /// built-in production defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read settings file {}", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("failed to parse settings file {}", path.display()))?
            }
            None => SettingsFile::default(),
        };
        Ok(Self::resolve(file))
    }

    fn resolve(file: SettingsFile) -> Self {
        let course_dir = file
            .course_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COURSE_DIR));
        let staff_dir = course_dir.join("STAFF");
        Settings {
            course: file.course.unwrap_or_else(|| DEFAULT_COURSE_LABEL.to_string()),
            group: file.group.unwrap_or_else(|| DEFAULT_ACL_GROUP.to_string()),
            handin_dir: file.handin_dir.unwrap_or_else(|| course_dir.join("handin")),
            cfg_dir: file.cfg_dir.unwrap_or_else(|| staff_dir.join("hw_configs")),
            results_dir: file.results_dir.unwrap_or_else(|| staff_dir.join("results")),
            roster: file.roster.unwrap_or_else(|| staff_dir.join("roster.txt")),
            compile_timeout: Duration::from_secs(
                file.compile_timeout_secs
                    .unwrap_or(DEFAULT_COMPILE_TIMEOUT_SECS),
            ),
        }
    }
}
