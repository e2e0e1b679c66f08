//! Error report formatting and artifact writing.
//!
//! Reports are rendered with ANSI colors for the terminal, then stripped of
//! every control sequence before touching disk so the log artifacts stay
//! plain text.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Width of the bordered report headers, including the `*` edges.
pub const HEADER_LEN: usize = 80;

/// Per-student log filename, written inside the student's handin directory.
pub const ERROR_LOG: &str = "errors.log";

fn ansi_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("\x1b\\[[0-9;]*m").unwrap())
}

/// Remove every ANSI color/formatting sequence, leaving content untouched.
pub fn strip_formatting(s: &str) -> String {
    ansi_pattern().replace_all(s, "").into_owned()
}

/// A full-width `****` rule marking the top and bottom of a header block.
pub fn header_rule() -> String {
    format!("{}\n", "*".repeat(HEADER_LEN))
}

/// One centered line of a bordered header. `filled` pads with `*` instead
/// of spaces; that variant marks per-problem sub-headers.
pub fn header_line(text: &str, filled: bool) -> String {
    let text = format!(" {text} ");
    let remaining = (HEADER_LEN - 2).saturating_sub(text.chars().count());
    let first = remaining / 2;
    let second = remaining - first;
    let filler = if filled { "*" } else { " " };
    format!(
        "*{}{}{}*\n",
        filler.repeat(first),
        text,
        filler.repeat(second)
    )
}

/// The bordered banner opening a student's error log.
pub fn output_header(course: &str, assignment: &str, student: &str) -> String {
    let mut out = header_rule();
    out.push_str(&header_line(&format!("{course}: {assignment}"), false));
    out.push_str(&header_line(&format!("Error log for: {student}"), false));
    out.push_str(&header_rule());
    out
}

/// Write (or overwrite) the per-student error log inside `dir`.
pub fn write_error_log(dir: &Path, contents: &str) -> Result<PathBuf> {
    let path = dir.join(ERROR_LOG);
    fs::write(&path, strip_formatting(contents))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Remove a log left over from an earlier, failing run.
pub fn remove_stale_log(dir: &Path) -> Result<()> {
    let path = dir.join(ERROR_LOG);
    if path.exists() {
        fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Write the aggregate results artifact for one assignment: all failing
/// students' reports separated by a blank line. Nothing is written when
/// no student failed.
pub fn write_batch_results(
    results_dir: &Path,
    assignment: &str,
    reports: &[String],
) -> Result<Option<PathBuf>> {
    if reports.is_empty() {
        return Ok(None);
    }
    fs::create_dir_all(results_dir)
        .with_context(|| format!("failed to create {}", results_dir.display()))?;
    let path = results_dir.join(format!("{assignment}_results.txt"));
    fs::write(&path, strip_formatting(&reports.join("\n\n")))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(path))
}
