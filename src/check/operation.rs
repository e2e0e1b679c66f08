//! One problem's executable check.

use crate::config::ProblemSpec;
use crate::toolchain::Toolchain;
use crate::utils;
use crate::wildcard;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The runtime view of one [`ProblemSpec`]. Built once per assignment and
/// shared read-only across students; all per-student state lives in the
/// [`ProblemReport`] each run produces.
#[derive(Debug, Clone)]
pub struct Operation {
    pub number: u32,
    exist_patterns: Option<Vec<String>>,
    compile_patterns: Option<Vec<String>>,
    specific_modules: Option<Vec<String>>,
}

/// Fresh per-student result of running one operation.
#[derive(Debug, Clone)]
pub struct ProblemReport {
    pub number: u32,
    pub errors: Vec<String>,
}

impl ProblemReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The raw diagnostic block for this problem, one error per line.
    pub fn error_text(&self) -> String {
        let mut text = self.errors.join("\n");
        text.push('\n');
        text
    }
}

fn missing_file_error(name: &str) -> String {
    format!("{}: {}", name, "file does not exist".red())
}

fn compile_error(subject: &str, diagnostics: &str) -> String {
    let mut error = format!("{}: {}", subject, "failed to compile".red());
    if !diagnostics.trim().is_empty() {
        error.push('\n');
        error.push_str(diagnostics.trim_end());
    }
    error
}

impl Operation {
    pub fn from_spec(spec: &ProblemSpec) -> Self {
        Self {
            number: spec.number,
            exist_patterns: spec.files.clone(),
            compile_patterns: spec.compile_files.clone(),
            specific_modules: spec.specific_modules.clone(),
        }
    }

    /// Run this problem's checks against one student directory.
    ///
    /// Wildcards are expanded against `student_dir` so each student's own
    /// submissions are in scope. Every missing file is reported (no
    /// short-circuit within a check), but an existence failure suppresses
    /// the compile attempt for this problem. Returns a fresh report; only
    /// infrastructure faults (toolchain unavailable, scratch directory
    /// creation failure) surface as `Err`.
    pub fn run(
        &self,
        student_dir: &Path,
        toolchain: &dyn Toolchain,
        skip_compile: bool,
    ) -> Result<ProblemReport> {
        let mut report = ProblemReport {
            number: self.number,
            errors: Vec::new(),
        };

        if let Some(patterns) = &self.exist_patterns {
            for file in wildcard::resolve_patterns(patterns, student_dir) {
                if !student_dir.join(&file).exists() {
                    report.errors.push(missing_file_error(&file));
                }
            }
            if report.has_errors() {
                return Ok(report);
            }
        }

        if skip_compile {
            return Ok(report);
        }
        let Some(patterns) = &self.compile_patterns else {
            return Ok(report);
        };

        let compile_files = wildcard::resolve_patterns(patterns, student_dir);
        // Missing sources are reported as such rather than surfacing as
        // toolchain noise; no compile is attempted in that case.
        for file in &compile_files {
            if !student_dir.join(file).exists() {
                report.errors.push(missing_file_error(file));
            }
        }
        if report.has_errors() {
            return Ok(report);
        }

        // The toolchain runs in a scratch directory so build artifacts never
        // land in (or collide across) student directories; sources are passed
        // as absolute paths for the same reason.
        let scratch = utils::scratch_dir().context("failed to create scratch compile directory")?;
        let absolute: Vec<PathBuf> = compile_files.iter().map(|f| student_dir.join(f)).collect();
        let file_list = compile_files.join(", ");
        debug!(
            "problem {}: compiling {file_list} in {}",
            self.number,
            scratch.path().display()
        );

        if let Some(modules) = &self.specific_modules {
            let analyzed = toolchain.analyze(&absolute, scratch.path())?;
            if !analyzed.success {
                report.errors.push(compile_error(&file_list, &analyzed.output));
                return Ok(report);
            }
            // Every module is attempted; one failing elaboration doesn't
            // hide the ones after it.
            for module in modules {
                let outcome = toolchain.compile(&absolute, Some(module), scratch.path())?;
                if !outcome.success {
                    report.errors.push(compile_error(module, &outcome.output));
                }
            }
        } else {
            let outcome = toolchain.compile(&absolute, None, scratch.path())?;
            if !outcome.success {
                report.errors.push(compile_error(&file_list, &outcome.output));
            }
        }

        Ok(report)
    }
}
