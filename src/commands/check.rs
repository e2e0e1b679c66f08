//! Batch and self-service checking commands.

use crate::check::batch;
use crate::check::runner::CheckRunner;
use crate::config;
use crate::report;
use crate::settings::Settings;
use crate::toolchain::VcsToolchain;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Check every student's handin against an assignment checklist, writing
/// per-student logs and the aggregate results artifact.
pub fn execute(
    settings: &Settings,
    assignment: &str,
    roster_path: Option<PathBuf>,
    students: Vec<String>,
    no_compile: bool,
) -> Result<()> {
    let ids = super::resolve_ids(settings, roster_path, students)?;
    if !no_compile {
        ensure_toolchain()?;
    }
    let cfg = config::load(&settings.cfg_dir, assignment)?;

    println!("Checking {} students for {}", ids.len(), cfg.id.bold());
    let toolchain = VcsToolchain::new(settings.compile_timeout);
    let outcome = batch::run_batch(settings, &cfg, &ids, &toolchain, no_compile)?;

    if outcome.failing.is_empty() {
        println!("\n{}", "All checked students passed.".green());
    } else {
        println!("\n{} student(s) with errors:", outcome.failing.len());
        for student in &outcome.failing {
            println!("\t{}", student.id);
        }
    }
    if let Some(path) = &outcome.results_path {
        println!("Errored students written to {}", path.display());
    }
    if !outcome.skipped.is_empty() {
        println!(
            "\n{} {} student(s) skipped:",
            "warning:".yellow(),
            outcome.skipped.len()
        );
        for (id, reason) in &outcome.skipped {
            println!("\t{id}: {reason}");
        }
    }
    Ok(())
}

/// Run the checklist against the current directory, the way the
/// student-side handin flow does. Writes `errors.log` here on failure and
/// removes a stale one on success. Returns whether the handin is accepted;
/// `force` accepts it despite failing checks (the log is still written).
pub fn execute_self(
    settings: &Settings,
    assignment: &str,
    no_compile: bool,
    force: bool,
) -> Result<bool> {
    if !no_compile {
        ensure_toolchain()?;
    }
    let dir = std::env::current_dir()
        .and_then(|d| d.canonicalize())
        .context("cannot resolve the current directory")?;
    let user = std::env::var("USER").unwrap_or_else(|_| "student".to_string());
    self_check(settings, assignment, no_compile, force, &dir, &user)
}

fn self_check(
    settings: &Settings,
    assignment: &str,
    no_compile: bool,
    force: bool,
    dir: &std::path::Path,
    user: &str,
) -> Result<bool> {
    let cfg = config::load(&settings.cfg_dir, assignment)?;
    let ops = batch::make_operations(&cfg);
    let toolchain = VcsToolchain::new(settings.compile_timeout);
    let runner = CheckRunner {
        ops: &ops,
        toolchain: &toolchain,
        skip_compile: no_compile,
    };
    let student = runner
        .check_dir(dir, user)
        .context("self-check could not run")?;

    if student.has_errors() {
        let rendered = student.render(&settings.course, &cfg.id);
        print!("{rendered}");
        report::write_error_log(dir, &rendered)?;
        println!(
            "\n{} errors detected! See {} for details.",
            "WARNING:".yellow(),
            report::ERROR_LOG
        );
        if force {
            println!("{} accepting the handin anyway (--force)", "WARNING:".yellow());
        }
        Ok(force)
    } else {
        report::remove_stale_log(dir)?;
        println!("{}", "All checks passed.".green());
        Ok(true)
    }
}

/// Fail fast with a clear message when the simulator isn't installed,
/// instead of erroring once per student mid-batch.
fn ensure_toolchain() -> Result<()> {
    for binary in VcsToolchain::BINARIES {
        which::which(binary).map_err(|_| {
            anyhow::anyhow!(
                "{binary} not found on PATH; load the simulator environment or rerun with --no-compile"
            )
        })?;
    }
    Ok(())
}
