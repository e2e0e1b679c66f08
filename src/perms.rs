//! Student handin directory permission lifecycle.
//!
//! Each mutation shells out to the AFS `fs seta` command with a fixed ACL
//! template: course roles keep their standing access and the student is
//! granted either write access (handin window open) or read-only access
//! (window closed). Mutations are best-effort per student; IDs that could
//! not be applied are collected and surfaced once, so the batch never
//! stops early.

use colored::Colorize;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Write,
    ReadOnly,
}

impl Access {
    fn as_acl(self) -> &'static str {
        match self {
            Access::Write => "write",
            Access::ReadOnly => "read",
        }
    }
}

pub struct PermissionManager {
    /// External ACL command, `fs` in production. Swappable for tests.
    program: String,
    group: String,
    pub dry_run: bool,
    pub verbose: bool,
}

impl PermissionManager {
    pub fn new(group: &str) -> Self {
        Self {
            program: "fs".to_string(),
            group: group.to_string(),
            dry_run: false,
            verbose: false,
        }
    }

    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// The full `seta` argument list for one student directory.
    fn acl_args(&self, dir: &Path, student: &str, access: Access) -> Vec<String> {
        let mut args = vec![
            "seta".to_string(),
            "-dir".to_string(),
            dir.to_string_lossy().into_owned(),
            "-clear".to_string(),
            "-acl".to_string(),
        ];
        let template = [
            ("system:web-srv-users".to_string(), "rl"),
            (format!("{}:ta", self.group), "all"),
            (format!("{}:staff", self.group), "all"),
            (self.group.clone(), "all"),
            ("system:administrators".to_string(), "all"),
            (student.to_string(), access.as_acl()),
        ];
        for (who, what) in template {
            args.push(who);
            args.push(what.to_string());
        }
        args
    }

    /// Apply the ACL template for one student. Returns false when the
    /// external command fails or cannot be spawned.
    fn set_access(&self, student: &str, dir: &Path, access: Access) -> bool {
        let args = self.acl_args(dir, student, access);
        if self.verbose {
            println!("{} {}", self.program, args.join(" "));
        }
        if self.dry_run {
            return true;
        }
        match Command::new(&self.program)
            .args(&args)
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => true,
            Ok(status) => {
                debug!("{} exited with {status} for {student}", self.program);
                false
            }
            Err(e) => {
                debug!("failed to run {}: {e}", self.program);
                false
            }
        }
    }

    fn student_dir(&self, base: &Path, id: &str) -> std::path::PathBuf {
        base.join(id.to_lowercase())
    }

    /// Create a handin directory for each student (skipping ones that
    /// already exist), then grant the student write access. Returns the
    /// IDs for which the directory could not be created or opened.
    pub fn create_student_dirs(&self, base: &Path, ids: &[String]) -> Vec<String> {
        let mut bad_ids = Vec::new();
        for id in ids {
            let dir = self.student_dir(base, id);
            if dir.is_dir() {
                if self.verbose {
                    println!("\thandin dir already exists for {}, skipping", id.to_lowercase());
                }
            } else if dir.exists() {
                // A non-directory squatting on the handin path; never hand
                // it to the ACL tool.
                debug!("{} exists but is not a directory", dir.display());
                bad_ids.push(id.clone());
                continue;
            } else if !self.dry_run {
                if let Err(e) = std::fs::create_dir_all(&dir) {
                    debug!("could not create {}: {e}", dir.display());
                    bad_ids.push(id.clone());
                    continue;
                }
            }
            if !self.set_access(id, &dir, Access::Write) {
                bad_ids.push(id.clone());
            }
        }
        bad_ids
    }

    /// Revoke write access: each student drops to read-only.
    pub fn close_dirs(&self, base: &Path, ids: &[String]) -> Vec<String> {
        self.apply_all(base, ids, Access::ReadOnly)
    }

    fn apply_all(&self, base: &Path, ids: &[String], access: Access) -> Vec<String> {
        ids.iter()
            .filter(|id| !self.set_access(id, &self.student_dir(base, id), access))
            .cloned()
            .collect()
    }
}

/// Surface the IDs whose permission mutation failed, once per batch.
pub fn print_bad_ids(ids: &[String]) {
    if ids.is_empty() {
        return;
    }
    println!("\n{} unable to set permissions for", "Error:".red());
    for id in ids {
        println!("\t{id}");
    }
    println!("Please check that each ID is correct and present in the course system.");
}
