//! Handin window commands: open (create + grant write) and close
//! (drop to read-only).

use crate::perms::{print_bad_ids, PermissionManager};
use crate::settings::Settings;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn open(
    settings: &Settings,
    roster_path: Option<PathBuf>,
    students: Vec<String>,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let ids = super::resolve_ids(settings, roster_path, students)?;
    let mut manager = PermissionManager::new(&settings.group);
    manager.dry_run = dry_run;
    manager.verbose = verbose;

    println!(
        "Opening {} handin directories under {}",
        ids.len(),
        settings.handin_dir.display()
    );
    let bad_ids = manager.create_student_dirs(&settings.handin_dir, &ids);
    print_bad_ids(&bad_ids);
    if bad_ids.is_empty() {
        println!("{}", "All handin directories opened.".green());
    }
    Ok(())
}

pub fn close(
    settings: &Settings,
    roster_path: Option<PathBuf>,
    students: Vec<String>,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    let ids = super::resolve_ids(settings, roster_path, students)?;
    let mut manager = PermissionManager::new(&settings.group);
    manager.dry_run = dry_run;
    manager.verbose = verbose;

    println!(
        "Closing {} handin directories under {}",
        ids.len(),
        settings.handin_dir.display()
    );
    let bad_ids = manager.close_dirs(&settings.handin_dir, &ids);
    print_bad_ids(&bad_ids);
    if bad_ids.is_empty() {
        println!("{}", "All handin directories closed.".green());
    }
    Ok(())
}
