//! Terminal and scratch-space cleanup shared by the exit paths.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use tempfile::TempDir;

const ATTR_RESET: &str = "\x1B[0m";

static PANIC_HOOK_INSTALLED: Once = Once::new();
static SCRATCH_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Reset text attributes and flush stdout, so an interrupted run doesn't
/// leave the shell stuck mid-color from a half-written diagnostic.
pub fn reset_terminal() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(format!("{ATTR_RESET}\n").as_bytes());
    let _ = stdout.flush();
}

/// Parent directory for per-compile scratch directories. Keeping them all
/// under one process-scoped root lets the interrupt and panic paths remove
/// everything in a single pass, where destructors won't run.
pub fn scratch_root() -> &'static Path {
    SCRATCH_ROOT
        .get_or_init(|| std::env::temp_dir().join(format!("handin-{}", std::process::id())))
}

/// Create a fresh scratch directory for one compile invocation. Removed
/// automatically on drop; the interrupt/panic paths sweep the whole root
/// instead.
pub fn scratch_dir() -> io::Result<TempDir> {
    let root = scratch_root();
    std::fs::create_dir_all(root)?;
    TempDir::new_in(root)
}

/// Remove all scratch state. Safe to call repeatedly, including when no
/// scratch directory was ever created.
pub fn cleanup_scratch() {
    if let Some(root) = SCRATCH_ROOT.get() {
        let _ = std::fs::remove_dir_all(root);
    }
}

/// Install a panic hook that cleans up scratch space and restores the
/// terminal before the default handler runs. Safe to call multiple times.
pub fn install_cleanup_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            cleanup_scratch();
            reset_terminal();
            default_hook(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_scratch_root_is_stable() {
        let first = scratch_root();
        let second = scratch_root();
        assert_eq!(first, second);
        assert!(first
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("handin-"));
    }

    #[test]
    #[serial(scratch)]
    fn test_scratch_dirs_live_under_root() {
        let scratch = scratch_dir().unwrap();
        assert!(scratch.path().starts_with(scratch_root()));
    }

    #[test]
    #[serial(scratch)]
    fn test_cleanup_scratch_is_idempotent() {
        let scratch = scratch_dir().unwrap();
        let path = scratch.path().to_path_buf();
        drop(scratch);

        cleanup_scratch();
        assert!(!path.exists());
        assert!(!scratch_root().exists());
        // Second pass over missing state is fine
        cleanup_scratch();
        // And scratch creation recovers afterwards
        let again = scratch_dir().unwrap();
        assert!(again.path().exists());
    }
}
