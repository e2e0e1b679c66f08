//! Roster loading: one student ID per line, `#` comments and blank lines
//! ignored.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn load_roster(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_roster_skips_blanks_and_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.txt");
        fs::write(&path, "# spring roster\nabc\n\n  xyz  \n# trailing note\n").unwrap();

        let roster = load_roster(&path).unwrap();
        assert_eq!(roster, vec!["abc", "xyz"]);
    }

    #[test]
    fn test_load_roster_preserves_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.txt");
        fs::write(&path, "zeta\nalpha\nmike\n").unwrap();
        assert_eq!(load_roster(&path).unwrap(), vec!["zeta", "alpha", "mike"]);
    }

    #[test]
    fn test_missing_roster_is_an_error() {
        let err = load_roster(Path::new("/nonexistent/roster.txt")).unwrap_err();
        assert!(err.to_string().contains("failed to read roster"));
    }
}
