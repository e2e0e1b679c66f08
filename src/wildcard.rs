//! Wildcard expansion for checklist file patterns.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Whether a pattern needs glob expansion before use.
pub fn has_wildcard(pattern: &str) -> bool {
    pattern.contains('*')
}

/// Expand a pattern list against `dir`, returning the sorted duplicate-free
/// union. Non-wildcard patterns are kept verbatim whether or not the file
/// exists (the existence check reports on them); wildcard patterns that
/// match nothing contribute nothing.
pub fn resolve_patterns(patterns: &[String], dir: &Path) -> Vec<String> {
    let mut resolved = BTreeSet::new();
    for pattern in patterns {
        if !has_wildcard(pattern) {
            resolved.insert(pattern.clone());
            continue;
        }
        let full = dir.join(pattern);
        let paths = match glob::glob(&full.to_string_lossy()) {
            Ok(paths) => paths,
            Err(e) => {
                debug!("skipping unparseable pattern '{pattern}': {e}");
                continue;
            }
        };
        for path in paths.filter_map(|p| p.ok()) {
            if let Ok(rel) = path.strip_prefix(dir) {
                resolved.insert(rel.to_string_lossy().into_owned());
            }
        }
    }
    resolved.into_iter().collect()
}
