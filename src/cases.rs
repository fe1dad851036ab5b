//! Purpose: Case-file discovery and path resolution.
//! Exports: `list_cases`, `resolve_case_path`, `CASE_EXTENSIONS`.
//! Role: Maps caller-supplied case identifiers onto filesystem paths.
//! Invariants: Listings are sorted, relative, and forward-slash separated.
//! Invariants: Resolution prefers the cases directory over the path as given.

use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind};

/// Case formats the engine boundary accepts.
pub const CASE_EXTENSIONS: [&str; 3] = ["xlsx", "raw", "json"];

/// Recursively list recognized case files under `cases_dir`, as sorted
/// forward-slash relative paths. A missing directory yields an empty list.
pub fn list_cases(cases_dir: &Path) -> Vec<String> {
    let mut found = Vec::new();
    collect_cases(cases_dir, cases_dir, &mut found);
    found.sort();
    found
}

fn collect_cases(root: &Path, dir: &Path, found: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_cases(root, &path, found);
            continue;
        }
        if !has_case_extension(&path) {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            found.push(parts.join("/"));
        }
    }
}

fn has_case_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CASE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Resolve a caller-supplied case path: relative to the cases directory first,
/// then as given. Fails with `NotFound` when neither exists.
pub fn resolve_case_path(cases_dir: &Path, case_path: &str) -> Result<PathBuf, Error> {
    let candidate = cases_dir.join(case_path);
    if candidate.is_file() {
        return Ok(candidate);
    }
    let as_given = PathBuf::from(case_path);
    if as_given.is_file() {
        return Ok(as_given);
    }
    Err(Error::new(ErrorKind::NotFound)
        .with_message(format!("Case file not found: {case_path}"))
        .with_path(candidate))
}
