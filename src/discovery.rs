//! Directory scanning for suites, groups, cases and suite configuration files

use crate::config::Configuration;
use crate::error::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which kind of directory entry a scan collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Dir,
}

/// Convert a simple glob pattern (only `*` is special) into an anchored regex
pub fn glob_regex(pattern: &str) -> Result<Regex> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Ok(Regex::new(&format!("^{}$", escaped))?)
}

/// Immediate children of `dir` of the given type whose file name matches `pattern`
///
/// Results are sorted for a deterministic execution order.
pub fn entries(dir: &Path, entry_type: EntryType, pattern: &Regex) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let wanted = match entry_type {
            EntryType::File => entry.file_type().is_file(),
            EntryType::Dir => entry.file_type().is_dir(),
        };
        if !wanted {
            continue;
        }
        if let Some(file_name) = entry.file_name().to_str() {
            if pattern.is_match(file_name) {
                found.push(entry.path().to_path_buf());
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Suite directories under the configured root
///
/// When no child matches, the root itself is the suite if its own name
/// matches the pattern.
pub fn suite_directories(configuration: &Configuration) -> Result<Vec<PathBuf>> {
    let pattern = glob_regex(&configuration.suite_pattern)?;
    let mut suites = entries(&configuration.root, EntryType::Dir, &pattern)?;

    if suites.is_empty() {
        let root_matches = configuration
            .root
            .canonicalize()?
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| pattern.is_match(name));
        if root_matches {
            suites.push(configuration.root.clone());
        }
    }

    if suites.is_empty() {
        return Err(Error::NoSuites {
            root: configuration.root.display().to_string(),
            pattern: configuration.suite_pattern.clone(),
        });
    }
    log::debug!("Discovered {} suite(s) under {}", suites.len(), configuration.root.display());
    Ok(suites)
}
