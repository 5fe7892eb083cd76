use super::layout::{InstallLayout, KEY_EXTENSION, SOURCE_EXTENSION};
use crate::error::GzdevError;
use regex::Regex;
use std::path::Path;

/// Best-effort, non-recursive removal of every file in `directory` whose name
/// matches `pattern`. Returns how many files were removed.
pub fn remove_all(directory: &Path, pattern: &Regex) -> usize {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Nothing to clean up, {} does not exist", directory.display());
            return 0;
        }
        Err(e) => {
            tracing::warn!("Cannot scan {}: {}", directory.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Cannot read entry in {}: {}", directory.display(), e);
                continue;
            }
        };
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let file_name = entry.file_name();
        if !file_name.to_str().is_some_and(|name| pattern.is_match(name)) {
            continue;
        }

        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("Removed {}", path.display());
                removed += 1;
            }
            Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
    removed
}

/// Removes every source list and key file installed under `layout`.
pub fn remove_installed_artifacts(layout: &InstallLayout) -> Result<usize, GzdevError> {
    let sources = remove_all(&layout.sources_dir, &layout.artifact_pattern(SOURCE_EXTENSION)?);
    let keys = remove_all(&layout.keyring_dir, &layout.artifact_pattern(KEY_EXTENSION)?);
    tracing::info!(sources, keys, "Cleaned up previous installations");
    Ok(sources + keys)
}
