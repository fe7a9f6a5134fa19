use std::fs;
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;

use super::{ListingError, PathState};

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    pub modified_at: SystemTime,
    /// Only meaningful when `!is_dir`
    pub size_bytes: u64,
}

impl DirectoryEntry {
    pub fn file(name: &str, size_bytes: u64, modified_at: SystemTime) -> Self {
        Self {
            name: name.to_string(),
            is_dir: false,
            modified_at,
            size_bytes,
        }
    }

    pub fn dir(name: &str, modified_at: SystemTime) -> Self {
        Self {
            name: name.to_string(),
            is_dir: true,
            modified_at,
            size_bytes: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListingOptions {
    /// Names hidden from the route's own root directory
    pub exclude: Vec<String>,
    pub show_hidden: bool,
}

/// Read the direct children of `dir`.
///
/// Any failure while enumerating, including on a single child, fails the
/// whole listing. The order of the result is whatever the OS returns.
pub fn read_entries(
    dir: &Path,
    state: &PathState,
    options: &ListingOptions,
) -> Result<Vec<DirectoryEntry>, ListingError> {
    let metadata = fs::metadata(dir).map_err(|e| ListingError::io(dir, e))?;
    if !metadata.is_dir() {
        return Err(ListingError::NotADirectory(dir.to_path_buf()));
    }

    let exclude_here = state.is_current_dir();
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| ListingError::io(dir, e))? {
        let entry = entry.map_err(|e| ListingError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();

        if !options.show_hidden && name.starts_with('.') {
            continue;
        }

        if exclude_here && options.exclude.iter().any(|excluded| *excluded == name) {
            debug!(name = %name, "excluded from listing");
            continue;
        }

        let path = entry.path();
        // Follow symlinks; a dangling one still gets listed with its own metadata
        let metadata = fs::metadata(&path)
            .or_else(|_| entry.metadata())
            .map_err(|e| ListingError::io(&path, e))?;

        let modified_at = metadata
            .modified()
            .map_err(|e| ListingError::io(&path, e))?;

        entries.push(DirectoryEntry {
            name,
            is_dir: metadata.is_dir(),
            modified_at,
            size_bytes: metadata.len(),
        });
    }

    debug!(dir = %dir.display(), count = entries.len(), "read directory");
    Ok(entries)
}
