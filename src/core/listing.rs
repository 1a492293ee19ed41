use crate::error::RekeyError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub is_dir: bool,
}

impl Entry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let is_dir = path.is_dir();

        Self { name, path, is_dir }
    }
}

/// Lists the immediate children of `dir`, files and directories alike, in the
/// order the filesystem returns them.
pub fn list_entries(dir: &Path) -> Result<Vec<Entry>, RekeyError> {
    let metadata = std::fs::metadata(dir).map_err(|e| RekeyError::io(dir, e))?;
    if !metadata.is_dir() {
        return Err(RekeyError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut entries = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| RekeyError::io(dir, e.into()))?;
        entries.push(Entry::new(entry.into_path()));
    }

    Ok(entries)
}
