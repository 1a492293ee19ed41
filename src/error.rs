use std::path::PathBuf;

/// Everything that can go wrong while listing the target or rewriting an entry.
#[derive(Debug, thiserror::Error)]
pub enum RekeyError {
    #[error("'{}' is not a regular file", .path.display())]
    NotAFile { path: PathBuf },

    #[error("'{}' is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("'{}' is not valid JSON: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{}' has no top-level key '{key}'", .path.display())]
    MissingKey { path: PathBuf, key: String },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RekeyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable identifier used in JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAFile { .. } => "not_a_file",
            Self::NotADirectory { .. } => "not_a_directory",
            Self::InvalidJson { .. } => "invalid_json",
            Self::MissingKey { .. } => "missing_key",
            Self::Io { .. } => "io",
        }
    }
}
