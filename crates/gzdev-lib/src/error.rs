use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GzdevError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration in {path}: {details}")]
    ConfigValidation { path: String, details: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown project: {project}")]
    UnknownProject { project: String },

    #[error("No repository named {repository} in the configuration")]
    RepositoryNotFound { repository: String },

    #[error("Unknown repository or type: {repository}/{repo_type} (linux distro {distro_family})")]
    RepositoryTypeNotFound {
        repository: String,
        repo_type: String,
        distro_family: String,
    },

    #[error("Failed to download key from {url}: {reason}")]
    KeyDownload { url: String, reason: String },

    #[error("Key {key} was not found in file {path}")]
    KeyMismatch { key: String, path: PathBuf },

    #[error("No permission to modify {path}")]
    Permission { path: PathBuf },

    #[error("Command '{command}' failed: {reason}")]
    ExternalCommand { command: String, reason: String },

    #[error("Failed to detect the host linux distribution: {details}")]
    PlatformDetection { details: String },

    #[error("Invalid command-line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

impl GzdevError {
    /// Maps a filesystem error on `path`, keeping permission failures distinct
    /// so installers can recover from them.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            GzdevError::Permission { path: path.into() }
        } else {
            GzdevError::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_from_io_permission_denied() {
        let err = GzdevError::from_io("/etc/apt/x.list", Error::from(ErrorKind::PermissionDenied));
        assert!(matches!(err, GzdevError::Permission { path } if path == PathBuf::from("/etc/apt/x.list")));
    }

    #[test]
    fn test_from_io_other_kinds_stay_io() {
        let err = GzdevError::from_io("/tmp/x", Error::from(ErrorKind::NotFound));
        assert!(matches!(err, GzdevError::Io(_)));
    }
}
