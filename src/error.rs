//! Error types for planning, moving, configuration, and the CLI driver.
//!
//! Planning errors are fatal to the requested operation. Move failures are
//! per-entry values collected into a [`RunSummary`](crate::executor::RunSummary)
//! and never abort a run.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a plan from being built at all.
#[derive(Error, Debug)]
pub enum PlanError {
    /// A required root path was empty or unset.
    #[error("invalid input: {field} directory must not be empty")]
    InvalidInput { field: &'static str },

    /// The source root does not exist, is not a directory, or cannot be listed.
    #[error("source directory {path} cannot be read: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single plan entry could not be moved.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveFailure {
    #[error("source file not found")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    /// The destination is already taken, either by an earlier entry of the
    /// same run or by a file that existed before the run.
    #[error("destination already occupied")]
    DestinationOccupied,

    #[error("source and destination are on different filesystems")]
    CrossDevice,

    #[error("could not create destination directory: {reason}")]
    DirectoryCreation { reason: String },

    #[error("copy verification failed: expected {expected} bytes, found {actual}")]
    VerificationFailed { expected: u64, actual: u64 },

    #[error("{reason}")]
    Io { reason: String },
}

impl From<io::Error> for MoveFailure {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => MoveFailure::NotFound,
            io::ErrorKind::PermissionDenied => MoveFailure::PermissionDenied,
            io::ErrorKind::AlreadyExists => MoveFailure::DestinationOccupied,
            io::ErrorKind::CrossesDevices => MoveFailure::CrossDevice,
            _ => MoveFailure::Io {
                reason: err.to_string(),
            },
        }
    }
}

/// Errors raised while loading or compiling the configuration file.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid glob pattern '{0}': expected *.ext or dir/**")]
    InvalidGlobPattern(String),

    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("IO error reading configuration: {0}")]
    Io(String),
}

/// Top-level error for the command-line driver.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("the {0} worker thread panicked")]
    Worker(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_unreadable_includes_path() {
        let error = PlanError::SourceUnreadable {
            path: PathBuf::from("/photos/inbox"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/inbox"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn invalid_input_names_the_field() {
        let error = PlanError::InvalidInput {
            field: "destination",
        };
        assert!(error.to_string().contains("destination"));
    }

    #[test]
    fn io_errors_map_to_move_failures() {
        let cases = [
            (io::ErrorKind::NotFound, MoveFailure::NotFound),
            (io::ErrorKind::PermissionDenied, MoveFailure::PermissionDenied),
            (io::ErrorKind::AlreadyExists, MoveFailure::DestinationOccupied),
            (io::ErrorKind::CrossesDevices, MoveFailure::CrossDevice),
        ];
        for (kind, expected) in cases {
            assert_eq!(MoveFailure::from(io::Error::from(kind)), expected);
        }

        let other = MoveFailure::from(io::Error::other("disk on fire"));
        assert_eq!(
            other,
            MoveFailure::Io {
                reason: "disk on fire".to_string()
            }
        );
    }

    #[test]
    fn move_failure_serializes_with_kind_tag() {
        let json = serde_json::to_string(&MoveFailure::DestinationOccupied).unwrap();
        assert_eq!(json, r#"{"kind":"destination_occupied"}"#);
    }
}
