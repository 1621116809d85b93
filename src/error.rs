//! Error taxonomy shared by every engine operation
//!
//! Each variant maps to a short category code and a process exit status so
//! that scripts can tell a privilege failure from a missing container.

use crate::manager::ContainerState;
use crate::runtime::RuntimeError;

#[derive(Debug, thiserror::Error)]
pub enum LlxcError {
    #[error("must run with elevated privilege (this function requires root)")]
    PermissionDenied,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("container not found: {0}")]
    NotFound(String),

    #[error("no archive found for container: {0}")]
    ArchiveNotFound(String),

    #[error("no host SSH keypair at {0} (run gensshkeys first)")]
    KeypairNotFound(String),

    #[error("{name} must be {required} to do that (currently {actual})")]
    InvalidState {
        name: String,
        required: ContainerState,
        actual: ContainerState,
    },

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("failed to {op} {name}: {reason}")]
    OperationFailed {
        name: String,
        op: &'static str,
        reason: String,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LlxcError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Convert a runtime failure for a named operation
    pub fn runtime(name: &str, op: &'static str, err: RuntimeError) -> Self {
        Self::OperationFailed {
            name: name.to_string(),
            op,
            reason: err.to_string(),
        }
    }

    /// Short category code printed in front of the message
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "403",
            Self::InvalidArgument(_) => "400",
            Self::NotFound(_) | Self::ArchiveNotFound(_) | Self::KeypairNotFound(_) => "404",
            Self::InvalidState { .. } | Self::AlreadyExists(_) => "409",
            Self::OperationFailed { .. } | Self::Io { .. } => "500",
        }
    }

    /// Process exit status for this error
    ///
    /// A missing argument exits with 404 like a missing container.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PermissionDenied => 403,
            Self::InvalidArgument(_)
            | Self::NotFound(_)
            | Self::ArchiveNotFound(_)
            | Self::KeypairNotFound(_) => 404,
            Self::InvalidState { .. } | Self::AlreadyExists(_) => 409,
            Self::OperationFailed { .. } | Self::Io { .. } => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, LlxcError>;
