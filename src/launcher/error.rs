//! Launcher error types.

use std::path::PathBuf;
use thiserror::Error;

/// Kind of value an option expects, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Port,
    Path,
    ClassName,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Port => write!(f, "port"),
            ValueKind::Path => write!(f, "path"),
            ValueKind::ClassName => write!(f, "class name"),
        }
    }
}

/// Fatal launcher failures. All of these terminate startup with a
/// non-zero exit code; there is no recovery path.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// An option that requires a value was given none.
    #[error("{option} requires a {kind} value")]
    MissingArgument { option: String, kind: ValueKind },

    /// An option value was present but not usable.
    #[error("{option} expects a {kind} value, got {value:?}")]
    MalformedArgument {
        option: String,
        kind: ValueKind,
        value: String,
    },

    /// The resolved runtime binary is missing or not executable.
    #[error("runtime executable not found: {}", path.display())]
    TargetNotFound { path: PathBuf },

    /// Spawning or replacing the process failed.
    #[error("failed to execute runtime: {0}")]
    Io(#[from] std::io::Error),
}
