//! Git error type.
//!
//! Per-repository failures are values, not aborts: the inspector stores a
//! `GitError` in the repository's result and the scan moves on.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::shell_exec::CommandError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitError {
    /// A git invocation did not succeed
    CommandFailed {
        command: String,
        error: CommandError,
    },
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitError::CommandFailed { command, error } => {
                write!(f, "`{command}` failed: {error}")
            }
        }
    }
}

impl std::error::Error for GitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GitError::CommandFailed { error, .. } => Some(error),
        }
    }
}

/// Errors serialize as their display string in JSON output.
impl Serialize for GitError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
