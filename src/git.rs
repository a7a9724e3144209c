//! Git invocation and output parsing.
//!
//! Only two git commands are ever run, both read-only:
//! `git branch -vv --no-color` for upstream tracking state and
//! `git status --porcelain` for working tree state.

use std::path::PathBuf;
use std::time::Duration;

use crate::shell_exec::{Cmd, CommandError, DEFAULT_TIMEOUT};
use crate::sync::CancellationToken;

mod branches;
mod error;
mod status;

pub use branches::{BranchSyncStatus, parse_branch_listing};
pub use error::GitError;
pub use status::{WorkdirStatus, parse_porcelain_status};

/// Name of the metadata directory that marks a repository root.
pub const GIT_DIR_NAME: &str = ".git";

/// Repository context for git operations.
///
/// Wraps the repository path together with the per-command timeout and the
/// cancellation token of the surrounding scan.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    timeout: Duration,
    cancel: CancellationToken,
}

impl Repository {
    /// Create a repository context at the specified path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: &CancellationToken) -> Self {
        self.cancel = token.clone();
        self
    }

    /// List local branches with their upstream tracking state.
    pub fn branch_statuses(&self) -> Result<Vec<BranchSyncStatus>, GitError> {
        let stdout = self.run_command(&["branch", "-vv", "--no-color"])?;
        Ok(parse_branch_listing(&stdout))
    }

    /// Count modified, staged and untracked entries in the working tree.
    pub fn workdir_status(&self) -> Result<WorkdirStatus, GitError> {
        let stdout = self.run_command(&["status", "--porcelain"])?;
        Ok(parse_porcelain_status(&stdout))
    }

    /// Run a git command in this repository's context and return its stdout.
    ///
    /// `GIT_DIR` and `GIT_WORK_TREE` pin git to this root: a broken `.git`
    /// must fail here rather than resolve to an enclosing repository.
    /// `LC_ALL=C` keeps the output in the untranslated format the parsers
    /// expect, and `GIT_OPTIONAL_LOCKS=0` stops `git status` from refreshing
    /// the index, so scanning never writes to a repository.
    pub fn run_command(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Cmd::new("git")
            .args(args.iter().copied())
            .current_dir(&self.path)
            .env("GIT_DIR", self.path.join(GIT_DIR_NAME))
            .env("GIT_WORK_TREE", &self.path)
            .env("LC_ALL", "C")
            .env("GIT_OPTIONAL_LOCKS", "0")
            .timeout(self.timeout)
            .cancel_with(&self.cancel)
            .run()
            .map_err(|error| GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                error,
            })?;

        Ok(output.stdout)
    }
}

impl GitError {
    /// True when the command was interrupted by the scan's cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            GitError::CommandFailed {
                error: CommandError::Cancelled,
                ..
            }
        )
    }
}
