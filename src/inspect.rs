//! Per-repository inspection.
//!
//! Runs the branch listing and working tree probes for one repository and
//! folds them into a [`RepositoryResult`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::ScanConfig;
use crate::git::{BranchSyncStatus, GitError, Repository, WorkdirStatus};
use crate::sync::CancellationToken;

/// Outcome of inspecting one repository.
///
/// When `error` is set the branch listing failed: `branches` is empty and
/// `workdir` is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryResult {
    pub path: PathBuf,
    /// Branches in git's listing order, filtered by `show_all`
    pub branches: Vec<BranchSyncStatus>,
    /// Any branch (before filtering) is ahead, behind, gone or untracked
    pub has_unsynced: bool,
    pub workdir: WorkdirStatus,
    pub has_uncommitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GitError>,
}

impl RepositoryResult {
    /// A result for a repository whose branches could not be listed.
    pub fn failed(path: impl Into<PathBuf>, error: GitError) -> Self {
        Self {
            path: path.into(),
            branches: Vec::new(),
            has_unsynced: false,
            workdir: WorkdirStatus::default(),
            has_uncommitted: false,
            error: Some(error),
        }
    }

    /// Build a result from unfiltered branches.
    ///
    /// The aggregate flags are computed before filtering, so hiding synced
    /// branches never changes `has_unsynced`.
    pub fn from_parts(
        path: impl Into<PathBuf>,
        branches: Vec<BranchSyncStatus>,
        workdir: WorkdirStatus,
        show_all: bool,
    ) -> Self {
        let has_unsynced = branches.iter().any(BranchSyncStatus::is_unsynced);
        let branches = if show_all {
            branches
        } else {
            branches.into_iter().filter(|b| b.is_unsynced()).collect()
        };

        Self {
            path: path.into(),
            branches,
            has_unsynced,
            workdir,
            has_uncommitted: !workdir.is_clean(),
            error: None,
        }
    }

    /// Worth showing without `--all`.
    pub fn needs_attention(&self) -> bool {
        self.has_unsynced || self.has_uncommitted
    }
}

/// The inspection was interrupted by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inspection cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Inspect the repository rooted at `path`.
///
/// A failing branch listing yields an errored result and skips the working
/// tree probe. A failing working tree probe is logged and leaves a zero
/// [`WorkdirStatus`]. Only cancellation is returned as `Err`.
pub fn inspect_repository(
    path: &Path,
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<RepositoryResult, Cancelled> {
    log::debug!("Analyzing branches in repo: {}", path.display());

    let repo = Repository::at(path)
        .with_timeout(config.timeout)
        .with_cancellation(cancel);

    let branches = match repo.branch_statuses() {
        Ok(branches) => branches,
        Err(e) if e.is_cancelled() => return Err(Cancelled),
        Err(e) => {
            log::error!("Failed to list branches in {}: {}", path.display(), e);
            return Ok(RepositoryResult::failed(path, e));
        }
    };

    let workdir = match repo.workdir_status() {
        Ok(workdir) => workdir,
        Err(e) if e.is_cancelled() => return Err(Cancelled),
        Err(e) => {
            log::warn!("Failed to read working tree status in {}: {}", path.display(), e);
            WorkdirStatus::default()
        }
    };

    let result = RepositoryResult::from_parts(path, branches, workdir, config.show_all);
    log::debug!(
        "Repo {}: {} branches shown, unsynced: {}, uncommitted: {}",
        path.display(),
        result.branches.len(),
        result.has_unsynced,
        result.has_uncommitted
    );
    Ok(result)
}
