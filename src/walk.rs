//! Directory traversal and repository discovery.
//!
//! The walk is depth-first and pre-order, with entries sorted by file name
//! so output order is stable across runs. For each directory:
//!
//! 1. stop if the scan was cancelled,
//! 2. skip the subtree if its name is on the skip list, the root included,
//! 3. if it holds a `.git` *directory*, inspect it and hand the result to
//!    the sink, then keep descending so nested repositories are found too.
//!
//! Depth is bounded by [`ScanConfig::max_depth`]: a directory at depth `d`
//! (root = 0) is visited only when `max_depth == 0 || d < max_depth`.

use std::fmt;

use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::git::GIT_DIR_NAME;
use crate::inspect::{RepositoryResult, inspect_repository};
use crate::sync::CancellationToken;

/// Receives one result per discovered repository, in discovery order.
pub trait ResultSink {
    fn deliver(&mut self, result: RepositoryResult);
}

impl<F> ResultSink for F
where
    F: FnMut(RepositoryResult),
{
    fn deliver(&mut self, result: RepositoryResult) {
        self(result)
    }
}

/// Counters for a finished walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub directories: usize,
    pub repositories: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkError {
    /// The cancellation token fired; results already delivered stand
    Cancelled,
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkError::Cancelled => write!(f, "scan cancelled"),
        }
    }
}

impl std::error::Error for WalkError {}

/// Walk `config.root`, inspecting every repository found.
///
/// Directory listing errors are logged and the walk continues with the
/// next sibling. Only cancellation ends the walk early.
pub fn walk(
    config: &ScanConfig,
    cancel: &CancellationToken,
    mut sink: impl ResultSink,
) -> Result<WalkSummary, WalkError> {
    log::info!("Starting scan from: {}", config.root.display());

    let mut walker = WalkDir::new(&config.root)
        .follow_links(false)
        .sort_by_file_name();
    if config.max_depth > 0 {
        walker = walker.max_depth(config.max_depth - 1);
    }

    let mut summary = WalkSummary::default();
    let mut entries = walker.into_iter();

    while let Some(entry) = entries.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                log::warn!("Error accessing path {}: {}", path, e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        if cancel.is_cancelled() {
            log::info!("Scan cancelled at {}", entry.path().display());
            return Err(WalkError::Cancelled);
        }

        debug_assert!(config.within_depth(entry.depth()));

        let name = entry.file_name();
        if name == GIT_DIR_NAME || config.is_ignored(name) {
            log::debug!("Skipping directory: {}", entry.path().display());
            entries.skip_current_dir();
            continue;
        }

        summary.directories += 1;
        log::debug!("Checking directory: {}", entry.path().display());

        let git_dir = entry.path().join(GIT_DIR_NAME);
        match std::fs::metadata(&git_dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                // A .git file points at a git dir elsewhere (linked worktree
                // or submodule checkout); not a repository root.
                log::debug!("Ignoring .git file in {}", entry.path().display());
                continue;
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::debug!("Error checking for .git in {}: {}", entry.path().display(), e);
                }
                continue;
            }
        }

        log::debug!("Found git repo: {}", entry.path().display());
        let result = match inspect_repository(entry.path(), config, cancel) {
            Ok(result) => result,
            Err(_) => {
                log::info!("Scan cancelled while inspecting {}", entry.path().display());
                return Err(WalkError::Cancelled);
            }
        };

        summary.repositories += 1;
        if result.error.is_some() {
            summary.failed += 1;
        }
        sink.deliver(result);
    }

    log::info!(
        "Scan complete. Found {} repositories in {} directories.",
        summary.repositories,
        summary.directories
    );
    Ok(summary)
}
