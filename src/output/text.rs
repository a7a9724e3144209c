//! Line-oriented text output.
//!
//! ```text
//! /home/me/src/app/main [current] (ahead 2, behind 1)
//! /home/me/src/app/old-feature (gone)
//! /home/me/src/app (uncommitted: 1 modified, 2 untracked)
//! ```

use std::path::Path;

use crate::git::{BranchSyncStatus, WorkdirStatus};
use crate::inspect::RepositoryResult;
use crate::styling::{
    AHEAD, BEHIND, CURRENT, DIVERGED, GONE, HINT, NO_UPSTREAM, StyledLine, UNCOMMITTED,
};

/// Printed when nothing needs attention and `--all` is off.
pub const NOTHING_TO_REPORT: &str =
    "No git repositories with unsynced branches or uncommitted changes found.";

/// Render all results.
///
/// Errored results are skipped; they surface through the log. Without
/// `show_all`, repositories that need no attention are skipped too.
pub fn render_text(results: &[RepositoryResult], show_all: bool) -> Vec<StyledLine> {
    let mut lines = Vec::new();

    for result in results.iter().filter(|r| r.error.is_none()) {
        if !show_all && !result.needs_attention() {
            continue;
        }

        for branch in &result.branches {
            lines.push(render_branch_line(&result.path, branch));
        }

        if result.has_uncommitted {
            lines.push(render_workdir_line(&result.path, &result.workdir));
        } else if show_all && result.branches.is_empty() {
            let mut line = StyledLine::new();
            line.push_raw(result.path.display().to_string());
            line.push_styled(" (clean)", HINT);
            lines.push(line);
        }
    }

    if lines.is_empty() && !show_all {
        let mut line = StyledLine::new();
        line.push_raw(NOTHING_TO_REPORT);
        lines.push(line);
    }

    lines
}

/// `<repo>/<branch> [current] (<details>)`
pub fn render_branch_line(repo: &Path, branch: &BranchSyncStatus) -> StyledLine {
    let mut text = repo.join(&branch.name).display().to_string();
    if branch.current {
        text.push_str(" [current]");
    }

    let details = if branch.no_upstream {
        vec!["no upstream".to_string()]
    } else if branch.gone {
        vec!["gone".to_string()]
    } else {
        let mut details = Vec::new();
        if branch.ahead > 0 {
            details.push(format!("ahead {}", branch.ahead));
        }
        if branch.behind > 0 {
            details.push(format!("behind {}", branch.behind));
        }
        details
    };
    if !details.is_empty() {
        text.push_str(&format!(" ({})", details.join(", ")));
    }

    let style = if branch.no_upstream {
        Some(NO_UPSTREAM)
    } else if branch.gone {
        Some(GONE)
    } else if branch.ahead > 0 && branch.behind > 0 {
        Some(DIVERGED)
    } else if branch.ahead > 0 {
        Some(AHEAD)
    } else if branch.behind > 0 {
        Some(BEHIND)
    } else if branch.current {
        Some(CURRENT)
    } else {
        None
    };

    let mut line = StyledLine::new();
    match style {
        Some(style) => line.push_styled(text, style),
        None => line.push_raw(text),
    }
    line
}

/// `<repo> (uncommitted: N modified, N staged, N untracked)`, zero counts omitted.
pub fn render_workdir_line(repo: &Path, workdir: &WorkdirStatus) -> StyledLine {
    let counts: Vec<String> = [
        (workdir.modified, "modified"),
        (workdir.staged, "staged"),
        (workdir.untracked, "untracked"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{n} {label}"))
    .collect();

    let mut line = StyledLine::new();
    line.push_raw(repo.display().to_string());
    line.push_styled(format!(" (uncommitted: {})", counts.join(", ")), UNCOMMITTED);
    line
}
