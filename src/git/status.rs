//! Parsing of `git status --porcelain` output.

use serde::Serialize;

/// Working tree cleanliness summary for one repository.
///
/// A file staged and then modified again counts in both `staged` and
/// `modified`; the counters are independent per status column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkdirStatus {
    /// Tracked files changed in the working tree but not staged
    pub modified: usize,
    /// Changes recorded in the index
    pub staged: usize,
    /// Files neither tracked nor ignored
    pub untracked: usize,
}

impl WorkdirStatus {
    pub fn is_clean(&self) -> bool {
        self.modified == 0 && self.staged == 0 && self.untracked == 0
    }
}

/// Count entries in porcelain v1 output.
///
/// Each entry line is `XY <path>`, where X is the index status and Y the
/// worktree status. `??` is untracked, `!!` is ignored.
pub fn parse_porcelain_status(output: &str) -> WorkdirStatus {
    let mut status = WorkdirStatus::default();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }

        let mut columns = line.chars();
        let (Some(index), Some(worktree)) = (columns.next(), columns.next()) else {
            log::debug!("Skipping short status line: {}", line);
            continue;
        };

        match (index, worktree) {
            ('?', '?') => status.untracked += 1,
            ('!', '!') => {}
            (index, worktree) => {
                if index != ' ' && index != '?' {
                    status.staged += 1;
                }
                if worktree != ' ' && worktree != '?' {
                    status.modified += 1;
                }
            }
        }
    }

    status
}
