//! Parsing of `git branch -vv` output.
//!
//! Each local branch is one line:
//!
//! ```text
//! * main      a1b2c3d [origin/main: ahead 2, behind 1] Commit summary
//!   dev       e4f5a6b [origin/dev] Commit summary
//!   old       0a1b2c3 [origin/old: gone] Commit summary
//!   local     9f8e7d6 Commit summary
//! + wt-branch 1234abc (/path/to/worktree) [origin/wt-branch] Commit summary
//! * (HEAD detached at a1b2c3d) a1b2c3d Commit summary
//! ```
//!
//! The first column is `*` for the checked-out branch, `+` for a branch
//! checked out in a linked worktree, and a space otherwise. Parsing never
//! fails as a whole: lines that don't have at least a marker, a name and a
//! commit id are logged and dropped.

use serde::Serialize;

/// One local branch's relationship to its upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchSyncStatus {
    pub name: String,
    /// Checked out in this working tree
    pub current: bool,
    /// Commits present locally but not upstream
    pub ahead: usize,
    /// Commits present upstream but not locally
    pub behind: usize,
    /// The configured upstream no longer exists
    pub gone: bool,
    /// No upstream is configured
    pub no_upstream: bool,
    /// Upstream ref as shown by git, e.g. `origin/main`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
}

impl BranchSyncStatus {
    /// Whether this branch needs attention.
    pub fn is_unsynced(&self) -> bool {
        self.ahead > 0 || self.behind > 0 || self.gone || self.no_upstream
    }
}

/// Parse the full output of `git branch -vv`.
///
/// Order follows git's listing.
pub fn parse_branch_listing(output: &str) -> Vec<BranchSyncStatus> {
    output
        .lines()
        .filter_map(|line| match parse_branch_line(line) {
            Line::Branch(branch) => {
                log::debug!(
                    "Parsed branch: {} (current: {}, ahead: {}, behind: {}, gone: {}, no upstream: {})",
                    branch.name,
                    branch.current,
                    branch.ahead,
                    branch.behind,
                    branch.gone,
                    branch.no_upstream
                );
                Some(branch)
            }
            Line::Detached => {
                log::debug!("Skipping detached HEAD line: {}", line.trim());
                None
            }
            Line::Blank => None,
            Line::Malformed => {
                log::debug!("Skipping line (format mismatch): {}", line.trim());
                None
            }
        })
        .collect()
}

#[derive(Debug, PartialEq)]
enum Line {
    Branch(BranchSyncStatus),
    Detached,
    Blank,
    Malformed,
}

fn parse_branch_line(line: &str) -> Line {
    if line.trim().is_empty() {
        return Line::Blank;
    }

    let mut chars = line.chars();
    let (current, linked_worktree) = match chars.next() {
        Some('*') => (true, false),
        Some('+') => (false, true),
        Some(' ') => (false, false),
        _ => return Line::Malformed,
    };
    let rest = chars.as_str();
    if !rest.starts_with(char::is_whitespace) {
        return Line::Malformed;
    }

    let rest = rest.trim_start();
    if rest.starts_with('(') {
        // "(HEAD detached at …)", "(HEAD detached from …)", "(no branch, rebasing …)"
        return Line::Detached;
    }

    let Some((name, rest)) = next_token(rest) else {
        return Line::Malformed;
    };
    let Some((hash, rest)) = next_token(rest) else {
        return Line::Malformed;
    };
    if !hash.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Line::Malformed;
    }

    let mut rest = rest;
    if linked_worktree
        && rest.starts_with('(')
        && let Some(close) = rest.find(')')
    {
        rest = rest[close + 1..].trim_start();
    }

    let mut branch = BranchSyncStatus {
        name: name.to_string(),
        current,
        ..Default::default()
    };

    match tracking_clause(rest) {
        Some(clause) => apply_tracking_clause(&mut branch, clause),
        None => branch.no_upstream = true,
    }

    Line::Branch(branch)
}

/// Split off the next whitespace-delimited token.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], s[end..].trim_start())),
        None => Some((s, "")),
    }
}

/// The contents of a bracketed clause at the start of `s`, if any.
fn tracking_clause(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('[')?;
    let close = inner.find(']')?;
    Some(&inner[..close])
}

/// Apply `origin/main`, `origin/main: gone`, or
/// `origin/main: ahead N, behind M` to `branch`.
///
/// `gone` and ahead/behind are read independently; if git ever prints both,
/// both are recorded.
fn apply_tracking_clause(branch: &mut BranchSyncStatus, clause: &str) {
    let (upstream, state) = match clause.split_once(':') {
        Some((upstream, state)) => (upstream.trim(), state),
        None => (clause.trim(), ""),
    };
    branch.upstream = Some(upstream.to_string());

    for part in state.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let mut words = part.split_whitespace();
        match (words.next(), words.next()) {
            (Some("gone"), None) => branch.gone = true,
            (Some("ahead"), count) => branch.ahead = parse_count(count, clause),
            (Some("behind"), count) => branch.behind = parse_count(count, clause),
            _ => log::debug!("Ignoring tracking state '{}' in [{}]", part, clause),
        }
    }
}

fn parse_count(count: Option<&str>, clause: &str) -> usize {
    match count.map(str::parse::<usize>) {
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            log::warn!("Failed to parse count in '{}': {}", clause, e);
            0
        }
        None => {
            log::warn!("Missing count in '{}'", clause);
            0
        }
    }
}
