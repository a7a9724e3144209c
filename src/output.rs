//! Rendering of scan results.
//!
//! The walker streams [`RepositoryResult`]s; the binary collects them and
//! renders the batch in one of the [`OutputFormat`]s once the walk ends.

use clap::ValueEnum;

use crate::inspect::RepositoryResult;

mod json;
mod text;

pub use json::render_json;
pub use text::{NOTHING_TO_REPORT, render_branch_line, render_text, render_workdir_line};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One colored line per branch or dirty working tree
    #[default]
    Text,
    /// A JSON array of repository results
    Json,
}

/// Number of results whose inspection failed.
pub fn failed_count(results: &[RepositoryResult]) -> usize {
    results.iter().filter(|r| r.error.is_some()).count()
}
