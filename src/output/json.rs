use crate::inspect::RepositoryResult;

/// Serialize results as a pretty-printed JSON array.
///
/// Unlike text output, every result is included: clean repositories and
/// errored ones (with `error` as a string).
pub fn render_json(results: &[RepositoryResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}
