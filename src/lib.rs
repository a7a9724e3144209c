pub mod config;
pub mod git;
pub mod inspect;
pub mod logging;
pub mod output;
pub mod shell_exec;
pub mod styling;
pub mod sync;
pub mod walk;

pub use config::ScanConfig;
pub use git::{BranchSyncStatus, WorkdirStatus};
pub use inspect::{RepositoryResult, inspect_repository};
pub use sync::CancellationToken;
pub use walk::{ResultSink, WalkError, WalkSummary, walk};
