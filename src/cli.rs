use std::path::PathBuf;

use clap::Parser;
use gitstatus::logging::LogLevels;
use gitstatus::output::OutputFormat;

/// Find git repositories with unsynced branches or uncommitted changes.
///
/// Walks PATH, and for every repository found reports local branches that
/// are ahead of, behind, or detached from their upstream, and working trees
/// with modified, staged or untracked files. Nothing is fetched; upstream
/// state is as of the last fetch.
#[derive(Parser, Debug)]
#[command(name = "gitstatus", version, about, long_about)]
pub struct Cli {
    /// Directory to scan
    #[arg(default_value = ".", value_name = "PATH")]
    pub path: PathBuf,

    /// Maximum directory depth to descend (0 = unlimited)
    #[arg(short, long, value_name = "N")]
    pub depth: Option<usize>,

    /// Show clean repositories and fully synced branches too
    #[arg(short, long)]
    pub all: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log levels to enable, comma-separated: DEBUG, INFO, WARNING, ERROR
    #[arg(long, value_name = "LEVELS")]
    pub log: Option<LogLevels>,

    /// Append log output to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Timeout for each git command, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Config file (default: ~/.config/gitstatus/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
