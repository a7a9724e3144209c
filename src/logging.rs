//! Log sink setup.
//!
//! Logging goes through the `log` facade. The backend is `env_logger`,
//! wrapped so that exactly the *set* of levels named on the command line is
//! emitted (e.g. `--log ERROR,DEBUG` shows errors and debug lines but not
//! info or warnings). Output goes to stderr, or is appended to a file.

use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use env_logger::Target;
use log::{Level, LevelFilter, Log, Metadata, Record};
use strum::EnumString;

/// Level names accepted by `--log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum LevelName {
    Debug,
    Info,
    #[strum(serialize = "warning", serialize = "warn")]
    Warning,
    Error,
}

impl From<LevelName> for Level {
    fn from(name: LevelName) -> Self {
        match name {
            LevelName::Debug => Level::Debug,
            LevelName::Info => Level::Info,
            LevelName::Warning => Level::Warn,
            LevelName::Error => Level::Error,
        }
    }
}

/// The set of enabled log levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogLevels(BTreeSet<Level>);

impl LogLevels {
    pub fn contains(&self, level: Level) -> bool {
        self.0.contains(&level)
    }

    /// The most verbose enabled level, for the global `log` filter.
    pub fn max_level(&self) -> LevelFilter {
        self.0
            .iter()
            .max()
            .map(|level| level.to_level_filter())
            .unwrap_or(LevelFilter::Off)
    }
}

impl FromStr for LogLevels {
    type Err = String;

    /// Parse a comma-separated list such as `DEBUG,warning`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut levels = BTreeSet::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let name = LevelName::from_str(part).map_err(|_| {
                format!("unknown log level '{part}' (expected DEBUG, INFO, WARNING, ERROR)")
            })?;
            levels.insert(Level::from(name));
        }
        Ok(Self(levels))
    }
}

/// `env_logger` restricted to an explicit level set.
pub struct LevelSetLogger {
    levels: LogLevels,
    inner: env_logger::Logger,
}

impl LevelSetLogger {
    /// Build a logger writing to `log_file` (appending) or stderr.
    pub fn new(levels: LogLevels, log_file: Option<&Path>) -> anyhow::Result<Self> {
        let target = match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file {}", path.display()))?;
                Target::Pipe(Box::new(file))
            }
            None => Target::Stderr,
        };

        let inner = env_logger::Builder::new()
            .filter_level(levels.max_level())
            .target(target)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{}] [{}] {}",
                    buf.timestamp_seconds(),
                    record.level(),
                    record.args()
                )
            })
            .build();

        Ok(Self { levels, inner })
    }
}

impl Log for LevelSetLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.levels.contains(metadata.level()) && self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the global logger. Fails if the log file can't be opened or a
/// logger is already installed.
pub fn init(levels: LogLevels, log_file: Option<&Path>) -> anyhow::Result<()> {
    let max_level = levels.max_level();
    let logger = LevelSetLogger::new(levels, log_file)?;
    log::set_boxed_logger(Box::new(logger)).context("Failed to install logger")?;
    log::set_max_level(max_level);
    Ok(())
}
