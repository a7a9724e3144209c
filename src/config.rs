//! Scan configuration.
//!
//! [`ScanConfig`] is the immutable input of one scan. It is assembled at
//! startup from built-in defaults, the optional user config file,
//! `GITSTATUS_*` environment variables, and finally CLI flags.
//!
//! # User config
//!
//! ```toml
//! max-depth = 4
//! show-all = false
//! timeout-secs = 10
//! # Replaces the default skip list
//! ignored-dirs = [".git", "node_modules", "target"]
//! # Added on top of the skip list
//! extra-ignored-dirs = ["third_party"]
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Case, Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::shell_exec::DEFAULT_TIMEOUT;

/// Directories never descended into.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    ".idea",
    ".vscode",
    "dist",
    "build",
    "target",
    "__pycache__",
    ".sass-cache",
];

/// 0 means unlimited.
pub const DEFAULT_MAX_DEPTH: usize = 0;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV_VAR: &str = "GITSTATUS_CONFIG_PATH";

const ENV_PREFIX: &str = "GITSTATUS";

/// Input describing one scan. Read-only to the walker and inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Absolute path the walk starts from
    pub root: PathBuf,
    /// Maximum depth below `root` to visit; 0 = unlimited
    pub max_depth: usize,
    /// Report clean repositories and fully synced branches too
    pub show_all: bool,
    /// Per-command timeout
    pub timeout: Duration,
    /// Directory base names whose subtrees are skipped
    pub ignored_dirs: Vec<String>,
}

impl ScanConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            show_all: false,
            timeout: DEFAULT_TIMEOUT,
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build from the user config, falling back to defaults for unset keys.
    pub fn from_user_config(root: impl Into<PathBuf>, user: &UserConfig) -> Self {
        let mut config = Self::new(root);
        if let Some(depth) = user.max_depth {
            config.max_depth = depth;
        }
        if let Some(show_all) = user.show_all {
            config.show_all = show_all;
        }
        if let Some(secs) = user.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(dirs) = &user.ignored_dirs {
            config.ignored_dirs = dirs.clone();
        }
        for dir in &user.extra_ignored_dirs {
            if !config.ignored_dirs.contains(dir) {
                config.ignored_dirs.push(dir.clone());
            }
        }
        config
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_ignored_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a directory with this base name is skipped.
    pub fn is_ignored(&self, name: &OsStr) -> bool {
        name.to_str()
            .is_some_and(|name| self.ignored_dirs.iter().any(|dir| dir == name))
    }

    /// Whether a node at `depth` (root = 0) is visited at all.
    pub fn within_depth(&self, depth: usize) -> bool {
        self.max_depth == 0 || depth < self.max_depth
    }
}

/// Settings from the config file and environment. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserConfig {
    pub max_depth: Option<usize>,
    pub show_all: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub ignored_dirs: Option<Vec<String>>,
    pub extra_ignored_dirs: Vec<String>,
}

impl UserConfig {
    /// Load the user config.
    ///
    /// Path priority:
    /// 1. `explicit` (the `--config` flag), which must exist
    /// 2. `GITSTATUS_CONFIG_PATH`
    /// 3. `<config dir>/gitstatus/config.toml`
    ///
    /// Scalar keys can be overridden with `GITSTATUS_<KEY>`, e.g.
    /// `GITSTATUS_TIMEOUT_SECS=10`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let mut builder = Config::builder();
        if let Some(path) = &path {
            log::debug!("Loading config from {}", path.display());
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(explicit.is_some()),
            );
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .convert_case(Case::Kebab)
                    .try_parsing(true)
                    .ignore_empty(true),
            )
            .build()?
            .try_deserialize()
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("gitstatus").join("config.toml"))
}
