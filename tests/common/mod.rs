use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Environment applied to every git (and gitstatus) process in tests, so the
/// user's own git config and locale never leak in.
const ISOLATED_ENV: &[(&str, &str)] = &[
    ("GIT_CONFIG_GLOBAL", "/dev/null"),
    ("GIT_CONFIG_SYSTEM", "/dev/null"),
    ("GIT_AUTHOR_NAME", "Test User"),
    ("GIT_AUTHOR_EMAIL", "test@example.com"),
    ("GIT_COMMITTER_NAME", "Test User"),
    ("GIT_COMMITTER_EMAIL", "test@example.com"),
    ("GIT_AUTHOR_DATE", "2025-01-01T00:00:00Z"),
    ("GIT_COMMITTER_DATE", "2025-01-01T00:00:00Z"),
    ("LC_ALL", "C"),
    ("LANG", "C"),
];

/// A scratch directory holding a bare "remote" and a workspace of clones.
///
/// ```text
/// <tmp>/remote.git      bare repository with one commit on main
/// <tmp>/workspace/...   scan root; clones and local repos go here
/// ```
pub struct TestEnv {
    _temp_dir: TempDir,
    remote: PathBuf,
    workspace: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // Canonicalize to resolve symlinks (important on macOS where /var is symlink to /private/var)
        let base = temp_dir
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp path");

        let remote = base.join("remote.git");
        let workspace = base.join("workspace");
        std::fs::create_dir_all(&remote).unwrap();
        std::fs::create_dir_all(&workspace).unwrap();

        git(&remote, &["init", "--bare", "-b", "main"]);

        let seed = base.join("seed");
        git(&base, &["clone", remote.to_str().unwrap(), "seed"]);
        git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        write_and_commit(&seed, "README.md", "hello\n", "Initial commit");
        git(&seed, &["push", "origin", "main"]);
        std::fs::remove_dir_all(&seed).unwrap();

        Self {
            _temp_dir: temp_dir,
            remote,
            workspace,
        }
    }

    /// The scan root.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Clone the remote to `workspace/<rel>`.
    pub fn clone_repo(&self, rel: &str) -> PathBuf {
        let path = self.workspace.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        git(
            &self.workspace,
            &["clone", self.remote.to_str().unwrap(), path.to_str().unwrap()],
        );
        path
    }

    /// Create a repository at `workspace/<rel>` with one commit and no remote.
    pub fn init_local(&self, rel: &str) -> PathBuf {
        let path = self.workspace.join(rel);
        std::fs::create_dir_all(&path).unwrap();
        git(&path, &["init", "-b", "main"]);
        write_and_commit(&path, "file.txt", "local\n", "Local commit");
        path
    }

    /// A `Command` for the gitstatus binary with the isolated environment.
    pub fn gitstatus_command(&self) -> Command {
        let mut cmd = Command::new(insta_cmd::get_cargo_bin("gitstatus"));
        isolate(&mut cmd);
        // Point the config lookup somewhere empty
        cmd.env(
            "GITSTATUS_CONFIG_PATH",
            self.workspace.join("no-such-config.toml"),
        );
        cmd.env("NO_COLOR", "1");
        cmd
    }
}

fn isolate(cmd: &mut Command) {
    for (key, val) in ISOLATED_ENV {
        cmd.env(key, val);
    }
}

/// Run git in `dir`, panicking with its output on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(dir);
    isolate(&mut cmd);
    let output = cmd.output().expect("Failed to execute git");
    if !output.status.success() {
        panic!(
            "git {} failed in {}:\nstdout: {}\nstderr: {}",
            args.join(" "),
            dir.display(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Write `content` to `file` in `repo`, then add and commit it.
pub fn write_and_commit(repo: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(repo.join(file), content).expect("Failed to write file");
    git(repo, &["add", file]);
    git(repo, &["commit", "-m", message]);
}
