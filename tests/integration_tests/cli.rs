//! Tests for the `gitstatus` binary.

use std::process::Output;

use crate::common::{TestEnv, git, write_and_commit};

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_reports_unsynced_and_uncommitted() {
    let env = TestEnv::new();
    let app = env.clone_repo("app");
    write_and_commit(&app, "a.txt", "a\n", "Ahead");
    git(&app, &["branch", "topic"]);
    std::fs::write(app.join("scratch.txt"), "s\n").unwrap();
    env.clone_repo("clean");

    let output = env
        .gitstatus_command()
        .arg(env.workspace())
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let app = app.display().to_string();
    assert_eq!(
        stdout(&output),
        format!(
            "{app}/main [current] (ahead 1)\n\
             {app}/topic (no upstream)\n\
             {app} (uncommitted: 1 untracked)\n"
        )
    );
}

#[test]
fn test_nothing_to_report() {
    let env = TestEnv::new();
    env.clone_repo("clean");

    let output = env
        .gitstatus_command()
        .arg(env.workspace())
        .output()
        .unwrap();
    assert!(output.status.success());
    insta::assert_snapshot!(stdout(&output).trim_end(), @"No git repositories with unsynced branches or uncommitted changes found.");
}

#[test]
fn test_show_all_includes_clean_repositories() {
    let env = TestEnv::new();
    let clean = env.clone_repo("clean");

    let output = env
        .gitstatus_command()
        .args(["--all"])
        .arg(env.workspace())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        format!("{}/main [current]\n", clean.display())
    );
}

#[test]
fn test_relative_path_is_resolved() {
    let env = TestEnv::new();
    let app = env.clone_repo("app");
    write_and_commit(&app, "a.txt", "a\n", "Ahead");

    let output = env
        .gitstatus_command()
        .current_dir(env.workspace())
        .arg(".")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).starts_with(&format!("{}/main", app.display())));
}

#[test]
fn test_depth_flag() {
    let env = TestEnv::new();
    let deep = env.clone_repo("a/b/deep");
    write_and_commit(&deep, "a.txt", "a\n", "Ahead");

    let shallow = env
        .gitstatus_command()
        .args(["--depth", "2"])
        .arg(env.workspace())
        .output()
        .unwrap();
    assert!(!stdout(&shallow).contains("deep"));

    let unlimited = env
        .gitstatus_command()
        .args(["--depth", "0"])
        .arg(env.workspace())
        .output()
        .unwrap();
    assert!(stdout(&unlimited).contains("deep/main [current] (ahead 1)"));
}

#[test]
fn test_json_output() {
    let env = TestEnv::new();
    let app = env.clone_repo("app");
    write_and_commit(&app, "a.txt", "a\n", "Ahead");

    let output = env
        .gitstatus_command()
        .args(["--format", "json"])
        .arg(env.workspace())
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let repos = value.as_array().unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0]["path"], app.display().to_string());
    assert_eq!(repos[0]["has_unsynced"], true);
    assert_eq!(repos[0]["branches"][0]["name"], "main");
    assert_eq!(repos[0]["branches"][0]["ahead"], 1);
}

#[test]
fn test_log_file_receives_levels() {
    let env = TestEnv::new();
    env.clone_repo("app");
    let log_path = env.workspace().join("scan.log");

    let output = env
        .gitstatus_command()
        .args(["--log", "DEBUG,INFO", "--logfile"])
        .arg(&log_path)
        .arg(env.workspace())
        .output()
        .unwrap();
    assert!(output.status.success());
    // Nothing logged to stderr when a log file is given
    assert!(stderr(&output).is_empty(), "stderr: {}", stderr(&output));

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("[INFO] Starting scan from:"));
    assert!(log.contains("[DEBUG] Found git repo:"));
    assert!(log.contains("$ git branch -vv --no-color"));
}

#[test]
fn test_failed_repository_is_summarized_on_stderr() {
    let env = TestEnv::new();
    let broken = env.workspace().join("broken");
    std::fs::create_dir_all(broken.join(".git")).unwrap();
    std::fs::write(broken.join(".git/HEAD"), "garbage\n").unwrap();

    let output = env
        .gitstatus_command()
        .arg(env.workspace())
        .output()
        .unwrap();
    // Per-repository failures don't change the exit code
    assert!(output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("1 repository failed to inspect"), "{stderr}");
    assert!(stderr.contains("--log ERROR"), "{stderr}");
}

#[test]
fn test_unresolvable_root_fails() {
    let env = TestEnv::new();
    let output = env
        .gitstatus_command()
        .arg(env.workspace().join("does-not-exist"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to resolve path"));
}

#[test]
fn test_unopenable_log_file_fails() {
    let env = TestEnv::new();
    let output = env
        .gitstatus_command()
        .args(["--log", "ERROR", "--logfile"])
        .arg(env.workspace().join("missing").join("scan.log"))
        .arg(env.workspace())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to initialize logger"));
}

#[test]
fn test_config_file_sets_ignored_dirs() {
    let env = TestEnv::new();
    let kept = env.clone_repo("kept");
    write_and_commit(&kept, "a.txt", "a\n", "Ahead");
    let hidden = env.clone_repo("third_party/lib");
    write_and_commit(&hidden, "a.txt", "a\n", "Ahead");

    let config = env.workspace().join("gitstatus.toml");
    std::fs::write(&config, "extra-ignored-dirs = [\"third_party\"]\n").unwrap();

    let output = env
        .gitstatus_command()
        .arg("--config")
        .arg(&config)
        .arg(env.workspace())
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("kept/main"));
    assert!(!out.contains("third_party"));
}

/// Put a `git` on PATH that interrupts its parent, then hangs.
#[cfg(unix)]
fn interrupting_git(dir: &std::path::Path) -> std::ffi::OsString {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let shim = bin.join("git");
    std::fs::write(&shim, "#!/bin/sh\nkill -INT $PPID\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&shim, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut path = bin.into_os_string();
    path.push(":");
    path.push(std::env::var_os("PATH").unwrap_or_default());
    path
}

#[test]
#[cfg(unix)]
fn test_interrupted_scan_exits_cleanly() {
    let env = TestEnv::new();
    std::fs::create_dir_all(env.workspace().join("repo/.git")).unwrap();
    let path = interrupting_git(&env.workspace().join("..").join("shim"));

    let output = env
        .gitstatus_command()
        .env("PATH", path)
        .arg(env.workspace())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    // The repository being inspected when the signal arrived is not reported
    assert!(!stderr(&output).contains("failed to inspect"), "{}", stderr(&output));
    insta::assert_snapshot!(stdout(&output).trim_end(), @"No git repositories with unsynced branches or uncommitted changes found.");
}
