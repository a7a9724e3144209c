//! External command execution with timeout and cancellation.
//!
//! Every git invocation goes through [`Cmd`], which logs the command line,
//! spawns the child with stdin closed, drains stdout/stderr on background
//! threads, and waits with a hard deadline. A child that outlives its
//! deadline, or whose caller is cancelled, is killed and reaped before the
//! error is returned.

use std::ffi::OsString;
use std::fmt;
use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use crate::sync::CancellationToken;

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a single wait slice lasts before cancellation is re-checked.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout followed by stderr, for error reports and logs.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}{}", self.stdout, self.stderr),
        }
    }
}

/// Why a command did not produce usable output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The program could not be found on PATH
    NotFound { program: String },
    /// The deadline passed and the process was killed
    TimedOut { timeout: Duration },
    /// The process exited unsuccessfully. `code` is `None` when it was
    /// terminated by a signal.
    Failed { code: Option<i32>, output: String },
    /// The cancellation token fired while waiting; the process was killed
    Cancelled,
    /// Spawning or waiting failed for another reason
    Io { message: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotFound { program } => write!(f, "{program} not found"),
            CommandError::TimedOut { timeout } => {
                write!(f, "command timed out after {:.1}s", timeout.as_secs_f64())
            }
            CommandError::Failed { code, output } => {
                match code {
                    Some(code) => write!(f, "exit status {code}")?,
                    None => write!(f, "terminated by signal")?,
                }
                let output = output.trim();
                if !output.is_empty() {
                    write!(f, ": {output}")?;
                }
                Ok(())
            }
            CommandError::Cancelled => write!(f, "cancelled"),
            CommandError::Io { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Builder for executing a command with logging, timeout and cancellation.
///
/// ```no_run
/// use std::time::Duration;
/// use gitstatus::shell_exec::Cmd;
///
/// let output = Cmd::new("git")
///     .args(["status", "--porcelain"])
///     .current_dir("/path/to/repo")
///     .timeout(Duration::from_secs(5))
///     .run()?;
/// println!("{}", output.stdout);
/// # Ok::<(), gitstatus::shell_exec::CommandError>(())
/// ```
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout: Duration,
    envs: Vec<(OsString, OsString)>,
    cancel: Option<CancellationToken>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: DEFAULT_TIMEOUT,
            envs: Vec::new(),
            cancel: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, val: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), val.into()));
        self
    }

    /// Kill the child and return [`CommandError::Cancelled`] when `token` fires.
    pub fn cancel_with(mut self, token: &CancellationToken) -> Self {
        self.cancel = Some(token.clone());
        self
    }

    /// Execute the command.
    ///
    /// Succeeds only when the process exits with status zero.
    pub fn run(self) -> Result<CommandOutput, CommandError> {
        let cmd_str = if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        };

        match &self.current_dir {
            Some(dir) => log::debug!("$ {} [{}]", cmd_str, dir.display()),
            None => log::debug!("$ {}", cmd_str),
        }

        let t0 = Instant::now();
        let result = self.execute();
        let dur_ms = t0.elapsed().as_millis();

        match &result {
            Ok(_) => log::debug!("cmd=\"{}\" dur_ms={} ok=true", cmd_str, dur_ms),
            Err(e) => log::debug!("cmd=\"{}\" dur_ms={} err=\"{}\"", cmd_str, dur_ms, e),
        }

        result
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn execute(&self) -> Result<CommandOutput, CommandError> {
        if self.is_cancelled() {
            return Err(CommandError::Cancelled);
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, val) in &self.envs {
            cmd.env(key, val);
        }

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => CommandError::NotFound {
                    program: self.program.clone(),
                },
                _ => CommandError::Io {
                    message: format!("failed to spawn {}: {}", self.program, e),
                },
            })?;

        // Drain both pipes in parallel so a chatty child can't fill a buffer
        // and block forever.
        let stdout_thread = drain(child.stdout.take());
        let stderr_thread = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if self.is_cancelled() {
                kill_and_reap(&mut child, stdout_thread, stderr_thread);
                return Err(CommandError::Cancelled);
            }

            let now = Instant::now();
            if now >= deadline {
                kill_and_reap(&mut child, stdout_thread, stderr_thread);
                return Err(CommandError::TimedOut {
                    timeout: self.timeout,
                });
            }

            let slice = POLL_INTERVAL.min(deadline - now);
            match child.wait_timeout(slice) {
                Ok(Some(status)) => break status,
                Ok(None) => continue,
                Err(e) => {
                    kill_and_reap(&mut child, stdout_thread, stderr_thread);
                    return Err(CommandError::Io {
                        message: format!("failed to wait for {}: {}", self.program, e),
                    });
                }
            }
        };

        let output = CommandOutput {
            stdout: join_lossy(stdout_thread),
            stderr: join_lossy(stderr_thread),
        };

        // Ctrl-C reaches the child too, which can exit before the next poll
        if self.is_cancelled() {
            return Err(CommandError::Cancelled);
        }

        check_status(status, output)
    }
}

fn check_status(status: ExitStatus, output: CommandOutput) -> Result<CommandOutput, CommandError> {
    if status.success() {
        Ok(output)
    } else {
        Err(CommandError::Failed {
            code: status.code(),
            output: output.combined(),
        })
    }
}

fn drain<R: Read + Send + 'static>(handle: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut handle) = handle {
            let _ = handle.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_lossy(thread: JoinHandle<Vec<u8>>) -> String {
    let bytes = thread.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn kill_and_reap(
    child: &mut std::process::Child,
    stdout_thread: JoinHandle<Vec<u8>>,
    stderr_thread: JoinHandle<Vec<u8>>,
) {
    // SIGKILL on Unix
    let _ = child.kill();
    let _ = child.wait();
    // Readers see EOF once the child is gone
    let _ = stdout_thread.join();
    let _ = stderr_thread.join();
}
