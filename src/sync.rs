//! Cancellation primitives shared between the walker and the command runner.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable cancellation signal.
///
/// All clones observe the same flag. The walker polls it at each directory,
/// and the command runner polls it while waiting on a child process, so a
/// raised signal is noticed within one poll slice.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise this token when the process receives SIGINT or SIGTERM.
    ///
    /// The handler only flips the flag; it never terminates the process, so
    /// the walk unwinds through its normal return path.
    #[cfg(unix)]
    pub fn cancel_on_signals(&self) -> std::io::Result<()> {
        use signal_hook::consts::{SIGINT, SIGTERM};

        for sig in [SIGINT, SIGTERM] {
            self.cancel_on_signal(sig)?;
        }
        Ok(())
    }

    #[cfg(unix)]
    pub(crate) fn cancel_on_signal(&self, signal: i32) -> std::io::Result<()> {
        signal_hook::flag::register(signal, Arc::clone(&self.flag))?;
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn cancel_on_signals(&self) -> std::io::Result<()> {
        Ok(())
    }
}
