//! Cross-platform cooperative signal dispatcher (C10).
//!
//! Grounded on `llmspell-kernel::daemon::signals::{SignalHandler, SignalBridge}`:
//! an async-signal-safe handler only flips `AtomicBool` flags; everything
//! else — callback invocation, logging — happens later when `dispatch` is
//! called from a safe point on the calling thread. Generalized from the
//! teacher's five fixed `SignalAction` variants into an open `signal number
//! -> ordered callbacks` table, per §4.10.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("signal handling is not available on this platform")]
    Unavailable,
    #[error("failed to install signal handler: {0}")]
    Install(#[from] nix::Error),
}

#[cfg(unix)]
pub const SIGHUP: i32 = libc::SIGHUP;
#[cfg(unix)]
pub const SIGINT: i32 = libc::SIGINT;
#[cfg(unix)]
pub const SIGTERM: i32 = libc::SIGTERM;
#[cfg(unix)]
pub const SIGUSR1: i32 = libc::SIGUSR1;
#[cfg(unix)]
pub const SIGUSR2: i32 = libc::SIGUSR2;

#[cfg(not(unix))]
pub const SIGHUP: i32 = 1;
#[cfg(not(unix))]
pub const SIGINT: i32 = 2;
#[cfg(not(unix))]
pub const SIGTERM: i32 = 15;
#[cfg(not(unix))]
pub const SIGUSR1: i32 = 10;
#[cfg(not(unix))]
pub const SIGUSR2: i32 = 12;

static SIGHUP_FLAG: AtomicBool = AtomicBool::new(false);
static SIGINT_FLAG: AtomicBool = AtomicBool::new(false);
static SIGTERM_FLAG: AtomicBool = AtomicBool::new(false);
static SIGUSR1_FLAG: AtomicBool = AtomicBool::new(false);
static SIGUSR2_FLAG: AtomicBool = AtomicBool::new(false);

static TRACKED: [(i32, &AtomicBool); 5] = [
    (SIGHUP, &SIGHUP_FLAG),
    (SIGINT, &SIGINT_FLAG),
    (SIGTERM, &SIGTERM_FLAG),
    (SIGUSR1, &SIGUSR1_FLAG),
    (SIGUSR2, &SIGUSR2_FLAG),
];

#[cfg(unix)]
extern "C" fn handle_signal(sig: libc::c_int) {
    // Async-signal-safe: only atomics, no tracing, no allocation.
    match sig {
        libc::SIGHUP => SIGHUP_FLAG.store(true, Ordering::SeqCst),
        libc::SIGINT => SIGINT_FLAG.store(true, Ordering::SeqCst),
        libc::SIGTERM => SIGTERM_FLAG.store(true, Ordering::SeqCst),
        libc::SIGUSR1 => SIGUSR1_FLAG.store(true, Ordering::SeqCst),
        libc::SIGUSR2 => SIGUSR2_FLAG.store(true, Ordering::SeqCst),
        _ => {}
    }
}

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Handler table keyed by signal number, with cooperative `dispatch`.
pub struct SignalDispatcher {
    handlers: HashMap<i32, Vec<Callback>>,
    installed: bool,
}

impl SignalDispatcher {
    pub fn new() -> Self {
        Self { handlers: HashMap::new(), installed: false }
    }

    /// Installs the OS-level signal handlers. Returns
    /// [`SignalError::Unavailable`] on platforms without `nix` signal
    /// support; `is_available` stays false there.
    #[cfg(unix)]
    pub fn install(&mut self) -> Result<(), SignalError> {
        use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

        if self.installed {
            return Ok(());
        }
        let action = SigAction::new(SigHandler::Handler(handle_signal), SaFlags::empty(), SigSet::empty());
        for signal in [Signal::SIGHUP, Signal::SIGINT, Signal::SIGTERM, Signal::SIGUSR1, Signal::SIGUSR2] {
            unsafe { sigaction(signal, &action) }?;
        }
        self.installed = true;
        tracing::info!("signal handlers installed");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn install(&mut self) -> Result<(), SignalError> {
        tracing::warn!("cooperative signal handling is not available on this platform");
        Err(SignalError::Unavailable)
    }

    pub fn is_available(&self) -> bool {
        self.installed
    }

    /// Appends a callback for `signal`. No-op (but still recorded) on
    /// platforms where signals are unavailable — it simply never fires.
    pub fn on_signal(&mut self, signal: i32, callback: impl Fn() + Send + Sync + 'static) {
        self.handlers.entry(signal).or_default().push(Arc::new(callback));
    }

    /// Clears every callback registered for `signal`.
    pub fn remove(&mut self, signal: i32) {
        self.handlers.remove(&signal);
    }

    /// Attaches `callback` to both [`SIGINT`] and [`SIGTERM`].
    pub fn register_graceful_shutdown(&mut self, callback: impl Fn() + Send + Sync + 'static) {
        let callback: Callback = Arc::new(callback);
        self.handlers.entry(SIGINT).or_default().push(Arc::clone(&callback));
        self.handlers.entry(SIGTERM).or_default().push(callback);
    }

    /// Drains any signal flags set since the last call and invokes the
    /// registered callbacks for each, in registration order. A no-op if
    /// `install` was never called or signals are unavailable.
    pub fn dispatch(&self) {
        for &(sig, flag) in &TRACKED {
            if flag.swap(false, Ordering::SeqCst) {
                if let Some(callbacks) = self.handlers.get(&sig) {
                    for callback in callbacks {
                        callback();
                    }
                }
            }
        }
    }
}

impl Default for SignalDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
