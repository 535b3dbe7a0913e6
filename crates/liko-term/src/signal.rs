// SPDX-License-Identifier: MIT
//
// Termination signals.
//
// The handlers installed here only store the signal number into an atomic
// (async-signal-safe). The editor loop polls the flag once per iteration,
// which is at most one read timeout away, and returns so the raw-mode guard
// can restore the terminal on the normal path.
//
// Keyboard-generated signals are already off in raw mode (ISIG cleared);
// these cover `kill`, a closed terminal window (SIGHUP), and the window of
// time before raw mode takes effect.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use signal_hook::SigId;
use tracing::debug;

use crate::error::{Result, TermError};

/// Signals that end the editor.
pub const TERMINATION_SIGNALS: [libc::c_int; 4] =
    [libc::SIGTERM, libc::SIGHUP, libc::SIGQUIT, libc::SIGINT];

/// Latest termination signal received, or 0.
///
/// Handlers are unregistered on drop.
#[derive(Debug, Default)]
pub struct SignalFlag {
    pending: Arc<AtomicUsize>,
    ids: Vec<SigId>,
}

impl SignalFlag {
    /// A flag with no handlers attached. Only [`notify`](Self::notify) sets it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install handlers for every signal in [`TERMINATION_SIGNALS`].
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalQuery`] (`sigaction`) if a handler
    /// cannot be installed. Handlers registered before the failure are
    /// removed again.
    pub fn register() -> Result<Self> {
        Self::register_for(&TERMINATION_SIGNALS)
    }

    /// Install handlers for `signals` only.
    ///
    /// Unregistering leaves signal-hook's handler in place, so the default
    /// disposition of these signals does not come back for the life of the
    /// process.
    pub(crate) fn register_for(signals: &[libc::c_int]) -> Result<Self> {
        let mut flag = Self::new();
        for &sig in signals {
            let value = usize::try_from(sig).unwrap_or_default();
            let id = signal_hook::flag::register_usize(sig, Arc::clone(&flag.pending), value)
                .map_err(|source| TermError::TerminalQuery {
                    op: "sigaction",
                    source,
                })?;
            flag.ids.push(id);
        }
        debug!(?signals, "termination handlers installed");
        Ok(flag)
    }

    /// Record `sig` as if its handler had run.
    pub fn notify(&self, sig: libc::c_int) {
        self.pending
            .store(usize::try_from(sig).unwrap_or_default(), Ordering::SeqCst);
    }

    /// Take the pending signal, if any, clearing the flag.
    #[must_use]
    pub fn take(&self) -> Option<i32> {
        match self.pending.swap(0, Ordering::SeqCst) {
            0 => None,
            sig => i32::try_from(sig).ok(),
        }
    }
}

impl Drop for SignalFlag {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}
