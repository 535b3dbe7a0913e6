//! The editor loop — repaint, read one key, dispatch.
//!
//! ```text
//!   ┌──────────────┐    ┌──────────┐    ┌──────────┐
//!   │ refresh      │───▶│ read_key │───▶│ dispatch │──┐
//!   │ (full frame) │    │ (≤ 100ms)│    │ (keymap) │  │
//!   └──────────────┘    └──────────┘    └──────────┘  │
//!          ▲                                          │
//!          └──────────────── continue ────────────────┘
//! ```
//!
//! The loop has no natural end: it stops on the quit command, on a
//! termination signal, or when a read or write fails. Failures come back as
//! [`TermError`] for the caller to turn into restore-and-exit.
//!
//! The editor is generic over where keys come from, where bytes go, and
//! what fills the rows, so the whole loop runs in tests against a scripted
//! key source and a `Vec<u8>`.

use std::io::Write;

use liko_term::TermError;
use liko_term::error::Result;
use liko_term::input::{Key, KeySource};
use liko_term::signal::SignalFlag;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::keymap::{Command, Keymap};
use crate::render::{Frame, RowSource};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The quit command was received.
    Quit,
    /// A termination signal arrived.
    Signal(i32),
}

impl Exit {
    /// Process exit status: 0 for quit, `128 + signo` for a signal.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Quit => 0,
            Self::Signal(sig) => 128 + sig,
        }
    }
}

pub struct Editor<K, W, R> {
    keys: K,
    out: W,
    rows: R,
    keymap: Keymap,
    height: u16,
    frame: Frame,
    signals: Option<SignalFlag>,
}

impl<K: KeySource, W: Write, R: RowSource> Editor<K, W, R> {
    /// Create an editor with the startup keymap derived from `config`.
    #[must_use]
    pub fn new(keys: K, out: W, rows: R, config: &Config) -> Self {
        Self {
            keys,
            out,
            rows,
            keymap: Keymap::with_quit(config.quit_char),
            height: config.rows,
            frame: Frame::new(),
            signals: None,
        }
    }

    /// Replace the keymap.
    #[must_use]
    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Stop the loop when `signals` records a termination signal.
    #[must_use]
    pub fn with_signals(mut self, signals: SignalFlag) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Run until quit, a signal, or a fatal error.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Read`] or [`TermError::Write`]; the loop does
    /// not retry either.
    pub fn run(&mut self) -> Result<Exit> {
        info!(rows = self.height, "editor loop started");
        loop {
            if let Some(exit) = self.step()? {
                info!(?exit, "editor loop finished");
                return Ok(exit);
            }
        }
    }

    /// One iteration: check signals, repaint, read a key, dispatch it.
    ///
    /// Returns `Some` when the loop should stop.
    ///
    /// # Errors
    ///
    /// Returns the first read or write failure.
    pub fn step(&mut self) -> Result<Option<Exit>> {
        if let Some(sig) = self.signals.as_ref().and_then(SignalFlag::take) {
            warn!(signal = sig, "termination signal received");
            return Ok(Some(Exit::Signal(sig)));
        }

        self.refresh_screen()?;
        let key = self.keys.read_key()?;
        self.process_key(key)
    }

    /// Paint a full frame: clear, home, rows, home.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Write`] if the output rejects the frame.
    pub fn refresh_screen(&mut self) -> Result<()> {
        self.frame.reset();
        self.frame.clear_screen();
        self.frame.cursor_home();
        self.rows.draw_rows(&mut self.frame, self.height);
        self.frame.cursor_home();
        trace!(bytes = self.frame.len(), "frame");
        self.flush_frame()
    }

    /// Clear the screen and home the cursor, leaving a blank terminal.
    ///
    /// Used on quit and before a fatal error is reported.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Write`] if the output fails.
    pub fn clear_screen(&mut self) -> Result<()> {
        self.frame.reset();
        self.frame.clear_screen();
        self.frame.cursor_home();
        self.flush_frame()
    }

    /// Dispatch a key through the keymap.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Write`] if a command's output fails.
    pub fn process_key(&mut self, key: Key) -> Result<Option<Exit>> {
        match self.keymap.lookup(key) {
            Some(Command::Quit) => {
                debug!(?key, "quit");
                self.clear_screen()?;
                Ok(Some(Exit::Quit))
            }
            None => Ok(None),
        }
    }

    #[must_use]
    pub const fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// The output sink (for inspecting what was written).
    #[must_use]
    pub const fn output(&self) -> &W {
        &self.out
    }

    /// Give back the key source, output and row source.
    #[must_use]
    pub fn into_parts(self) -> (K, W, R) {
        (self.keys, self.out, self.rows)
    }

    fn flush_frame(&mut self) -> Result<()> {
        self.frame
            .write_to(&mut self.out)
            .map_err(|source| TermError::Write { source })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
