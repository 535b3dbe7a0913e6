// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Input reader — one byte per call, bounded by the raw-mode read timeout.
//
// In raw mode VMIN=0 and VTIME>0, so read(2) returns either a single byte
// or zero bytes once the timeout lapses. Zero bytes is not an error; it is
// the "no input yet" outcome and the loop simply repaints and asks again.

use std::io;
use std::os::unix::io::RawFd;

use tracing::trace;

use crate::error::{Result, TermError};

/// The control-key encoding: Ctrl+`c` is `c` with its upper three bits cleared.
///
/// `ctrl_key(b'q') == 0x11`. Case does not matter: `ctrl_key(b'Q')` is the
/// same byte.
#[inline]
#[must_use]
pub const fn ctrl_key(c: u8) -> u8 {
    c & 0x1f
}

/// A keystroke as delivered by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A raw input byte.
    Byte(u8),
    /// The read timed out with nothing available.
    NoInput,
}

impl Key {
    /// The byte, if one was read.
    #[inline]
    #[must_use]
    pub const fn byte(self) -> Option<u8> {
        match self {
            Self::Byte(b) => Some(b),
            Self::NoInput => None,
        }
    }

    /// Whether this is Ctrl+`c`.
    #[inline]
    #[must_use]
    pub const fn is_ctrl(self, c: u8) -> bool {
        matches!(self, Self::Byte(b) if b == ctrl_key(c))
    }
}

/// Something that produces keystrokes.
///
/// The editor loop reads through this trait so tests can script input and a
/// future decoder can sit between the terminal and the dispatcher.
pub trait KeySource {
    /// Read one keystroke, waiting at most the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Read`] when the read fails for any reason other
    /// than the timeout.
    fn read_key(&mut self) -> Result<Key>;
}

impl<K: KeySource + ?Sized> KeySource for &mut K {
    fn read_key(&mut self) -> Result<Key> {
        (**self).read_key()
    }
}

/// Reads single bytes from a terminal file descriptor.
#[derive(Debug, Clone, Copy)]
pub struct TtyKeys {
    fd: RawFd,
}

impl TtyKeys {
    #[must_use]
    pub const fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    /// Read from standard input.
    #[must_use]
    pub const fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }
}

impl KeySource for TtyKeys {
    fn read_key(&mut self) -> Result<Key> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(self.fd, (&raw mut byte).cast(), 1) };

        match n {
            1 => {
                trace!(byte, "key");
                Ok(Key::Byte(byte))
            }
            0 => Ok(Key::NoInput),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    // A signal landing mid-read counts as a timeout; the loop
                    // checks for it at the top of the next iteration.
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(Key::NoInput),
                    _ => Err(TermError::Read { source: err }),
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
