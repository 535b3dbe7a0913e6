// SPDX-License-Identifier: MIT
//
// liko-term — terminal control for liko.
//
// The bottom layer of the editor. It owns the controlling terminal's line
// discipline (capture, raw mode, guaranteed restore), pulls keystrokes one
// byte at a time under a read timeout, and knows the handful of escape
// sequences the repaint needs.
//
// Everything goes straight through termios and read(2). There is no input
// parser and no cell renderer here: a keystroke is a byte, a frame is a
// byte string.

#[cfg(not(unix))]
compile_error!("liko-term drives the terminal through termios and only builds on Unix");

pub mod ansi;
pub mod error;
pub mod flags;
pub mod input;
pub mod signal;
pub mod terminal;

#[cfg(test)]
pub(crate) mod test_pty;

pub use error::{Result, TermError};
