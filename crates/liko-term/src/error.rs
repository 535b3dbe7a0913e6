// SPDX-License-Identifier: MIT
//
// Terminal errors.
//
// Every failure in this crate is fatal to the editor. The variants exist so
// the single top-level handler can name the failing operation next to the
// OS cause, the way `perror` would.

use std::io;

use thiserror::Error;

/// Result alias used throughout liko.
pub type Result<T> = std::result::Result<T, TermError>;

/// A fatal terminal failure.
#[derive(Debug, Error)]
pub enum TermError {
    /// Querying or applying the terminal configuration failed.
    ///
    /// `op` names the call (`tcgetattr`, `tcsetattr`, `sigaction`).
    #[error("{op}: {source}")]
    TerminalQuery {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Reading a keystroke failed for a reason other than the read timeout.
    #[error("read: {source}")]
    Read {
        #[source]
        source: io::Error,
    },

    /// Writing a frame to the terminal failed.
    #[error("write: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
}

impl TermError {
    /// Build a [`TermError::TerminalQuery`] from `errno` right after a failed call.
    pub(crate) fn last_query(op: &'static str) -> Self {
        Self::TerminalQuery {
            op,
            source: io::Error::last_os_error(),
        }
    }

    /// The name of the operation that failed.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::TerminalQuery { op, .. } => *op,
            Self::Read { .. } => "read",
            Self::Write { .. } => "write",
        }
    }

    /// The underlying OS error.
    #[must_use]
    pub const fn os_error(&self) -> &io::Error {
        match self {
            Self::TerminalQuery { source, .. }
            | Self::Read { source }
            | Self::Write { source } => source,
        }
    }
}
