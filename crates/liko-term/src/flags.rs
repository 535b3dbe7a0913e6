// SPDX-License-Identifier: MIT
//
// Typed views of the termios bits raw mode touches.
//
// Each set covers exactly the bits raw mode changes in one flag word, so
// `all()` is the mask raw mode clears (or, for the control word, forces).
// Bits outside these sets are carried through untouched and are dropped
// by `from_bits_truncate` when a snapshot is inspected.

use libc::tcflag_t;

bitflags::bitflags! {
    /// Input-processing bits (`c_iflag`) disabled in raw mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputFlags: tcflag_t {
        /// Break condition sends SIGINT.
        const BRKINT = libc::BRKINT;
        /// Carriage return is translated to newline.
        const ICRNL  = libc::ICRNL;
        /// Input parity checking.
        const INPCK  = libc::INPCK;
        /// Strip the 8th bit of every input byte.
        const ISTRIP = libc::ISTRIP;
        /// Software flow control (Ctrl-S / Ctrl-Q).
        const IXON   = libc::IXON;
    }
}

bitflags::bitflags! {
    /// Output-processing bits (`c_oflag`) disabled in raw mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OutputFlags: tcflag_t {
        /// Output post-processing, including `\n` → `\r\n`.
        const OPOST = libc::OPOST;
    }
}

bitflags::bitflags! {
    /// Character-size bits (`c_cflag`) forced in raw mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlFlags: tcflag_t {
        /// Mask covering every character-size setting.
        const CSIZE = libc::CSIZE;
        /// Eight bits per byte.
        const CS8   = libc::CS8;
    }
}

bitflags::bitflags! {
    /// Local-mode bits (`c_lflag`) disabled in raw mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LocalFlags: tcflag_t {
        /// Echo input characters.
        const ECHO   = libc::ECHO;
        /// Canonical (line-buffered) input.
        const ICANON = libc::ICANON;
        /// Ctrl-C / Ctrl-Z / Ctrl-\ generate signals.
        const ISIG   = libc::ISIG;
        /// Ctrl-V literal-next and Ctrl-O output discard.
        const IEXTEN = libc::IEXTEN;
    }
}

impl ControlFlags {
    /// Whether the character-size field selects eight bits per byte.
    #[must_use]
    pub fn is_eight_bit(self) -> bool {
        self.bits() & Self::CSIZE.bits() == Self::CS8.bits()
    }
}
