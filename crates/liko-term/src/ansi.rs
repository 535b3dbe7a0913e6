// SPDX-License-Identifier: MIT
//
// ANSI escape sequences used by the repaint.
//
// Exact bytes matter here: the screen clear is the 4-byte ED 2 and the
// home move is the 3-byte CUP with no parameters.

use std::io::{self, Write};

/// Clear the entire screen (ED 2): `ESC [ 2 J`.
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";

/// Move the cursor to the top-left cell (CUP, no parameters): `ESC [ H`.
pub const CURSOR_HOME: &[u8] = b"\x1b[H";

/// Write [`CLEAR_SCREEN`].
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_SCREEN)
}

/// Write [`CURSOR_HOME`].
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HOME)
}

/// Clear the screen and home the cursor.
pub fn reset_screen(w: &mut impl Write) -> io::Result<()> {
    clear_screen(w)?;
    cursor_home(w)
}
