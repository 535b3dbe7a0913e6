//! Frame assembly and the render-content seam.
//!
//! A [`Frame`] collects one repaint's bytes so the terminal sees a single
//! write. The rows in the middle come from a [`RowSource`]; until there is a
//! text buffer that is [`Placeholder`], a column of `~` markers.

use std::io::{self, Write};

use liko_term::ansi;

/// Initial frame capacity; covers a placeholder screen without reallocation.
const FRAME_CAPACITY: usize = 4096;

/// Bytes for one repaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    buf: Vec<u8>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(FRAME_CAPACITY),
        }
    }

    /// Append raw bytes.
    #[inline]
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn clear_screen(&mut self) {
        self.push(ansi::CLEAR_SCREEN);
    }

    #[inline]
    pub fn cursor_home(&mut self) {
        self.push(ansi::CURSOR_HOME);
    }

    /// Empty the frame for reuse, keeping its allocation.
    #[inline]
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write the whole frame and flush.
    ///
    /// # Errors
    ///
    /// Propagates the writer's error.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.buf)?;
        w.flush()
    }
}

/// Supplies the visible rows of each repaint.
///
/// Called once per loop iteration, between the screen clear and the final
/// cursor home. Each row must end with `\r\n`; output post-processing is off
/// in raw mode, so a bare `\n` would not return the carriage.
pub trait RowSource {
    fn draw_rows(&mut self, frame: &mut Frame, rows: u16);
}

impl<R: RowSource + ?Sized> RowSource for &mut R {
    fn draw_rows(&mut self, frame: &mut Frame, rows: u16) {
        (**self).draw_rows(frame, rows);
    }
}

/// One marker character per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    marker: u8,
}

impl Placeholder {
    pub const DEFAULT_MARKER: u8 = b'~';

    #[must_use]
    pub const fn new(marker: u8) -> Self {
        Self { marker }
    }
}

impl Default for Placeholder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MARKER)
    }
}

impl RowSource for Placeholder {
    fn draw_rows(&mut self, frame: &mut Frame, rows: u16) {
        for _ in 0..rows {
            frame.push(&[self.marker, b'\r', b'\n']);
        }
    }
}
