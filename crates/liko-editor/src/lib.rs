//! # liko-editor — Editor core for liko
//!
//! The control loop and the seams later features plug into:
//!
//! - **[`editor`]** — `Editor`: repaint, read one key, dispatch; until quit
//! - **[`keymap`]** — `Keymap`: the dispatch table from keys to commands
//! - **[`render`]** — `Frame` and the `RowSource` render-content provider
//! - **[`config`]** — `Config` read from `LIKO_*` environment variables
//!
//! Text buffers, cursor movement and file I/O will arrive as a `RowSource`
//! and a richer `Keymap`; the loop itself does not change.

pub mod config;
pub mod editor;
pub mod keymap;
pub mod render;
