// SPDX-License-Identifier: MIT
//
// Terminal mode manager — capture, raw mode, and guaranteed restore.
//
// Safety: termios has no safe interface. The unsafe blocks below are the
// tcgetattr/tcsetattr/isatty calls and the raw fd write in the panic hook,
// each kept to the single call.
#![allow(unsafe_code)]
//
// Lifecycle of one raw-mode session:
//
//   Uninitialized ──capture──▶ OriginalCaptured ──enter──▶ RawActive ──exit──▶ Restored
//
// `Snapshot::capture` reads the original configuration. `RawMode::enter`
// applies the derived raw configuration and hands back a guard; the guard
// restores the snapshot when `exit` is called or when it is dropped. A
// process-wide panic hook restores from a global backup so a panic in the
// middle of a frame still leaves a usable shell behind.
//
// Only one guard can be live at a time: the raw state mirrors the real
// terminal, and there is only one of those.

use std::fmt;
use std::io;
use std::os::unix::io::RawFd;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use tracing::{debug, info};

use crate::ansi;
use crate::error::{Result, TermError};
use crate::flags::{ControlFlags, InputFlags, LocalFlags, OutputFlags};

/// Read timeout used when none is configured: 100 ms, one VTIME tick.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Check whether `fd` refers to a terminal.
#[must_use]
pub fn is_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

/// Convert a read timeout to a VTIME value (tenths of a second).
///
/// Rounds up so a short timeout never becomes "wait forever" or "don't wait
/// at all", and saturates at the 25.5 s a single `cc_t` can express.
#[must_use]
pub fn vtime_for(timeout: Duration) -> libc::cc_t {
    let tenths = timeout.as_millis().div_ceil(100).clamp(1, 255);
    libc::cc_t::try_from(tenths).unwrap_or(libc::cc_t::MAX)
}

// ─── Snapshot ───────────────────────────────────────────────────────────────

/// A captured terminal configuration.
///
/// Opaque copy of the termios record. The original snapshot is never
/// modified; raw mode is derived from it as a separate value.
#[derive(Clone, Copy)]
pub struct Snapshot {
    termios: libc::termios,
}

impl Snapshot {
    /// Read the current configuration of `fd` (`capture_original_mode`).
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalQuery`] if `fd` is not a terminal or the
    /// query fails.
    pub fn capture(fd: RawFd) -> Result<Self> {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(TermError::last_query("tcgetattr"));
        }
        debug!(fd, "captured terminal configuration");
        Ok(Self { termios })
    }

    /// Derive the raw-mode configuration from this one.
    ///
    /// Disables flow control, CR→NL translation, break signals, parity
    /// checking, bit stripping, output post-processing, echo, canonical
    /// input, signal keys and literal-next. Forces 8-bit characters. Reads
    /// return after at most `timeout` with zero or more bytes.
    #[must_use]
    pub fn raw(&self, timeout: Duration) -> Self {
        let mut t = self.termios;
        t.c_iflag &= !InputFlags::all().bits();
        t.c_oflag &= !OutputFlags::all().bits();
        t.c_cflag &= !ControlFlags::CSIZE.bits();
        t.c_cflag |= ControlFlags::CS8.bits();
        t.c_lflag &= !LocalFlags::all().bits();
        t.c_cc[libc::VMIN] = 0;
        t.c_cc[libc::VTIME] = vtime_for(timeout);
        Self { termios: t }
    }

    /// Apply this configuration to `fd`, discarding pending input and
    /// draining pending output first (`TCSAFLUSH`).
    fn apply(&self, fd: RawFd) -> Result<()> {
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const self.termios) } != 0 {
            return Err(TermError::last_query("tcsetattr"));
        }
        Ok(())
    }

    #[must_use]
    pub const fn input_flags(&self) -> InputFlags {
        InputFlags::from_bits_truncate(self.termios.c_iflag)
    }

    #[must_use]
    pub const fn output_flags(&self) -> OutputFlags {
        OutputFlags::from_bits_truncate(self.termios.c_oflag)
    }

    #[must_use]
    pub const fn control_flags(&self) -> ControlFlags {
        ControlFlags::from_bits_truncate(self.termios.c_cflag)
    }

    #[must_use]
    pub const fn local_flags(&self) -> LocalFlags {
        LocalFlags::from_bits_truncate(self.termios.c_lflag)
    }

    /// Minimum byte count for a read to return (`VMIN`).
    #[must_use]
    pub const fn vmin(&self) -> u8 {
        self.termios.c_cc[libc::VMIN]
    }

    /// Read timeout in tenths of a second (`VTIME`).
    #[must_use]
    pub const fn vtime(&self) -> u8 {
        self.termios.c_cc[libc::VTIME]
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.termios, &other.termios);
        a.c_iflag == b.c_iflag
            && a.c_oflag == b.c_oflag
            && a.c_cflag == b.c_cflag
            && a.c_lflag == b.c_lflag
            && a.c_cc == b.c_cc
    }
}

impl Eq for Snapshot {}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.termios;
        f.debug_struct("Snapshot")
            .field("c_iflag", &format_args!("{:#o}", t.c_iflag))
            .field("c_oflag", &format_args!("{:#o}", t.c_oflag))
            .field("c_cflag", &format_args!("{:#o}", t.c_cflag))
            .field("c_lflag", &format_args!("{:#o}", t.c_lflag))
            .field("vmin", &self.vmin())
            .field("vtime", &self.vtime())
            .finish()
    }
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Set while a [`RawMode`] guard is live.
static RAW_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Global copy of the original configuration for the panic hook.
///
/// The guard owns its own snapshot, but the hook can't reach it.
static TERMIOS_BACKUP: Mutex<Option<(RawFd, Snapshot)>> = Mutex::new(None);

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Whether raw mode is currently active in this process.
#[must_use]
pub fn is_raw_active() -> bool {
    RAW_ACTIVE.load(Ordering::SeqCst)
}

fn store_backup(entry: Option<(RawFd, Snapshot)>) {
    if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
        *guard = entry;
    }
}

/// Restore from the global backup and clear it. Best-effort, ignores errors.
fn restore_from_backup() {
    let entry = TERMIOS_BACKUP.lock().ok().and_then(|mut guard| guard.take());
    if let Some((fd, original)) = entry {
        let _ = original.apply(fd);
    }
}

/// Install a panic hook that clears the screen and restores the terminal
/// before the original hook prints the message.
///
/// Writes straight to fd 1 rather than through `io::stdout()` so a panic
/// raised while the stdout lock is held cannot deadlock.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if RAW_ACTIVE.load(Ordering::SeqCst) {
                for seq in [ansi::CLEAR_SCREEN, ansi::CURSOR_HOME] {
                    unsafe {
                        let _ = libc::write(libc::STDOUT_FILENO, seq.as_ptr().cast(), seq.len());
                    }
                }
                restore_from_backup();
            }
            original(info);
        }));
    });
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Where a raw-mode session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeState {
    /// Nothing captured yet.
    Uninitialized,
    /// A [`Snapshot`] exists but raw mode has not been applied.
    OriginalCaptured,
    /// Raw mode is applied; a [`RawMode`] guard is live.
    RawActive,
    /// The original configuration has been reapplied. Terminal.
    Restored,
}

/// Raw-mode guard.
///
/// Holds the original snapshot and restores it on [`exit`](Self::exit) or on
/// drop, whichever comes first.
///
/// ```no_run
/// use liko_term::terminal::{RawMode, DEFAULT_READ_TIMEOUT};
///
/// let mut raw = RawMode::enable(libc::STDIN_FILENO, DEFAULT_READ_TIMEOUT)?;
/// // ... read keys, paint frames ...
/// raw.exit()?;
/// # Ok::<(), liko_term::TermError>(())
/// ```
#[derive(Debug)]
pub struct RawMode {
    fd: RawFd,
    original: Snapshot,
    state: ModeState,
}

impl RawMode {
    /// Capture the configuration of `fd` and switch it to raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalQuery`] if capture or apply fails. On a
    /// capture failure nothing about the terminal has changed.
    pub fn enable(fd: RawFd, timeout: Duration) -> Result<Self> {
        let original = Snapshot::capture(fd)?;
        Self::enter(fd, original, timeout)
    }

    /// Switch `fd` to the raw configuration derived from `original`
    /// (`enter_raw_mode`).
    ///
    /// Registers restoration for every exit path: the guard's `Drop`, and a
    /// process-wide panic hook.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalQuery`] if the apply call fails, or with
    /// [`io::ErrorKind::AlreadyExists`] if another guard is live.
    pub fn enter(fd: RawFd, original: Snapshot, timeout: Duration) -> Result<Self> {
        if RAW_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(TermError::TerminalQuery {
                op: "tcsetattr",
                source: io::Error::new(io::ErrorKind::AlreadyExists, "raw mode is already active"),
            });
        }

        install_panic_hook();
        store_backup(Some((fd, original)));

        let raw = original.raw(timeout);
        if let Err(err) = raw.apply(fd) {
            store_backup(None);
            RAW_ACTIVE.store(false, Ordering::SeqCst);
            return Err(err);
        }

        info!(fd, vtime = raw.vtime(), "entered raw mode");
        Ok(Self {
            fd,
            original,
            state: ModeState::RawActive,
        })
    }

    /// Reapply the original configuration (`exit_raw_mode`).
    ///
    /// Idempotent: after the first call, further calls return `Ok(())`
    /// without touching the terminal. The state moves to
    /// [`ModeState::Restored`] before the apply, so a failed restore is
    /// never attempted again.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalQuery`] if the apply call fails.
    pub fn exit(&mut self) -> Result<()> {
        if self.state == ModeState::Restored {
            return Ok(());
        }
        self.state = ModeState::Restored;
        store_backup(None);
        RAW_ACTIVE.store(false, Ordering::SeqCst);

        self.original.apply(self.fd)?;
        info!(fd = self.fd, "restored terminal configuration");
        Ok(())
    }

    /// The file descriptor this guard controls.
    #[inline]
    #[must_use]
    pub const fn fd(&self) -> RawFd {
        self.fd
    }

    /// The configuration that will be restored.
    #[inline]
    #[must_use]
    pub const fn original(&self) -> &Snapshot {
        &self.original
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> ModeState {
        self.state
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = self.exit() {
            tracing::error!(%err, "failed to restore terminal");
            eprintln!("liko: {err}");
            process::exit(1);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pty::{self, Pty, tty_lock};
    use pretty_assertions::assert_eq;

    fn cooked() -> Snapshot {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        termios.c_iflag = libc::BRKINT | libc::ICRNL | libc::IXON | libc::IUTF8;
        termios.c_oflag = libc::OPOST | libc::ONLCR;
        termios.c_cflag = libc::CS7 | libc::CREAD;
        termios.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN | libc::ECHOE;
        termios.c_cc[libc::VMIN] = 1;
        Snapshot { termios }
    }

    // ── Raw derivation ────────────────────────────────────────────────

    #[test]
    fn raw_clears_input_processing() {
        let raw = cooked().raw(DEFAULT_READ_TIMEOUT);
        assert_eq!(raw.input_flags(), InputFlags::empty());
        assert_ne!(raw.termios.c_iflag & libc::IUTF8, 0, "unrelated bits survive");
    }

    #[test]
    fn raw_clears_output_processing() {
        let raw = cooked().raw(DEFAULT_READ_TIMEOUT);
        assert_eq!(raw.output_flags(), OutputFlags::empty());
    }

    #[test]
    fn raw_forces_eight_bit_characters() {
        let raw = cooked().raw(DEFAULT_READ_TIMEOUT);
        assert!(raw.control_flags().is_eight_bit());
        assert_ne!(raw.termios.c_cflag & libc::CREAD, 0);
    }

    #[test]
    fn raw_clears_local_modes() {
        let raw = cooked().raw(DEFAULT_READ_TIMEOUT);
        assert_eq!(raw.local_flags(), LocalFlags::empty());
        assert_ne!(raw.termios.c_lflag & libc::ECHOE, 0);
    }

    #[test]
    fn raw_uses_timed_reads() {
        let raw = cooked().raw(DEFAULT_READ_TIMEOUT);
        assert_eq!(raw.vmin(), 0);
        assert_eq!(raw.vtime(), 1);
    }

    #[test]
    fn raw_leaves_original_untouched() {
        let original = cooked();
        let copy = original;
        let _ = original.raw(DEFAULT_READ_TIMEOUT);
        assert_eq!(original, copy);
    }

    #[test]
    fn vtime_rounds_up_and_clamps() {
        assert_eq!(vtime_for(Duration::ZERO), 1);
        assert_eq!(vtime_for(Duration::from_millis(1)), 1);
        assert_eq!(vtime_for(Duration::from_millis(100)), 1);
        assert_eq!(vtime_for(Duration::from_millis(101)), 2);
        assert_eq!(vtime_for(Duration::from_millis(2500)), 25);
        assert_eq!(vtime_for(Duration::from_secs(60)), 255);
    }

    #[test]
    fn snapshot_debug_shows_timing() {
        let shown = format!("{:?}", cooked().raw(DEFAULT_READ_TIMEOUT));
        assert!(shown.contains("vmin: 0"), "{shown}");
        assert!(shown.contains("vtime: 1"), "{shown}");
    }

    // ── Capture ───────────────────────────────────────────────────────

    #[test]
    fn capture_on_pipe_is_a_query_error() {
        let (read_end, write_end) = test_pty::pipe();
        let err = Snapshot::capture(read_end).unwrap_err();
        test_pty::close(read_end);
        test_pty::close(write_end);

        assert_eq!(err.op(), "tcgetattr");
        assert_eq!(err.os_error().raw_os_error(), Some(libc::ENOTTY));
    }

    #[test]
    fn capture_on_pty_succeeds() {
        let pty = Pty::open();
        assert!(is_tty(pty.slave));
        assert!(Snapshot::capture(pty.slave).is_ok());
    }

    #[test]
    fn is_tty_false_for_pipe() {
        let (read_end, write_end) = test_pty::pipe();
        assert!(!is_tty(read_end));
        test_pty::close(read_end);
        test_pty::close(write_end);
    }

    // ── Raw mode lifecycle ────────────────────────────────────────────

    #[test]
    fn enable_applies_raw_configuration() {
        let _lock = tty_lock();
        let pty = Pty::open();
        let mut raw = RawMode::enable(pty.slave, DEFAULT_READ_TIMEOUT).unwrap();
        assert_eq!(raw.state(), ModeState::RawActive);
        assert!(is_raw_active());

        let applied = Snapshot::capture(pty.slave).unwrap();
        assert_eq!(applied.local_flags(), LocalFlags::empty());
        assert_eq!(applied.input_flags(), InputFlags::empty());
        assert_eq!(applied.output_flags(), OutputFlags::empty());
        assert!(applied.control_flags().is_eight_bit());
        assert_eq!(applied.vmin(), 0);
        assert_eq!(applied.vtime(), 1);

        raw.exit().unwrap();
    }

    #[test]
    fn exit_restores_original_configuration() {
        let _lock = tty_lock();
        let pty = Pty::open();
        let before = Snapshot::capture(pty.slave).unwrap();

        let mut raw = RawMode::enable(pty.slave, DEFAULT_READ_TIMEOUT).unwrap();
        assert_ne!(Snapshot::capture(pty.slave).unwrap(), before);
        raw.exit().unwrap();

        assert_eq!(Snapshot::capture(pty.slave).unwrap(), before);
        assert_eq!(raw.state(), ModeState::Restored);
        assert!(!is_raw_active());
    }

    #[test]
    fn drop_restores_original_configuration() {
        let _lock = tty_lock();
        let pty = Pty::open();
        let before = Snapshot::capture(pty.slave).unwrap();

        {
            let _raw = RawMode::enable(pty.slave, DEFAULT_READ_TIMEOUT).unwrap();
        }

        assert_eq!(Snapshot::capture(pty.slave).unwrap(), before);
        assert!(!is_raw_active());
    }

    #[test]
    fn exit_twice_is_harmless() {
        let _lock = tty_lock();
        let pty = Pty::open();
        let before = Snapshot::capture(pty.slave).unwrap();

        let mut raw = RawMode::enable(pty.slave, DEFAULT_READ_TIMEOUT).unwrap();
        raw.exit().unwrap();
        raw.exit().unwrap();
        drop(raw);

        assert_eq!(Snapshot::capture(pty.slave).unwrap(), before);
    }

    #[test]
    fn second_guard_is_rejected_while_first_is_live() {
        let _lock = tty_lock();
        let pty = Pty::open();
        let mut first = RawMode::enable(pty.slave, DEFAULT_READ_TIMEOUT).unwrap();

        let err = RawMode::enable(pty.slave, DEFAULT_READ_TIMEOUT).unwrap_err();
        assert_eq!(err.os_error().kind(), io::ErrorKind::AlreadyExists);
        assert!(is_raw_active(), "rejected attempt must not clear the live state");

        first.exit().unwrap();
        let mut again = RawMode::enable(pty.slave, DEFAULT_READ_TIMEOUT).unwrap();
        again.exit().unwrap();
    }

    #[test]
    fn enable_on_non_terminal_leaves_no_state_behind() {
        let _lock = tty_lock();
        let (read_end, write_end) = test_pty::pipe();
        let err = RawMode::enable(read_end, DEFAULT_READ_TIMEOUT).unwrap_err();
        test_pty::close(read_end);
        test_pty::close(write_end);

        assert_eq!(err.op(), "tcgetattr");
        assert!(!is_raw_active());
        assert!(TERMIOS_BACKUP.lock().unwrap().is_none());
    }

    #[test]
    fn enter_failure_releases_the_slot() {
        let _lock = tty_lock();
        let pty = Pty::open();
        let original = Snapshot::capture(pty.slave).unwrap();

        let err = RawMode::enter(-1, original, DEFAULT_READ_TIMEOUT).unwrap_err();
        assert_eq!(err.op(), "tcsetattr");
        assert!(!is_raw_active());

        let mut raw = RawMode::enter(pty.slave, original, DEFAULT_READ_TIMEOUT).unwrap();
        raw.exit().unwrap();
    }

    #[test]
    fn backup_tracks_the_live_guard() {
        let _lock = tty_lock();
        let pty = Pty::open();
        let mut raw = RawMode::enable(pty.slave, DEFAULT_READ_TIMEOUT).unwrap();
        let backed_up = TERMIOS_BACKUP.lock().unwrap().map(|(fd, _)| fd);
        assert_eq!(backed_up, Some(pty.slave));

        raw.exit().unwrap();
        assert!(TERMIOS_BACKUP.lock().unwrap().is_none());
    }

    #[test]
    fn custom_timeout_reaches_vtime() {
        let _lock = tty_lock();
        let pty = Pty::open();
        let mut raw = RawMode::enable(pty.slave, Duration::from_millis(500)).unwrap();
        assert_eq!(Snapshot::capture(pty.slave).unwrap().vtime(), 5);
        raw.exit().unwrap();
    }
}
