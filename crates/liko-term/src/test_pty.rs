// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Pseudo-terminal fixture for tests.
//
// Opens a master/slave pair with posix_openpt so termios calls have a real
// terminal to work on even when the test runner has no controlling tty.
// Raw mode is process-global, so every test touching it holds `tty_lock()`.

use std::os::unix::io::RawFd;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// Serialize tests that enter raw mode.
pub fn tty_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// A master/slave pseudo-terminal pair, closed on drop.
pub struct Pty {
    pub master: RawFd,
    pub slave: RawFd,
}

impl Pty {
    pub fn open() -> Self {
        unsafe {
            let master = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
            assert!(master >= 0, "posix_openpt failed");
            assert_eq!(libc::grantpt(master), 0, "grantpt failed");
            assert_eq!(libc::unlockpt(master), 0, "unlockpt failed");
            let name = libc::ptsname(master);
            assert!(!name.is_null(), "ptsname failed");
            let slave = libc::open(name, libc::O_RDWR | libc::O_NOCTTY);
            assert!(slave >= 0, "opening the slave side failed");
            Self { master, slave }
        }
    }

    /// Type bytes into the slave's input queue.
    pub fn type_bytes(&self, bytes: &[u8]) {
        let n = unsafe { libc::write(self.master, bytes.as_ptr().cast(), bytes.len()) };
        assert_eq!(usize::try_from(n).ok(), Some(bytes.len()));
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.slave);
            libc::close(self.master);
        }
    }
}

/// A pipe pair: (read end, write end). Neither end is a terminal.
pub fn pipe() -> (RawFd, RawFd) {
    let mut fds = [0; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    assert_eq!(rc, 0, "pipe failed");
    (fds[0], fds[1])
}

pub fn close(fd: RawFd) {
    unsafe {
        libc::close(fd);
    }
}
