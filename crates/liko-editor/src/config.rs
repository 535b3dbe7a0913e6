//! Editor configuration from the environment.
//!
//! | Variable               | Field          | Default | Accepted              |
//! |------------------------|----------------|---------|-----------------------|
//! | `LIKO_QUIT_KEY`        | `quit_char`    | `q`     | one ASCII graphic     |
//! | `LIKO_ROWS`            | `rows`         | `24`    | `1..=500`             |
//! | `LIKO_READ_TIMEOUT_MS` | `read_timeout` | `100`   | `1..=25500`           |
//! | `LIKO_LOG`             | `log_file`     | unset   | any non-blank path    |
//!
//! Anything outside the accepted range falls back to the default.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use liko_term::input::ctrl_key;
use liko_term::terminal::DEFAULT_READ_TIMEOUT;

pub const DEFAULT_QUIT_CHAR: u8 = b'q';
pub const DEFAULT_ROWS: u16 = 24;
pub const MAX_ROWS: u16 = 500;

/// Longest timeout VTIME can express, in milliseconds.
pub const MAX_READ_TIMEOUT_MS: u64 = 25_500;

pub const ENV_QUIT_KEY: &str = "LIKO_QUIT_KEY";
pub const ENV_ROWS: &str = "LIKO_ROWS";
pub const ENV_READ_TIMEOUT_MS: &str = "LIKO_READ_TIMEOUT_MS";
pub const ENV_LOG: &str = "LIKO_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Letter whose Ctrl form quits.
    pub quit_char: u8,
    /// Placeholder rows painted each frame.
    pub rows: u16,
    /// How long a key read waits before reporting no input.
    pub read_timeout: Duration,
    /// Where to write the trace log. `None` disables logging.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quit_char: DEFAULT_QUIT_CHAR,
            rows: DEFAULT_ROWS,
            read_timeout: DEFAULT_READ_TIMEOUT,
            log_file: None,
        }
    }
}

impl Config {
    /// Read the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            quit_char: lookup(ENV_QUIT_KEY)
                .as_deref()
                .and_then(parse_quit_char)
                .unwrap_or(defaults.quit_char),
            rows: lookup(ENV_ROWS)
                .as_deref()
                .and_then(parse_rows)
                .unwrap_or(defaults.rows),
            read_timeout: lookup(ENV_READ_TIMEOUT_MS)
                .as_deref()
                .and_then(parse_timeout)
                .unwrap_or(defaults.read_timeout),
            log_file: lookup(ENV_LOG).and_then(|value| {
                if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }),
        }
    }

    /// The byte that quits: Ctrl+`quit_char`.
    #[inline]
    #[must_use]
    pub const fn quit_byte(&self) -> u8 {
        ctrl_key(self.quit_char)
    }
}

fn parse_quit_char(value: &str) -> Option<u8> {
    match value.trim().as_bytes() {
        [b] if b.is_ascii_graphic() => Some(*b),
        _ => None,
    }
}

fn parse_rows(value: &str) -> Option<u16> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|rows| (1..=MAX_ROWS).contains(rows))
}

fn parse_timeout(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| (1..=MAX_READ_TIMEOUT_MS).contains(ms))
        .map(Duration::from_millis)
}
