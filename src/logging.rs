// SPDX-License-Identifier: MIT
//
// Trace logging to a file.
//
// The terminal is the editor's screen, so logs can't go to stdout or stderr
// while raw mode is active. Logging is off unless `LIKO_LOG` names a file;
// `RUST_LOG` picks the filter (default `info`).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber writing to `path`, if given.
///
/// Runs before raw mode, so a log file that can't be opened is reported on
/// stderr and the editor carries on without logging.
pub fn init(path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };

    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("liko: cannot open log file {}: {err}", path.display());
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
