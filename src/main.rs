// SPDX-License-Identifier: MIT
//
// liko — a tiny terminal screen editor.
//
// This binary wires the two crates together:
//
//   liko-term   → raw mode guard, key reader, signal flag
//   liko-editor → the repaint / read / dispatch loop
//
// Every failure flows back here as a `TermError`. This is the one place
// that turns it into the exit sequence: clear the screen, restore the
// terminal, print `liko: <op>: <cause>`, exit 1.

mod logging;

use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::process;

use liko_editor::config::Config;
use liko_editor::editor::{Editor, Exit};
use liko_editor::render::Placeholder;
use liko_term::TermError;
use liko_term::ansi;
use liko_term::input::TtyKeys;
use liko_term::signal::SignalFlag;
use liko_term::terminal::{RawMode, Snapshot};
use tracing::{debug, error, info, warn};

fn main() {
    let config = Config::from_env();
    logging::init(config.log_file.as_deref());
    info!(version = env!("CARGO_PKG_VERSION"), "starting liko");
    debug!(?config, "configuration");

    let code = match run(&config) {
        Ok(exit) => {
            info!(?exit, "exiting");
            exit.code()
        }
        Err(err) => {
            error!(%err, "fatal");
            eprintln!("liko: {err}");
            1
        }
    };
    process::exit(code);
}

fn run(config: &Config) -> Result<Exit, TermError> {
    let signals = SignalFlag::register()?;
    let fd = io::stdin().as_raw_fd();
    let original = Snapshot::capture(fd)?;
    let mut raw = RawMode::enter(fd, original, config.read_timeout)?;

    let stdout = io::stdout();
    let mut editor = Editor::new(
        TtyKeys::new(fd),
        stdout.lock(),
        Placeholder::default(),
        config,
    )
    .with_signals(signals);

    let result = editor.run();
    drop(editor);

    if result.is_err() {
        // Leave a blank screen under the diagnostic. The output may be the
        // thing that failed, so this is best-effort.
        let mut out = stdout.lock();
        let _ = ansi::reset_screen(&mut out).and_then(|()| out.flush());
    }

    let restored = raw.exit();
    match (result, restored) {
        (Ok(exit), Ok(())) => Ok(exit),
        (Err(err), Err(restore_err)) => {
            warn!(%restore_err, "terminal restore also failed");
            Err(err)
        }
        (Err(err), Ok(())) | (Ok(_), Err(err)) => Err(err),
    }
}
