// SPDX-License-Identifier: MIT
//
// ked: a small terminal text editor.
//
// This is the main binary that wires together the two crates:
//
//   ked-term   → raw mode, window size, key decoding, output buffering
//   ked-editor → rows, highlighting, search, options, screen composition
//
// Each keypress flows through:
//
//   stdin → read_key → Editor::process_key → Document / Cursor
//   Editor::refresh_screen → View::render → OutputBuffer → one write
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text rows                    │  ← h - 2 rows
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row
//   ├──────────────────────────────┤
//   │ message bar                  │  ← 1 row
//   └──────────────────────────────┘

mod editor;
mod find;
mod logging;
mod prompt;
mod tty;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use ked_editor::options::Options;
use ked_editor::storage::DiskStore;
use ked_term::error::TermError;
use ked_term::terminal::Terminal;

use crate::editor::Editor;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "ked", version, about = "A small terminal text editor")]
struct Cli {
    /// File to edit. Created on first save if it does not exist.
    file: Option<PathBuf>,
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Before raw mode, so a failure here can still be reported on stderr.
    let _log = match logging::init() {
        Ok(guard) => {
            info!(log_file = %guard.log_file.display(), "ked starting");
            Some(guard)
        }
        Err(err) => {
            eprintln!("ked: logging disabled: {err}");
            None
        }
    };

    let options = Options::load();

    let mut terminal = match Terminal::new() {
        Ok(terminal) => terminal,
        Err(err) => return fail(&err),
    };
    let size = match tty::Tty::window_size(&mut terminal) {
        Ok(size) => size,
        Err(err) => {
            if let Err(restore) = tty::leave(&mut terminal) {
                error!(%restore, "terminal restore failed");
            }
            return fail(&err);
        }
    };

    let mut editor = Editor::new(terminal, DiskStore, options, size);
    if let Some(path) = &cli.file {
        editor.open(path);
    }

    match editor.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Err(restore) = editor.shutdown() {
                error!(%restore, "terminal restore failed");
            }
            fail(&err)
        }
    }
}

/// Report a fatal terminal error. The terminal must already be restored.
fn fail(err: &TermError) -> ExitCode {
    error!(%err, "fatal");
    eprintln!("ked: {err}");
    ExitCode::FAILURE
}
