// SPDX-License-Identifier: MIT
//
// The terminal as the edit session sees it.
//
// `Tty` is everything the session needs from a terminal: bytes in, bytes
// out, the window size, and resize notifications. The real implementation
// is ked-term's `Terminal`; tests drive the session with a scripted one.

use std::io::Write;

use ked_term::ansi;
use ked_term::error::{Result, TermError};
use ked_term::input::ByteSource;
use ked_term::terminal::{self, Size, Terminal};

// ─── Tty ────────────────────────────────────────────────────────────────────

pub trait Tty: ByteSource + Write {
    /// Current window size in cells.
    fn window_size(&mut self) -> Result<Size>;

    /// `true` once per resize since the last call.
    fn take_resize(&mut self) -> bool;

    /// Leave raw mode. Must be idempotent.
    fn restore(&mut self) -> Result<()>;
}

impl Tty for Terminal {
    fn window_size(&mut self) -> Result<Size> {
        self.size()
    }

    fn take_resize(&mut self) -> bool {
        terminal::take_resize()
    }

    fn restore(&mut self) -> Result<()> {
        Terminal::restore(self)
    }
}

/// Clear the screen, home the cursor, and leave raw mode.
///
/// Used on every exit path, normal or fatal. Raw mode is left even when the
/// clear cannot be written.
///
/// # Errors
///
/// [`TermError::Write`] if the clear fails, otherwise the restore error.
pub fn leave(tty: &mut impl Tty) -> Result<()> {
    let cleared = clear(tty);
    let restored = tty.restore();
    cleared.and(restored)
}

fn clear(tty: &mut impl Tty) -> Result<()> {
    let mut bytes = Vec::with_capacity(8);
    ansi::clear_screen(&mut bytes).map_err(TermError::Write)?;
    ansi::cursor_home(&mut bytes).map_err(TermError::Write)?;
    tty.write_all(&bytes).map_err(TermError::Write)?;
    tty.flush().map_err(TermError::Write)
}

// ─── Scripted terminal (tests) ──────────────────────────────────────────────
