// SPDX-License-Identifier: MIT
//
// Terminal errors.
//
// Every variant here is fatal to the editor: once the terminal refuses a
// termios call, a read, or a size probe, nothing drawn afterward can be
// trusted. The binary clears the screen, restores the terminal, and exits.

use std::io;

use thiserror::Error;

/// Failure talking to the controlling terminal.
#[derive(Debug, Error)]
pub enum TermError {
    /// Stdin is not a terminal, so there is no raw mode to enter.
    #[error("stdin is not a terminal")]
    NotATty,

    /// `tcgetattr` failed.
    #[error("tcgetattr: {0}")]
    GetAttr(#[source] io::Error),

    /// `tcsetattr` failed while entering or leaving raw mode.
    #[error("tcsetattr: {0}")]
    SetAttr(#[source] io::Error),

    /// A read from stdin failed for a reason other than a timeout.
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Writing a frame or a control sequence to stdout failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),

    /// Neither `TIOCGWINSZ` nor the cursor-report fallback produced a size.
    #[error("getWindowSize: {0}")]
    WindowSize(String),
}

/// Convenience alias used across the terminal layer.
pub type Result<T> = std::result::Result<T, TermError>;
