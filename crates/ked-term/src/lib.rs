// SPDX-License-Identifier: MIT
//
// ked-term: terminal layer for ked.
//
// Direct terminal control via raw termios and ANSI escape sequences:
// entering and leaving raw mode, measuring the window, decoding key
// sequences from stdin, and buffering a whole frame for one write.
//
// Like the rest of ked this crate avoids TUI frameworks (ratatui,
// crossterm). The editor needs a handful of escape sequences and one
// input state machine; every byte sent to the terminal is accounted for.

pub mod ansi;
pub mod error;
pub mod input;
pub mod output;
pub mod terminal;
