// SPDX-License-Identifier: MIT
//
// The edit session.
//
// One `Editor` owns everything the running editor needs: the terminal, the
// file store, the document, the cursor and viewport, the status message, and
// the quit countdown. Each loop step reads one key, applies it, and redraws
// the whole frame:
//
//   read_key → process_key → Document mutation / cursor move
//            → refresh_screen → View::scroll → View::render → one write
//
// The terminal is any `Tty`, so tests drive the session with a byte script
// and inspect the frames it writes.

use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use ked_editor::cursor::Cursor;
use ked_editor::document::Document;
use ked_editor::options::Options;
use ked_editor::status::StatusMessage;
use ked_editor::storage::FileStore;
use ked_editor::view::{Screen, View};
use ked_term::error::{Result, TermError};
use ked_term::input::{BACKSPACE, ENTER, ESC, Key, ctrl, read_key};
use ked_term::output::OutputBuffer;
use ked_term::terminal::Size;

use crate::prompt::NoHandler;
use crate::tty::{self, Tty};

/// Shown once at start-up.
pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

const CTRL_F: u8 = ctrl(b'f');
const CTRL_H: u8 = ctrl(b'h');
const CTRL_L: u8 = ctrl(b'l');
const CTRL_Q: u8 = ctrl(b'q');
const CTRL_S: u8 = ctrl(b's');

/// Whether the session keeps running after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// ─── Edit state ─────────────────────────────────────────────────────────────

/// The part of the session that prompt handlers may change.
#[derive(Debug)]
pub struct EditState {
    pub doc: Document,
    pub cursor: Cursor,
    pub view: View,
    pub screen: Screen,
    pub status: StatusMessage,
}

// ─── Editor ─────────────────────────────────────────────────────────────────

pub struct Editor<T, S> {
    pub(crate) tty: T,
    store: S,
    options: Options,
    pub(crate) state: EditState,
    quit_remaining: u32,
    out: OutputBuffer,
}

impl<T: Tty, S: FileStore> Editor<T, S> {
    /// A session on an empty, unnamed document.
    pub fn new(tty: T, store: S, options: Options, size: Size) -> Self {
        let mut status = StatusMessage::new();
        status.set(HELP_MESSAGE);
        Self {
            tty,
            store,
            state: EditState {
                doc: Document::new(&options),
                cursor: Cursor::default(),
                view: View::new(),
                screen: Screen::from_window(size.rows, size.cols),
                status,
            },
            quit_remaining: options.quit_times,
            options,
            out: OutputBuffer::new(),
        }
    }

    /// Load `path` into the document.
    ///
    /// A missing file starts an empty document bound to that name. Any
    /// other failure is reported in the message bar and leaves the document
    /// empty and unnamed.
    pub fn open(&mut self, path: &Path) {
        match self.state.doc.load(&self.store, path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "new file");
                self.state.doc.set_filename(path);
                self.state.status.set("New file");
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "open failed");
                self.state
                    .status
                    .set(format!("Can't open {}: {err}", path.display()));
            }
        }
    }

    /// Main loop: redraw, read one key, apply it. Returns after a quit once
    /// the screen is cleared and the terminal restored.
    ///
    /// # Errors
    ///
    /// Any terminal failure. The caller is expected to call
    /// [`shutdown`](Self::shutdown) and exit.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.check_resize()?;
            self.refresh_screen()?;
            let key = read_key(&mut self.tty)?;
            if self.process_key(key)? == Flow::Quit {
                return self.shutdown();
            }
        }
    }

    /// Clear the screen and leave raw mode.
    ///
    /// # Errors
    ///
    /// Terminal write or restore failure.
    pub fn shutdown(&mut self) -> Result<()> {
        tty::leave(&mut self.tty)
    }

    /// Pick up a pending window change before the next frame.
    ///
    /// # Errors
    ///
    /// [`TermError::WindowSize`] if the new size cannot be read.
    pub fn check_resize(&mut self) -> Result<()> {
        if self.tty.take_resize() {
            let size = self.tty.window_size()?;
            self.resize(size);
        }
        Ok(())
    }

    pub fn resize(&mut self, size: Size) {
        debug!(rows = size.rows, cols = size.cols, "resize");
        self.state.screen = Screen::from_window(size.rows, size.cols);
    }

    /// Scroll, compose, and write one frame.
    ///
    /// # Errors
    ///
    /// [`TermError::Write`] if the terminal rejects the frame.
    pub fn refresh_screen(&mut self) -> Result<()> {
        let state = &mut self.state;
        state.view.scroll(&state.doc, state.cursor, state.screen);
        let message = state.status.visible(self.options.message_timeout);
        state
            .view
            .render(&state.doc, state.cursor, state.screen, message, &mut self.out)
            .map_err(TermError::Write)?;
        self.out.flush_to(&mut self.tty).map_err(TermError::Write)
    }

    // ── Key dispatch ────────────────────────────────────────────────

    /// Apply one key.
    ///
    /// # Errors
    ///
    /// Terminal failures from the save and find prompts.
    pub fn process_key(&mut self, key: Key) -> Result<Flow> {
        debug!(?key, "key");

        match key {
            Key::Byte(ENTER) => self.insert_newline(),

            Key::Byte(CTRL_Q) => {
                if self.state.doc.is_dirty() && self.quit_remaining > 1 {
                    self.quit_remaining -= 1;
                    self.state.status.set(format!(
                        "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                        self.quit_remaining
                    ));
                    return Ok(Flow::Continue);
                }
                return Ok(Flow::Quit);
            }

            Key::Byte(CTRL_S) => self.save()?,
            Key::Byte(CTRL_F) => self.find()?,

            Key::Home => self.state.cursor.move_to_line_start(),
            Key::End => self.state.cursor.move_to_line_end(&self.state.doc),

            Key::Delete => {
                self.state.cursor.move_right(&self.state.doc);
                self.delete_char();
            }
            Key::Byte(BACKSPACE | CTRL_H) => self.delete_char(),

            Key::PageUp | Key::PageDown => self.page(key),

            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                self.move_cursor(key);
            }

            Key::Byte(CTRL_L | ESC) => {}

            Key::Byte(b) => self.insert_char(b),
        }

        self.quit_remaining = self.options.quit_times;
        Ok(Flow::Continue)
    }

    fn move_cursor(&mut self, key: Key) {
        let EditState { doc, cursor, .. } = &mut self.state;
        match key {
            Key::ArrowLeft => cursor.move_left(doc),
            Key::ArrowRight => cursor.move_right(doc),
            Key::ArrowUp => cursor.move_up(doc),
            Key::ArrowDown => cursor.move_down(doc),
            _ => {}
        }
    }

    /// Jump to the top (bottom) of the viewport, then one screen further.
    fn page(&mut self, key: Key) {
        let EditState {
            doc,
            cursor,
            view,
            screen,
            ..
        } = &mut self.state;

        if key == Key::PageUp {
            cursor.row = view.row_offset;
        } else {
            cursor.row = (view.row_offset + screen.rows)
                .saturating_sub(1)
                .min(doc.num_rows());
        }
        for _ in 0..screen.rows {
            if key == Key::PageUp {
                cursor.move_up(doc);
            } else {
                cursor.move_down(doc);
            }
        }
        cursor.clamp(doc);
    }

    // ── Editing ─────────────────────────────────────────────────────

    fn insert_char(&mut self, byte: u8) {
        let EditState { doc, cursor, .. } = &mut self.state;
        if cursor.row == doc.num_rows() {
            doc.insert_row(doc.num_rows(), Vec::new());
        }
        doc.insert_char(cursor.row, cursor.col, byte);
        cursor.col += 1;
    }

    fn insert_newline(&mut self) {
        let EditState { doc, cursor, .. } = &mut self.state;
        doc.split_row(cursor.row, cursor.col);
        cursor.row += 1;
        cursor.col = 0;
    }

    fn delete_char(&mut self) {
        let EditState { doc, cursor, .. } = &mut self.state;
        if cursor.row == doc.num_rows() || (cursor.col == 0 && cursor.row == 0) {
            return;
        }
        if cursor.col > 0 {
            doc.delete_char(cursor.row, cursor.col - 1);
            cursor.col -= 1;
        } else if let Some(col) = doc.join_with_previous(cursor.row) {
            cursor.row -= 1;
            cursor.col = col;
        }
    }

    // ── Save ────────────────────────────────────────────────────────

    fn save(&mut self) -> Result<()> {
        let result = if self.state.doc.filename().is_some() {
            self.state.doc.save(&self.store)
        } else {
            let Some(name) = self.prompt("Save as: {} (ESC to cancel)", &mut NoHandler)? else {
                self.state.status.set("Save aborted");
                return Ok(());
            };
            self.state.doc.save_as(&self.store, name)
        };

        match result {
            Ok(written) => self
                .state
                .status
                .set(format!("{written} bytes written to disk")),
            Err(err) => {
                warn!(%err, "save failed");
                self.state
                    .status
                    .set(format!("Can't save! I/O error: {err}"));
            }
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
