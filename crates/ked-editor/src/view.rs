//! View: scrolling and full-frame composition.
//!
//! A `View` holds only the viewport offsets. It doesn't own the document or
//! cursor; those are passed to [`scroll`](View::scroll) and
//! [`render`](View::render) as parameters.
//!
//! The screen layout:
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ int main() {                       │
//! │     return 0;                      │  ← Screen::rows text rows
//! │ }                                  │
//! │ ~                                  │
//! │ main.c - 3 lines       c | 1/3     │  ← status bar (reverse video)
//! │ HELP: Ctrl-S = save | ...          │  ← message bar
//! └────────────────────────────────────┘
//! ```
//!
//! Every frame is redrawn in full into one buffer: hide the cursor, home,
//! each text row followed by erase-to-end-of-line, the two bars, then place
//! and show the cursor. Colors are switched only where the highlight class
//! changes.

use std::io::{self, Write};

use ked_term::ansi;

use crate::cursor::Cursor;
use crate::document::Document;
use crate::highlight::Highlight;

/// Version shown in the welcome banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bytes of the filename shown in the status bar.
pub const FILENAME_WIDTH: usize = 20;

/// Rows reserved below the text area for the status and message bars.
pub const BAR_ROWS: usize = 2;

/// Size of the text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub rows: usize,
    pub cols: usize,
}

impl Screen {
    /// Text area for a terminal window of `rows` x `cols`.
    #[must_use]
    pub const fn from_window(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows.saturating_sub(BAR_ROWS),
            cols,
        }
    }
}

/// Viewport offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct View {
    /// First document row on screen.
    pub row_offset: usize,
    /// First render column on screen.
    pub col_offset: usize,
    render_col: usize,
}

impl View {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            render_col: 0,
        }
    }

    /// The cursor's render column as of the last [`scroll`](Self::scroll).
    #[must_use]
    pub const fn render_col(&self) -> usize {
        self.render_col
    }

    /// Move the offsets so the cursor is on screen.
    pub fn scroll(&mut self, doc: &Document, cursor: Cursor, screen: Screen) {
        self.render_col = doc
            .row(cursor.row)
            .map_or(0, |row| row.col_to_render_col(cursor.col, doc.tab_stop()));

        let rows = screen.rows.max(1);
        let cols = screen.cols.max(1);

        if cursor.row < self.row_offset {
            self.row_offset = cursor.row;
        }
        if cursor.row >= self.row_offset + rows {
            self.row_offset = cursor.row + 1 - rows;
        }
        if self.render_col < self.col_offset {
            self.col_offset = self.render_col;
        }
        if self.render_col >= self.col_offset + cols {
            self.col_offset = self.render_col + 1 - cols;
        }
    }

    /// Compose one full frame into `out`.
    ///
    /// `message` is the status message to show, already filtered for age.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn render(
        &self,
        doc: &Document,
        cursor: Cursor,
        screen: Screen,
        message: Option<&str>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        ansi::cursor_hide(out)?;
        ansi::cursor_home(out)?;

        self.draw_rows(doc, screen, out)?;
        draw_status_bar(doc, cursor, screen, out)?;
        draw_message_bar(message, screen, out)?;

        ansi::cursor_to(
            out,
            self.render_col.saturating_sub(self.col_offset),
            cursor.row.saturating_sub(self.row_offset),
        )?;
        ansi::cursor_show(out)
    }

    fn draw_rows(&self, doc: &Document, screen: Screen, out: &mut impl Write) -> io::Result<()> {
        for y in 0..screen.rows {
            match doc.row(y + self.row_offset) {
                Some(row) => {
                    let render = row.render();
                    let start = self.col_offset.min(render.len());
                    let end = (start + screen.cols).min(render.len());
                    draw_text(&render[start..end], &row.highlight()[start..end], out)?;
                }
                None => {
                    if doc.num_rows() == 0 && doc.filename().is_none() && y == screen.rows / 3 {
                        draw_welcome(screen.cols, out)?;
                    } else {
                        out.write_all(b"~")?;
                    }
                }
            }
            ansi::clear_line(out)?;
            out.write_all(b"\r\n")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row text
// ---------------------------------------------------------------------------

/// Control bytes are drawn as a reverse-video placeholder.
const fn is_control(byte: u8) -> bool {
    byte < 0x20 || byte == 0x7f
}

/// `@` + byte for Ctrl-@ through Ctrl-Z, `?` for the rest.
const fn control_placeholder(byte: u8) -> u8 {
    if byte <= 26 { b'@' + byte } else { b'?' }
}

fn draw_text(bytes: &[u8], classes: &[Highlight], out: &mut impl Write) -> io::Result<()> {
    let mut current: Option<u8> = None;

    for (&byte, &class) in bytes.iter().zip(classes) {
        if is_control(byte) {
            ansi::inverse(out)?;
            out.write_all(&[control_placeholder(byte)])?;
            ansi::reset(out)?;
            if let Some(color) = current {
                ansi::fg(out, color)?;
            }
        } else if class == Highlight::Normal {
            if current.take().is_some() {
                ansi::fg_default(out)?;
            }
            out.write_all(&[byte])?;
        } else {
            let color = class.color();
            if current != Some(color) {
                current = Some(color);
                ansi::fg(out, color)?;
            }
            out.write_all(&[byte])?;
        }
    }
    ansi::fg_default(out)
}

fn draw_welcome(cols: usize, out: &mut impl Write) -> io::Result<()> {
    let welcome = format!("ked editor -- version {VERSION}");
    let len = welcome.len().min(cols);
    let mut padding = (cols - len) / 2;
    if padding > 0 {
        out.write_all(b"~")?;
        padding -= 1;
    }
    for _ in 0..padding {
        out.write_all(b" ")?;
    }
    out.write_all(&welcome.as_bytes()[..len])
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

fn draw_status_bar(
    doc: &Document,
    cursor: Cursor,
    screen: Screen,
    out: &mut impl Write,
) -> io::Result<()> {
    let name = doc.filename().map_or_else(
        || "[No Name]".to_string(),
        |path| path.to_string_lossy().into_owned(),
    );
    let name = &name.as_bytes()[..name.len().min(FILENAME_WIDTH)];

    let mut left = name.to_vec();
    write!(
        left,
        " - {} lines {}",
        doc.num_rows(),
        if doc.is_dirty() { "(modified)" } else { "" }
    )?;
    let right = format!(
        "{} | {}/{}",
        doc.syntax().map_or("no ft", |s| s.name),
        cursor.row + 1,
        doc.num_rows()
    );

    ansi::inverse(out)?;
    let mut len = left.len().min(screen.cols);
    out.write_all(&left[..len])?;
    while len < screen.cols {
        if screen.cols - len == right.len() {
            out.write_all(right.as_bytes())?;
            break;
        }
        out.write_all(b" ")?;
        len += 1;
    }
    ansi::reset(out)?;
    out.write_all(b"\r\n")
}

fn draw_message_bar(message: Option<&str>, screen: Screen, out: &mut impl Write) -> io::Result<()> {
    ansi::clear_line(out)?;
    if let Some(message) = message {
        let bytes = message.as_bytes();
        out.write_all(&bytes[..bytes.len().min(screen.cols)])?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
