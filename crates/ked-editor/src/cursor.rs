//! Cursor: a position in raw document coordinates.
//!
//! The cursor is a plain `(col, row)` pair. It does not own or reference the
//! document; movement methods take it as a parameter and keep the cursor in
//! bounds:
//!
//! - `row` ranges over `0..=num_rows`. `num_rows` itself is the append
//!   point below the last line, where typing creates a new row.
//! - `col` ranges over `0..=row_len` of the landing row (0 on the append
//!   point).
//!
//! Horizontal movement wraps across row boundaries; vertical movement keeps
//! the column and clamps it to the landing row. There is no sticky column.

use crate::document::Document;

/// A cursor in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Byte column in the row's raw bytes.
    pub col: usize,
    /// Row index (may equal `num_rows`).
    pub row: usize,
}

impl Cursor {
    /// Create a cursor at a specific position.
    #[must_use]
    pub const fn at(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Left one byte; at column 0, to the end of the previous row.
    pub fn move_left(&mut self, doc: &Document) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = doc.row_len(self.row);
        }
    }

    /// Right one byte; at the end of a row, to the start of the next.
    /// Does nothing on the append point.
    pub fn move_right(&mut self, doc: &Document) {
        let Some(row) = doc.row(self.row) else {
            return;
        };
        if self.col < row.len() {
            self.col += 1;
        } else {
            self.row += 1;
            self.col = 0;
        }
        self.clamp(doc);
    }

    /// Up one row.
    pub fn move_up(&mut self, doc: &Document) {
        self.row = self.row.saturating_sub(1);
        self.clamp(doc);
    }

    /// Down one row, stopping at the append point.
    pub fn move_down(&mut self, doc: &Document) {
        if self.row < doc.num_rows() {
            self.row += 1;
        }
        self.clamp(doc);
    }

    /// Column 0.
    pub const fn move_to_line_start(&mut self) {
        self.col = 0;
    }

    /// End of the current row (0 on the append point).
    pub fn move_to_line_end(&mut self, doc: &Document) {
        self.col = doc.row_len(self.row);
    }

    /// Pull the cursor back inside the document.
    pub fn clamp(&mut self, doc: &Document) {
        self.row = self.row.min(doc.num_rows());
        self.col = self.col.min(doc.row_len(self.row));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn doc(lines: &[&str]) -> Document {
        Document::from_lines(&Options::default(), lines.iter().copied())
    }

    #[test]
    fn left_wraps_to_previous_row_end() {
        let d = doc(&["abc", "de"]);
        let mut c = Cursor::at(0, 1);
        c.move_left(&d);
        assert_eq!(c, Cursor::at(3, 0));
    }

    #[test]
    fn left_at_document_start_stays() {
        let d = doc(&["abc"]);
        let mut c = Cursor::default();
        c.move_left(&d);
        assert_eq!(c, Cursor::default());
    }

    #[test]
    fn right_wraps_to_next_row_start() {
        let d = doc(&["ab", "cd"]);
        let mut c = Cursor::at(2, 0);
        c.move_right(&d);
        assert_eq!(c, Cursor::at(0, 1));
    }

    #[test]
    fn right_from_last_row_end_reaches_append_point() {
        let d = doc(&["ab"]);
        let mut c = Cursor::at(2, 0);
        c.move_right(&d);
        assert_eq!(c, Cursor::at(0, 1));
        c.move_right(&d);
        assert_eq!(c, Cursor::at(0, 1));
    }

    #[test]
    fn vertical_moves_clamp_column() {
        let d = doc(&["long line", "ab", "longer line"]);
        let mut c = Cursor::at(8, 0);
        c.move_down(&d);
        assert_eq!(c, Cursor::at(2, 1));
        c.move_down(&d);
        // No sticky column: the clamped column carries on.
        assert_eq!(c, Cursor::at(2, 2));
    }

    #[test]
    fn up_at_top_and_down_at_append_point_stay() {
        let d = doc(&["a"]);
        let mut c = Cursor::at(1, 0);
        c.move_up(&d);
        assert_eq!(c, Cursor::at(1, 0));
        c.move_down(&d);
        assert_eq!(c, Cursor::at(0, 1));
        c.move_down(&d);
        assert_eq!(c, Cursor::at(0, 1));
    }

    #[test]
    fn home_and_end() {
        let d = doc(&["hello"]);
        let mut c = Cursor::at(2, 0);
        c.move_to_line_end(&d);
        assert_eq!(c.col, 5);
        c.move_to_line_start();
        assert_eq!(c.col, 0);
        c.row = 1;
        c.move_to_line_end(&d);
        assert_eq!(c.col, 0);
    }

    #[test]
    fn clamp_after_document_shrinks() {
        let d = doc(&["ab"]);
        let mut c = Cursor::at(7, 9);
        c.clamp(&d);
        assert_eq!(c, Cursor::at(0, 1));
    }

    #[test]
    fn empty_document_cursor_stays_at_origin() {
        let d = doc(&[]);
        let mut c = Cursor::default();
        c.move_right(&d);
        c.move_down(&d);
        c.move_left(&d);
        assert_eq!(c, Cursor::default());
    }
}
