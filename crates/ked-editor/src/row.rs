//! Row: one line of the document plus its derived caches.
//!
//! A row stores the bytes exactly as typed or loaded (`raw`) and two caches
//! derived from them:
//!
//! - `render`: the display form, with every tab expanded to spaces up to the
//!   next multiple of the tab stop
//! - `highlight`: one [`Highlight`] class per render byte
//!
//! plus the block-comment continuation flag the next row's highlight depends
//! on. The caches are rebuilt by [`Row::update`] whenever `raw` changes; the
//! [`Document`](crate::document::Document) is responsible for calling it and
//! for cascading to the rows below.
//!
//! # Coordinates
//!
//! The cursor lives in raw columns; the screen lives in render columns.
//! [`Row::col_to_render_col`] and [`Row::render_col_to_col`] convert between
//! them. Both are pure functions of `raw` and the tab stop.

use crate::highlight::{self, Highlight};
use crate::syntax::Syntax;

/// Default tab stop.
pub const TAB_STOP: usize = 8;

/// A line of text with its render and highlight caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    index: usize,
    raw: Vec<u8>,
    render: Vec<u8>,
    highlight: Vec<Highlight>,
    open_comment: bool,
}

impl Row {
    /// Create a row at `index`. Caches are empty until [`update`](Self::update).
    #[must_use]
    pub(crate) const fn new(index: usize, raw: Vec<u8>) -> Self {
        Self {
            index,
            raw,
            render: Vec::new(),
            highlight: Vec::new(),
            open_comment: false,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Position of this row in the document.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The stored bytes.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Length of the stored bytes (the cursor's maximum column).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the row has no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The display form with tabs expanded.
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// One highlight class per render byte.
    #[inline]
    #[must_use]
    pub fn highlight(&self) -> &[Highlight] {
        &self.highlight
    }

    /// Whether a block comment is still open at the end of this row.
    #[inline]
    #[must_use]
    pub const fn open_comment(&self) -> bool {
        self.open_comment
    }

    // -- Coordinate mapping -------------------------------------------------

    /// Render column of raw column `col`.
    ///
    /// Columns past the end are treated as the end of the row.
    #[must_use]
    pub fn col_to_render_col(&self, col: usize, tab_stop: usize) -> usize {
        self.raw
            .iter()
            .take(col)
            .fold(0, |rx, &b| advance(rx, b, tab_stop))
    }

    /// Raw column that covers render column `rx`.
    ///
    /// Returns the first raw column whose end (forward mapping plus its own
    /// width) passes `rx`. A render column inside a tab's expansion resolves
    /// to the tab. Past the end, returns the row length.
    #[must_use]
    pub fn render_col_to_col(&self, rx: usize, tab_stop: usize) -> usize {
        let mut cur = 0;
        for (col, &b) in self.raw.iter().enumerate() {
            cur = advance(cur, b, tab_stop);
            if cur > rx {
                return col;
            }
        }
        self.raw.len()
    }

    // -- Mutation (document-internal) ---------------------------------------

    pub(crate) const fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Insert `byte` at `col`, clamped to the row length.
    pub(crate) fn insert(&mut self, col: usize, byte: u8) {
        let col = col.min(self.raw.len());
        self.raw.insert(col, byte);
    }

    /// Remove the byte at `col`. Returns `false` if `col` is past the end.
    pub(crate) fn remove(&mut self, col: usize) -> bool {
        if col < self.raw.len() {
            self.raw.remove(col);
            true
        } else {
            false
        }
    }

    /// Append bytes to the end of the row.
    pub(crate) fn append(&mut self, bytes: &[u8]) {
        self.raw.extend_from_slice(bytes);
    }

    /// Cut the row at `col`, returning the suffix.
    pub(crate) fn split_off(&mut self, col: usize) -> Vec<u8> {
        let col = col.min(self.raw.len());
        self.raw.split_off(col)
    }

    /// Mutable highlight classes, for temporary overlays such as search hits.
    pub(crate) fn highlight_mut(&mut self) -> &mut [Highlight] {
        &mut self.highlight
    }

    /// Replace the highlight classes wholesale (restoring a saved overlay).
    /// Ignored if the length no longer matches the render bytes.
    pub(crate) fn restore_highlight(&mut self, saved: Vec<Highlight>) {
        if saved.len() == self.render.len() {
            self.highlight = saved;
        }
    }

    // -- Cache rebuild ------------------------------------------------------

    /// Rebuild `render` and `highlight` from `raw`.
    ///
    /// Returns `true` when the continuation flag changed, meaning the next
    /// row's highlight is now stale.
    pub(crate) fn update(
        &mut self,
        tab_stop: usize,
        syntax: Option<&Syntax>,
        prev_open_comment: bool,
    ) -> bool {
        self.render = expand_tabs(&self.raw, tab_stop);
        self.rehighlight(syntax, prev_open_comment)
    }

    /// Rebuild only `highlight`; `render` must already be current.
    pub(crate) fn rehighlight(&mut self, syntax: Option<&Syntax>, prev_open_comment: bool) -> bool {
        let result = highlight::highlight_row(&self.render, syntax, prev_open_comment);
        self.highlight = result.classes;
        let changed = self.open_comment != result.open_comment;
        self.open_comment = result.open_comment;
        changed
    }
}

/// Render column after drawing `byte` at render column `rx`.
const fn advance(rx: usize, byte: u8, tab_stop: usize) -> usize {
    if byte == b'\t' {
        rx + tab_stop - rx % tab_stop
    } else {
        rx + 1
    }
}

/// Expand tabs to spaces up to the next multiple of `tab_stop`.
#[must_use]
pub fn expand_tabs(raw: &[u8], tab_stop: usize) -> Vec<u8> {
    let tabs = raw.iter().filter(|&&b| b == b'\t').count();
    let mut render = Vec::with_capacity(raw.len() + tabs * (tab_stop - 1));
    for &b in raw {
        if b == b'\t' {
            render.push(b' ');
            while render.len() % tab_stop != 0 {
                render.push(b' ');
            }
        } else {
            render.push(b);
        }
    }
    render
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(text: &str) -> Row {
        let mut r = Row::new(0, text.as_bytes().to_vec());
        r.update(TAB_STOP, None, false);
        r
    }

    // -- Tab expansion ------------------------------------------------------

    #[test]
    fn plain_text_renders_unchanged() {
        assert_eq!(row("abc").render(), b"abc");
    }

    #[test]
    fn leading_tab_expands_to_full_stop() {
        assert_eq!(row("\tdef").render(), b"        def");
    }

    #[test]
    fn tab_expands_to_next_stop() {
        assert_eq!(row("abc\td").render(), b"abc     d");
        assert_eq!(row("abcdefg\tx").render(), b"abcdefg x");
        assert_eq!(row("abcdefgh\tx").render(), b"abcdefgh        x");
    }

    #[test]
    fn render_length_for_tabs_on_stops() {
        // Each tab at a stop boundary adds exactly tab_stop - 1 columns.
        for text in ["\t", "\t\t", "\tx", "12345678\t", "\t\t\tabc"] {
            let r = row(text);
            let tabs = text.bytes().filter(|&b| b == b'\t').count();
            assert_eq!(r.render().len(), text.len() + (TAB_STOP - 1) * tabs, "{text:?}");
        }
    }

    #[test]
    fn highlight_matches_render_length() {
        let r = row("a\tb\tc");
        assert_eq!(r.highlight().len(), r.render().len());
    }

    #[test]
    fn custom_tab_stop() {
        let mut r = Row::new(0, b"a\tb".to_vec());
        r.update(4, None, false);
        assert_eq!(r.render(), b"a   b");
    }

    // -- Coordinate mapping -------------------------------------------------

    #[test]
    fn col_after_tab_maps_to_stop() {
        let r = row("\tdef");
        assert_eq!(r.col_to_render_col(0, TAB_STOP), 0);
        assert_eq!(r.col_to_render_col(1, TAB_STOP), 8);
        assert_eq!(r.col_to_render_col(4, TAB_STOP), 11);
    }

    #[test]
    fn col_past_end_maps_to_end() {
        let r = row("ab");
        assert_eq!(r.col_to_render_col(10, TAB_STOP), 2);
    }

    #[test]
    fn round_trip_for_non_tab_columns() {
        let r = row("a\tbc\td");
        for col in 0..=r.len() {
            let rx = r.col_to_render_col(col, TAB_STOP);
            assert_eq!(r.render_col_to_col(rx, TAB_STOP), col, "col {col}");
        }
    }

    #[test]
    fn render_cols_inside_tab_resolve_to_tab() {
        let r = row("a\tb");
        // The tab occupies render columns 1..8.
        for rx in 1..8 {
            assert_eq!(r.render_col_to_col(rx, TAB_STOP), 1, "rx {rx}");
        }
        assert_eq!(r.render_col_to_col(8, TAB_STOP), 2);
    }

    #[test]
    fn render_col_past_end_is_row_length() {
        let r = row("abc");
        assert_eq!(r.render_col_to_col(99, TAB_STOP), 3);
    }

    // -- Mutation -----------------------------------------------------------

    #[test]
    fn insert_clamps_column() {
        let mut r = row("ab");
        r.insert(99, b'c');
        assert_eq!(r.raw(), b"abc");
        r.insert(0, b'_');
        assert_eq!(r.raw(), b"_abc");
    }

    #[test]
    fn remove_past_end_is_noop() {
        let mut r = row("ab");
        assert!(!r.remove(2));
        assert!(r.remove(0));
        assert_eq!(r.raw(), b"b");
    }

    #[test]
    fn split_off_returns_suffix() {
        let mut r = row("hello");
        assert_eq!(r.split_off(2), b"llo");
        assert_eq!(r.raw(), b"he");
    }

    #[test]
    fn update_reports_continuation_change() {
        let c = crate::syntax::select(std::path::Path::new("x.c"));
        let mut r = Row::new(0, b"/* open".to_vec());
        assert!(r.update(TAB_STOP, c, false));
        assert!(r.open_comment());
        // Same input again: flag unchanged.
        assert!(!r.update(TAB_STOP, c, false));
    }

    #[test]
    fn restore_highlight_ignores_stale_length() {
        let mut r = row("abc");
        r.restore_highlight(vec![Highlight::Number; 2]);
        assert_eq!(r.highlight(), &[Highlight::Normal; 3]);
        r.restore_highlight(vec![Highlight::Number; 3]);
        assert_eq!(r.highlight(), &[Highlight::Number; 3]);
    }
}
