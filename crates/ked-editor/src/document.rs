//! Document: the ordered rows of the file being edited.
//!
//! The document is the only owner of row data. Every mutation goes through
//! it so the derived caches on each [`Row`] stay current:
//!
//! 1. the touched row's `render` and `highlight` are rebuilt immediately;
//! 2. if its block-comment continuation flag changed, the next row is
//!    re-highlighted, and so on until a row's flag comes out unchanged.
//!
//! Step 2 is an explicit loop over row indices, so it touches at most
//! `num_rows` rows no matter how long the comment run is.
//!
//! Inserting or deleting a row changes which row precedes the one after it,
//! so that row is always re-evaluated once even if the new row's own flag did
//! not change.
//!
//! The dirty counter counts mutations since the last successful load or save.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::highlight::Highlight;
use crate::options::Options;
use crate::row::Row;
use crate::storage::{FileStore, StoreError};
use crate::syntax::{self, Syntax};

/// The rows of one file plus its metadata.
#[derive(Debug, Clone)]
pub struct Document {
    rows: Vec<Row>,
    dirty: usize,
    filename: Option<PathBuf>,
    syntax: Option<&'static Syntax>,
    tab_stop: usize,
    syntax_enabled: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(&Options::default())
    }
}

impl Document {
    /// An empty, unnamed document.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            filename: None,
            syntax: None,
            tab_stop: options.tab_stop.max(1),
            syntax_enabled: options.syntax,
        }
    }

    /// Build a document from lines of text (no filename, not dirty).
    #[must_use]
    pub fn from_lines<'a>(options: &Options, lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut doc = Self::new(options);
        for line in lines {
            doc.insert_row(doc.num_rows(), line.as_bytes());
        }
        doc.dirty = 0;
        doc
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// Length of row `at`, or 0 past the end.
    #[inline]
    #[must_use]
    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// The profile used for highlighting, if any and if highlighting is on.
    #[must_use]
    pub fn syntax(&self) -> Option<&'static Syntax> {
        self.syntax.filter(|_| self.syntax_enabled)
    }

    // -- Row operations -----------------------------------------------------

    /// Insert a new row at `at`. No-op if `at > num_rows`.
    pub fn insert_row(&mut self, at: usize, bytes: impl Into<Vec<u8>>) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(at, bytes.into()));
        self.renumber_from(at + 1);
        self.refresh(at, true);
        self.dirty += 1;
    }

    /// Remove row `at`. No-op if out of bounds.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.renumber_from(at);
        if at < self.rows.len() {
            self.rehighlight_cascade(at, true);
        }
        self.dirty += 1;
    }

    /// Insert `byte` into row `row` at `col` (clamped to the row length).
    /// No-op if `row` does not exist.
    pub fn insert_char(&mut self, row: usize, col: usize, byte: u8) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        r.insert(col, byte);
        self.refresh(row, false);
        self.dirty += 1;
    }

    /// Delete the byte at `col` in row `row`. No-op if either is out of
    /// bounds.
    pub fn delete_char(&mut self, row: usize, col: usize) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        if r.remove(col) {
            self.refresh(row, false);
            self.dirty += 1;
        }
    }

    /// Split row `row` at `col`: the row keeps the prefix and a new row
    /// below it receives the suffix. At column 0 an empty row is inserted
    /// above instead, which also works at `row == num_rows`.
    pub fn split_row(&mut self, row: usize, col: usize) {
        if col == 0 {
            self.insert_row(row, Vec::new());
            return;
        }
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        let suffix = r.split_off(col);
        self.refresh(row, false);
        self.insert_row(row + 1, suffix);
    }

    /// Append row `row` to the previous row and delete it.
    ///
    /// Returns the column in the previous row where the join happened, or
    /// `None` (and does nothing) at row 0 or past the end.
    pub fn join_with_previous(&mut self, row: usize) -> Option<usize> {
        if row == 0 || row >= self.rows.len() {
            return None;
        }
        let tail = self.rows[row].raw().to_vec();
        let prev = &mut self.rows[row - 1];
        let col = prev.len();
        prev.append(&tail);
        self.refresh(row - 1, false);
        self.dirty += 1;
        self.delete_row(row);
        Some(col)
    }

    /// Every row's bytes followed by `\n`.
    #[must_use]
    pub fn rows_to_text(&self) -> Vec<u8> {
        let len = self.rows.iter().map(|r| r.len() + 1).sum();
        let mut text = Vec::with_capacity(len);
        for row in &self.rows {
            text.extend_from_slice(row.raw());
            text.push(b'\n');
        }
        text
    }

    // -- Files --------------------------------------------------------------

    /// Bind the document to `path` and re-select the language profile.
    /// Every row is re-highlighted with the new profile.
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.syntax = syntax::select(&path);
        debug!(path = %path.display(), syntax = ?self.syntax.map(|s| s.name), "filename set");
        self.filename = Some(path);
        self.rehighlight_all();
    }

    /// Replace the contents with the file at `path`.
    ///
    /// Lines are split on `\n`; trailing `\r` bytes are stripped from each
    /// line. The filename is bound and the dirty counter reset.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the document is left unchanged.
    pub fn load(&mut self, store: &impl FileStore, path: &Path) -> io::Result<()> {
        let bytes = store.load(path)?;

        self.rows.clear();
        self.filename = Some(path.to_path_buf());
        self.syntax = syntax::select(path);

        let mut lines: Vec<&[u8]> = bytes.split(|&b| b == b'\n').collect();
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        for line in lines {
            let mut end = line.len();
            while end > 0 && matches!(line[end - 1], b'\r' | b'\n') {
                end -= 1;
            }
            self.insert_row(self.rows.len(), &line[..end]);
        }
        self.dirty = 0;

        info!(path = %path.display(), rows = self.rows.len(), "loaded");
        Ok(())
    }

    /// Write the document to its filename.
    ///
    /// The dirty counter is reset only when the store accepted every byte.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoFilename`] when unnamed, [`StoreError::Io`] when the
    /// store fails, [`StoreError::ShortWrite`] when it stops early.
    pub fn save(&mut self, store: &impl FileStore) -> Result<usize, StoreError> {
        let path = self.filename.as_deref().ok_or(StoreError::NoFilename)?;
        let written = self.write_to(store, path)?;
        self.dirty = 0;
        Ok(written)
    }

    /// Write the document to `path`, binding it as the filename only once
    /// every byte is written.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] or [`StoreError::ShortWrite`]; the document keeps
    /// its previous name and dirty state.
    pub fn save_as(
        &mut self,
        store: &impl FileStore,
        path: impl Into<PathBuf>,
    ) -> Result<usize, StoreError> {
        let path = path.into();
        let written = self.write_to(store, &path)?;
        self.set_filename(path);
        self.dirty = 0;
        Ok(written)
    }

    fn write_to(&self, store: &impl FileStore, path: &Path) -> Result<usize, StoreError> {
        let text = self.rows_to_text();
        let written = store.store(path, &text)?;
        if written != text.len() {
            return Err(StoreError::ShortWrite {
                written,
                expected: text.len(),
            });
        }
        info!(path = %path.display(), bytes = written, "saved");
        Ok(written)
    }

    // -- Highlight overlays -------------------------------------------------

    /// A copy of row `at`'s highlight classes.
    #[must_use]
    pub fn highlight_snapshot(&self, at: usize) -> Option<Vec<Highlight>> {
        self.rows.get(at).map(|r| r.highlight().to_vec())
    }

    /// Paint render columns `[start, start + len)` of row `at` with `class`.
    /// The range is clamped to the row.
    pub fn overlay_highlight(&mut self, at: usize, start: usize, len: usize, class: Highlight) {
        if let Some(row) = self.rows.get_mut(at) {
            let hl = row.highlight_mut();
            let end = start.saturating_add(len).min(hl.len());
            if start < end {
                hl[start..end].fill(class);
            }
        }
    }

    /// Put back classes taken with [`highlight_snapshot`](Self::highlight_snapshot).
    pub fn restore_highlight(&mut self, at: usize, saved: Vec<Highlight>) {
        if let Some(row) = self.rows.get_mut(at) {
            row.restore_highlight(saved);
        }
    }

    // -- Cache maintenance --------------------------------------------------

    fn renumber_from(&mut self, start: usize) {
        for (i, row) in self.rows.iter_mut().enumerate().skip(start) {
            row.set_index(i);
        }
    }

    fn prev_open_comment(&self, at: usize) -> bool {
        at > 0 && self.rows[at - 1].open_comment()
    }

    /// Rebuild row `at` from its bytes, then cascade. `force_next` re-evaluates
    /// the following row even if this row's flag did not change.
    fn refresh(&mut self, at: usize, force_next: bool) -> usize {
        let prev = self.prev_open_comment(at);
        let syntax = self.syntax();
        let tab_stop = self.tab_stop;
        let changed = self.rows[at].update(tab_stop, syntax, prev);
        1 + self.cascade(at, changed || force_next)
    }

    /// Re-highlight row `at` (render already current), then cascade.
    fn rehighlight_cascade(&mut self, at: usize, force_next: bool) -> usize {
        let prev = self.prev_open_comment(at);
        let syntax = self.syntax();
        let changed = self.rows[at].rehighlight(syntax, prev);
        1 + self.cascade(at, changed || force_next)
    }

    /// Walk forward from row `at` while continuation flags keep changing.
    /// Returns the number of rows re-highlighted.
    fn cascade(&mut self, mut at: usize, mut changed: bool) -> usize {
        let syntax = self.syntax();
        let mut touched = 0;
        while changed && at + 1 < self.rows.len() {
            at += 1;
            let prev = self.rows[at - 1].open_comment();
            changed = self.rows[at].rehighlight(syntax, prev);
            touched += 1;
        }
        touched
    }

    fn rehighlight_all(&mut self) {
        let syntax = self.syntax();
        let mut prev = false;
        for row in &mut self.rows {
            row.rehighlight(syntax, prev);
            prev = row.open_comment();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
