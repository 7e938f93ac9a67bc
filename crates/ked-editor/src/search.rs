//! Incremental search: scanning rows and tracking the current hit.
//!
//! Search is driven one keystroke at a time by the find prompt. Each step:
//!
//! 1. puts back the highlight that the previous hit overwrote;
//! 2. decides the direction from the key (arrows step, anything else
//!    restarts from the top in the forward direction);
//! 3. scans at most `num_rows` rows circularly, starting after the last
//!    hit, and stops at the first row whose render bytes contain the query;
//! 4. remembers the hit's row and paints the matched bytes with
//!    [`Highlight::SearchMatch`], saving what was there first.
//!
//! Matching is a plain byte substring search over the render form, so a
//! query can match spaces produced by tab expansion.

use crate::document::Document;
use crate::highlight::Highlight;

/// Scan direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// What the latest keystroke means for the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindStep {
    /// Search ended (accepted or cancelled).
    Finish,
    /// Next hit after the current one.
    Next,
    /// Previous hit before the current one.
    Previous,
    /// The query changed; search again from the top.
    Edited,
}

/// A search hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub row: usize,
    /// Raw column of the first matched byte.
    pub col: usize,
    /// Render column of the first matched byte.
    pub render_col: usize,
}

/// Position of the first occurrence of `needle` in `haystack`.
///
/// An empty needle never matches.
#[must_use]
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Scan up to `num_rows` rows circularly, starting with the row after
/// `from` in `direction` (row 0 when `from` is `None` going forward).
#[must_use]
pub fn scan(
    doc: &Document,
    query: &[u8],
    from: Option<usize>,
    direction: Direction,
) -> Option<Match> {
    let n = doc.num_rows();
    if n == 0 || query.is_empty() {
        return None;
    }
    let mut current = from.map_or_else(
        || match direction {
            Direction::Forward => n - 1,
            Direction::Backward => 0,
        },
        |row| row.min(n - 1),
    );
    for _ in 0..n {
        current = match direction {
            Direction::Forward => (current + 1) % n,
            Direction::Backward => current.checked_sub(1).unwrap_or(n - 1),
        };
        let row = &doc.rows()[current];
        if let Some(render_col) = find_bytes(row.render(), query) {
            return Some(Match {
                row: current,
                col: row.render_col_to_col(render_col, doc.tab_stop()),
                render_col,
            });
        }
    }
    None
}

/// State carried between find-prompt keystrokes.
#[derive(Debug, Clone, Default)]
pub struct FindState {
    last_match: Option<usize>,
    direction: Direction,
    saved: Option<(usize, Vec<Highlight>)>,
}

impl FindState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put back the highlight under the current hit, if any.
    pub fn restore(&mut self, doc: &mut Document) {
        if let Some((row, classes)) = self.saved.take() {
            doc.restore_highlight(row, classes);
        }
    }

    /// Process one keystroke. Returns the new hit, if any.
    pub fn step(&mut self, doc: &mut Document, query: &[u8], step: FindStep) -> Option<Match> {
        self.restore(doc);

        match step {
            FindStep::Finish => {
                self.last_match = None;
                self.direction = Direction::Forward;
                return None;
            }
            FindStep::Next => self.direction = Direction::Forward,
            FindStep::Previous => self.direction = Direction::Backward,
            FindStep::Edited => {
                self.last_match = None;
                self.direction = Direction::Forward;
            }
        }
        if self.last_match.is_none() {
            self.direction = Direction::Forward;
        }

        let hit = scan(doc, query, self.last_match, self.direction)?;
        self.last_match = Some(hit.row);
        if let Some(classes) = doc.highlight_snapshot(hit.row) {
            self.saved = Some((hit.row, classes));
        }
        doc.overlay_highlight(hit.row, hit.render_col, query.len(), Highlight::SearchMatch);
        Some(hit)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
