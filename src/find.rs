// SPDX-License-Identifier: MIT
//
// Incremental search.
//
// Ctrl-F opens a prompt whose handler re-runs the search after every key.
// Arrows step between hits, any other key searches again from the top, and
// Enter keeps the cursor on the current hit. Escape puts the cursor and the
// viewport back where they were before the search started.

use ked_editor::cursor::Cursor;
use ked_editor::search::{FindState, FindStep};
use ked_editor::storage::FileStore;
use ked_term::error::Result;
use ked_term::input::{ENTER, ESC, Key};

use crate::editor::{EditState, Editor};
use crate::prompt::PromptHandler;
use crate::tty::Tty;

const PROMPT: &str = "Search: {} (Use ESC/Arrows/Enter)";

/// Prompt handler that moves the cursor to each hit.
#[derive(Debug, Default)]
struct FindHandler {
    find: FindState,
}

const fn step_for(key: Key) -> FindStep {
    match key {
        Key::Byte(ENTER | ESC) => FindStep::Finish,
        Key::ArrowRight | Key::ArrowDown => FindStep::Next,
        Key::ArrowLeft | Key::ArrowUp => FindStep::Previous,
        _ => FindStep::Edited,
    }
}

impl PromptHandler for FindHandler {
    fn on_key(&mut self, state: &mut EditState, input: &str, key: Key) {
        let Some(hit) = self.find.step(&mut state.doc, input.as_bytes(), step_for(key)) else {
            return;
        };
        state.cursor = Cursor::at(hit.col, hit.row);
        // Past the last row, so the next scroll puts the hit at the top.
        state.view.row_offset = state.doc.num_rows();
    }
}

impl<T: Tty, S: FileStore> Editor<T, S> {
    /// Run an incremental search. Escape restores the cursor and viewport.
    ///
    /// # Errors
    ///
    /// Terminal read or write failure.
    pub fn find(&mut self) -> Result<()> {
        let saved_cursor = self.state.cursor;
        let saved_view = self.state.view;

        let query = self.prompt(PROMPT, &mut FindHandler::default())?;
        if query.is_none() {
            self.state.cursor = saved_cursor;
            self.state.view = saved_view;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use ked_editor::highlight::Highlight;
    use ked_editor::storage::MemoryStore;

    use super::*;
    use crate::editor::tests::editor_with;

    fn search_matches(e: &Editor<crate::tty::testing::ScriptedTty, MemoryStore>) -> usize {
        e.state
            .doc
            .rows()
            .iter()
            .map(|r| {
                r.highlight()
                    .iter()
                    .filter(|&&h| h == Highlight::SearchMatch)
                    .count()
            })
            .sum()
    }

    #[test]
    fn step_mapping() {
        assert_eq!(step_for(Key::Byte(ENTER)), FindStep::Finish);
        assert_eq!(step_for(Key::Byte(ESC)), FindStep::Finish);
        assert_eq!(step_for(Key::ArrowDown), FindStep::Next);
        assert_eq!(step_for(Key::ArrowRight), FindStep::Next);
        assert_eq!(step_for(Key::ArrowUp), FindStep::Previous);
        assert_eq!(step_for(Key::ArrowLeft), FindStep::Previous);
        assert_eq!(step_for(Key::Byte(b'x')), FindStep::Edited);
        assert_eq!(step_for(Key::Byte(0x7f)), FindStep::Edited);
    }

    #[test]
    fn enter_keeps_cursor_on_hit() {
        let mut e = editor_with(b"wor\r", MemoryStore::new(), &["hello", "world"]);
        e.find().unwrap();
        assert_eq!((e.state.cursor.col, e.state.cursor.row), (0, 1));
        assert_eq!(search_matches(&e), 0);
    }

    #[test]
    fn escape_restores_cursor_and_view() {
        let lines: Vec<String> = (0..60).map(|i| format!("line {i}")).collect();
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut e = editor_with(b"line 50\x1b", MemoryStore::new(), &lines);
        e.state.cursor = Cursor::at(2, 3);
        e.find().unwrap();
        assert_eq!(e.state.cursor, Cursor::at(2, 3));
        assert_eq!(e.state.view.row_offset, 0);
        assert_eq!(search_matches(&e), 0);
    }

    #[test]
    fn hit_is_scrolled_to_top() {
        let lines: Vec<String> = (0..60).map(|i| format!("line {i}")).collect();
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut e = editor_with(b"line 50\r", MemoryStore::new(), &lines);
        e.find().unwrap();
        e.refresh_screen().unwrap();
        assert_eq!(e.state.cursor.row, 50);
        assert_eq!(e.state.view.row_offset, 50);
    }

    #[test]
    fn forward_search_wraps_from_last_row() {
        let mut e = editor_with(
            b"needle\r",
            MemoryStore::new(),
            &["needle", "a", "b", "c"],
        );
        e.state.cursor = Cursor::at(0, 3);
        e.find().unwrap();
        assert_eq!(e.state.cursor.row, 0);
    }

    #[test]
    fn arrows_step_between_hits() {
        // Type "ab", then Down, Down, Up.
        let mut e = editor_with(
            b"ab\x1b[B\x1b[B\x1b[A\r",
            MemoryStore::new(),
            &["ab1", "x", "ab2", "ab3"],
        );
        e.find().unwrap();
        // Hits: row 0 on typing, then 2, 3, back to 2.
        assert_eq!(e.state.cursor.row, 2);
    }

    #[test]
    fn hit_inside_tabbed_row_maps_to_raw_column() {
        let mut e = editor_with(b"foo\r", MemoryStore::new(), &["\t\tfoo"]);
        e.find().unwrap();
        assert_eq!(e.state.cursor.col, 2);
    }

    #[test]
    fn overlay_is_visible_while_searching() {
        let mut e = editor_with(b"ell\r", MemoryStore::new(), &["hello"]);
        e.find().unwrap();
        // The frame drawn after typing "ell" shows the match color.
        assert!(e.tty.output_str().contains("h\x1b[34mell\x1b[39mo"));
    }

    #[test]
    fn no_match_leaves_cursor() {
        let mut e = editor_with(b"zzz\r", MemoryStore::new(), &["abc"]);
        e.state.cursor = Cursor::at(1, 0);
        e.find().unwrap();
        assert_eq!(e.state.cursor, Cursor::at(1, 0));
    }
}
