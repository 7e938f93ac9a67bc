// SPDX-License-Identifier: MIT
//
// Line input in the message bar.
//
// `Editor::prompt` reads a line of text while the editor keeps redrawing,
// echoing the input into a template's `{}` slot. A `PromptHandler` sees
// every key after the prompt has applied it, which is how incremental
// search follows the query as it is typed.

use ked_editor::storage::FileStore;
use ked_term::error::Result;
use ked_term::input::{ENTER, ESC, Key, read_key};

use crate::editor::{EditState, Editor};
use crate::tty::Tty;

/// Called after every key the prompt reads, including the final Enter or
/// Escape.
pub trait PromptHandler {
    fn on_key(&mut self, state: &mut EditState, input: &str, key: Key);
}

/// A prompt with no per-key behavior.
pub struct NoHandler;

impl PromptHandler for NoHandler {
    fn on_key(&mut self, _state: &mut EditState, _input: &str, _key: Key) {}
}

impl<T: Tty, S: FileStore> Editor<T, S> {
    /// Read a line of input.
    ///
    /// Returns `None` when Escape is pressed, or the text when Enter is
    /// pressed with non-empty input. Erase keys drop the last byte; other
    /// printable ASCII is appended. The message bar is cleared on both
    /// exits.
    ///
    /// # Errors
    ///
    /// Terminal read or write failure.
    pub fn prompt(
        &mut self,
        template: &str,
        handler: &mut impl PromptHandler,
    ) -> Result<Option<String>> {
        let mut input = String::new();

        loop {
            self.check_resize()?;
            self.state.status.set(template.replace("{}", &input));
            self.refresh_screen()?;

            let key = read_key(&mut self.tty)?;
            match key {
                _ if key.is_erase() => {
                    input.pop();
                }
                Key::Byte(ESC) => {
                    self.state.status.clear();
                    handler.on_key(&mut self.state, &input, key);
                    return Ok(None);
                }
                Key::Byte(ENTER) if !input.is_empty() => {
                    self.state.status.clear();
                    handler.on_key(&mut self.state, &input, key);
                    return Ok(Some(input));
                }
                Key::Byte(b) if key.is_printable() => input.push(char::from(b)),
                _ => {}
            }
            handler.on_key(&mut self.state, &input, key);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use ked_editor::view::Screen;
    use ked_term::terminal::Size;

    use super::*;
    use crate::editor::tests::{editor, message};

    /// Records what the handler saw.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(String, Key)>,
    }

    impl PromptHandler for Recorder {
        fn on_key(&mut self, _state: &mut EditState, input: &str, key: Key) {
            self.seen.push((input.to_string(), key));
        }
    }

    #[test]
    fn enter_returns_input() {
        let mut e = editor(b"abc\r");
        let got = e.prompt("Name: {}", &mut NoHandler).unwrap();
        assert_eq!(got.as_deref(), Some("abc"));
        assert_eq!(message(&e), "");
    }

    #[test]
    fn escape_returns_none() {
        let mut e = editor(b"ab\x1b");
        assert_eq!(e.prompt("Name: {}", &mut NoHandler).unwrap(), None);
        assert_eq!(message(&e), "");
    }

    #[test]
    fn enter_on_empty_input_keeps_prompting() {
        let mut e = editor(b"\rx\r");
        assert_eq!(
            e.prompt("{}", &mut NoHandler).unwrap().as_deref(),
            Some("x")
        );
    }

    #[test]
    fn erase_keys_drop_last_byte() {
        // Backspace, Ctrl-H, and Delete (ESC [ 3 ~) each erase one byte.
        let mut e = editor(b"abcd\x7f\x08\x1b[3~x\r");
        assert_eq!(
            e.prompt("{}", &mut NoHandler).unwrap().as_deref(),
            Some("ax")
        );
    }

    #[test]
    fn erase_on_empty_input_is_harmless() {
        let mut e = editor(b"\x7fq\r");
        assert_eq!(
            e.prompt("{}", &mut NoHandler).unwrap().as_deref(),
            Some("q")
        );
    }

    #[test]
    fn non_printable_keys_are_not_appended() {
        let mut e = editor(b"a\x01\t\x1b[Ab\r");
        assert_eq!(
            e.prompt("{}", &mut NoHandler).unwrap().as_deref(),
            Some("ab")
        );
    }

    #[test]
    fn input_is_echoed_into_template() {
        let mut e = editor(b"hi\r");
        e.prompt("Save as: {} (ESC to cancel)", &mut NoHandler)
            .unwrap();
        let out = e.tty.output_str();
        assert!(out.contains("Save as:  (ESC to cancel)"));
        assert!(out.contains("Save as: h (ESC to cancel)"));
        assert!(out.contains("Save as: hi (ESC to cancel)"));
    }

    #[test]
    fn handler_sees_every_key() {
        let mut e = editor(b"a\x7f\x1b[Cb\r");
        let mut rec = Recorder::default();
        e.prompt("{}", &mut rec).unwrap();
        assert_eq!(
            rec.seen,
            vec![
                ("a".to_string(), Key::Byte(b'a')),
                (String::new(), Key::Byte(0x7f)),
                (String::new(), Key::ArrowRight),
                ("b".to_string(), Key::Byte(b'b')),
                ("b".to_string(), Key::Byte(b'\r')),
            ]
        );
    }

    #[test]
    fn window_change_applies_while_prompting() {
        let mut e = editor(b"ab\r");
        e.tty.size = Size { cols: 20, rows: 5 };
        e.tty.resized = true;
        e.prompt("{}", &mut NoHandler).unwrap();
        assert_eq!(e.state.screen, Screen { rows: 3, cols: 20 });
    }

    #[test]
    fn handler_sees_escape() {
        let mut e = editor(b"z\x1b");
        let mut rec = Recorder::default();
        e.prompt("{}", &mut rec).unwrap();
        assert_eq!(rec.seen.last(), Some(&("z".to_string(), Key::Byte(ESC))));
    }
}
