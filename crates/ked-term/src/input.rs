// SPDX-License-Identifier: MIT
//
// Terminal key decoder.
//
// Turns raw stdin bytes into logical keys, one key per call. Plain bytes
// (printable characters, control characters, Enter, Backspace) pass through
// untouched as `Key::Byte`. Escape sequences for the navigation and editing
// keys become named variants:
//
//   ESC [ A..D            arrows (up, down, right, left)
//   ESC [ H   / ESC [ F   Home / End
//   ESC O H   / ESC O F   Home / End (application cursor mode)
//   ESC [ n ~             1,7 Home   3 Delete   4,8 End   5 PgUp   6 PgDn
//
// # Design
//
// The decoder is a tiny state machine driven by blocking reads with a
// timeout. After an ESC it reads up to three more bytes; if any of them
// times out or the pattern is not one we know, the ESC is returned as a
// literal byte. A truncated or unknown sequence is therefore never an
// error, just an Escape keypress.
//
// Reads go through the `ByteSource` trait so the decoder can be driven by
// the real terminal or by a scripted byte queue in tests.

use crate::error::Result;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// The escape byte (0x1B).
pub const ESC: u8 = 0x1b;

/// Carriage return, sent by the Enter key in raw mode.
pub const ENTER: u8 = b'\r';

/// DEL (0x7F), sent by the Backspace key on most terminals.
pub const BACKSPACE: u8 = 0x7f;

/// The byte produced by holding Ctrl with an ASCII letter.
///
/// Ctrl strips bits 5 and 6, so `ctrl(b'q')` is 0x11.
#[inline]
#[must_use]
pub const fn ctrl(byte: u8) -> u8 {
    byte & 0x1f
}

/// A logical key decoded from the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A single raw byte: printable, control, Enter, Backspace, or a
    /// literal ESC when no known sequence followed it.
    Byte(u8),
    // ── Navigation ──────────────────────────────────────────────
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Editing ─────────────────────────────────────────────────
    Delete,
}

impl Key {
    /// Ctrl+`byte`, e.g. `Key::ctrl(b's')`.
    #[inline]
    #[must_use]
    pub const fn ctrl(byte: u8) -> Self {
        Self::Byte(ctrl(byte))
    }

    /// True for printable ASCII. Control bytes and named keys are not.
    #[must_use]
    pub const fn is_printable(self) -> bool {
        matches!(self, Self::Byte(0x20..=0x7e))
    }

    /// True for the keys that erase a character.
    #[must_use]
    pub const fn is_erase(self) -> bool {
        matches!(self, Self::Delete | Self::Byte(BACKSPACE))
            || matches!(self, Self::Byte(b) if b == ctrl(b'h'))
    }
}

// ─── Byte Source ────────────────────────────────────────────────────────────

/// Anything the decoder can pull bytes from.
///
/// `Ok(None)` means the read timed out with no data. That is a normal
/// outcome, not an error: raw mode is configured with a 100 ms timeout so
/// the editor never blocks indefinitely inside a single read.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Read`](crate::error::TermError::Read) for any
    /// failure other than a timeout.
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Block until one logical key is available and return it.
///
/// Timeouts on the first byte are retried forever. Timeouts or errors while
/// reading the tail of an escape sequence degrade to a literal ESC.
///
/// # Errors
///
/// Propagates a read failure on the first byte of a key.
pub fn read_key(src: &mut impl ByteSource) -> Result<Key> {
    let byte = loop {
        if let Some(b) = src.read_byte()? {
            break b;
        }
    };

    if byte != ESC {
        return Ok(Key::Byte(byte));
    }

    Ok(decode_escape(src))
}

/// Decode the bytes following an ESC. Never fails: anything unexpected is
/// reported as the literal ESC that started it.
fn decode_escape(src: &mut impl ByteSource) -> Key {
    let literal = Key::Byte(ESC);

    let Some(first) = next(src) else {
        return literal;
    };
    let Some(second) = next(src) else {
        return literal;
    };

    match (first, second) {
        (b'[', digit @ b'0'..=b'9') => match next(src) {
            Some(b'~') => tilde_key(digit).unwrap_or(literal),
            _ => literal,
        },
        (b'[', letter) => csi_letter_key(letter).unwrap_or(literal),
        (b'O', b'H') => Key::Home,
        (b'O', b'F') => Key::End,
        _ => literal,
    }
}

/// One continuation byte; timeouts and read errors both count as "absent".
fn next(src: &mut impl ByteSource) -> Option<u8> {
    src.read_byte().ok().flatten()
}

/// `ESC [ <digit> ~` sequences. `1`/`7` and `4`/`8` alias the same keys
/// because terminals disagree on which pair they send.
const fn tilde_key(digit: u8) -> Option<Key> {
    match digit {
        b'1' | b'7' => Some(Key::Home),
        b'3' => Some(Key::Delete),
        b'4' | b'8' => Some(Key::End),
        b'5' => Some(Key::PageUp),
        b'6' => Some(Key::PageDown),
        _ => None,
    }
}

/// `ESC [ <letter>` sequences.
const fn csi_letter_key(letter: u8) -> Option<Key> {
    match letter {
        b'A' => Some(Key::ArrowUp),
        b'B' => Some(Key::ArrowDown),
        b'C' => Some(Key::ArrowRight),
        b'D' => Some(Key::ArrowLeft),
        b'H' => Some(Key::Home),
        b'F' => Some(Key::End),
        _ => None,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
