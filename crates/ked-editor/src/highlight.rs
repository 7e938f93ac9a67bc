//! Syntax highlighting: per-byte classification of a rendered row.
//!
//! The highlighter is a single left-to-right scan over a row's render bytes,
//! driven by a [`Syntax`] profile. It carries three pieces of local state:
//!
//! - `in_string`: the quote byte of the string literal we are inside, if any
//! - `in_comment`: whether we are inside a block comment
//! - `prev_sep`: whether the previous byte was a separator
//!
//! # Cross-row state
//!
//! Block comments span rows, so `in_comment` starts from the previous row's
//! continuation flag and the row's own flag is whatever `in_comment` is at
//! the end of the scan. When an edit flips a row's flag, the rows below must
//! be re-evaluated; [`Document`](crate::document::Document) drives that
//! cascade. This module only classifies one row.
//!
//! # Precedence at each position
//!
//! 1. single-line comment marker (outside strings and block comments)
//! 2. block comment body / start marker (outside strings)
//! 3. string literal body / opening quote
//! 4. number literal
//! 5. keyword at a separator boundary (longest match wins)
//! 6. anything else is normal text

use crate::syntax::{SECONDARY_SENTINEL, Syntax, SyntaxFlags};

// ---------------------------------------------------------------------------
// Highlight classes
// ---------------------------------------------------------------------------

/// The class of one rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Highlight {
    #[default]
    Normal,
    /// Single-line comment.
    Comment,
    /// Block comment (may span rows).
    BlockComment,
    /// Plain keyword (`if`, `return`).
    KeywordPrimary,
    /// Type-like keyword (`int`, `u32`).
    KeywordSecondary,
    String,
    Number,
    /// Temporary overlay for the current search hit.
    SearchMatch,
}

impl Highlight {
    /// SGR foreground code for this class.
    ///
    /// `Normal` maps to 39 (default foreground); the compositor emits the
    /// default-color sequence for it rather than a palette color.
    #[must_use]
    pub const fn color(self) -> u8 {
        match self {
            Self::Comment | Self::BlockComment => 36,
            Self::KeywordPrimary => 33,
            Self::KeywordSecondary => 32,
            Self::String => 35,
            Self::Number => 31,
            Self::SearchMatch => 34,
            Self::Normal => 39,
        }
    }
}

/// Separators delimit keywords and numbers: C whitespace (ASCII whitespace
/// plus vertical tab), NUL, and a fixed punctuation set.
#[must_use]
pub fn is_separator(byte: u8) -> bool {
    byte.is_ascii_whitespace()
        || byte == b'\x0b'
        || byte == 0
        || b",.()+-/*=~%<>[];".contains(&byte)
}

// ---------------------------------------------------------------------------
// Row highlighter
// ---------------------------------------------------------------------------

/// Result of highlighting one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHighlight {
    /// One class per render byte.
    pub classes: Vec<Highlight>,
    /// True when a block comment is still open at end of row.
    pub open_comment: bool,
}

/// Classify every byte of `render`.
///
/// `prev_open_comment` is the previous row's continuation flag (false for
/// the first row). With no profile everything is [`Highlight::Normal`] and
/// the continuation flag is always false.
#[must_use]
pub fn highlight_row(
    render: &[u8],
    syntax: Option<&Syntax>,
    prev_open_comment: bool,
) -> RowHighlight {
    let mut classes = vec![Highlight::Normal; render.len()];

    let Some(syntax) = syntax else {
        return RowHighlight {
            classes,
            open_comment: false,
        };
    };

    let scs = syntax.single_line_comment.as_bytes();
    let (mcs, mce) = if syntax.has_block_comments() {
        (
            syntax.block_comment_start.as_bytes(),
            syntax.block_comment_end.as_bytes(),
        )
    } else {
        (&[][..], &[][..])
    };
    let strings = syntax.flags.contains(SyntaxFlags::HIGHLIGHT_STRINGS);
    let numbers = syntax.flags.contains(SyntaxFlags::HIGHLIGHT_NUMBERS);

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut in_comment = prev_open_comment;

    let mut i = 0;
    while i < render.len() {
        let c = render[i];
        let prev_hl = if i > 0 { classes[i - 1] } else { Highlight::Normal };
        let rest = &render[i..];

        // ── Single-line comment ─────────────────────────────────────
        if !scs.is_empty() && in_string.is_none() && !in_comment && rest.starts_with(scs) {
            classes[i..].fill(Highlight::Comment);
            break;
        }

        // ── Block comment ───────────────────────────────────────────
        if !mcs.is_empty() && in_string.is_none() {
            if in_comment {
                if rest.starts_with(mce) {
                    classes[i..i + mce.len()].fill(Highlight::BlockComment);
                    i += mce.len();
                    in_comment = false;
                    prev_sep = true;
                } else {
                    classes[i] = Highlight::BlockComment;
                    i += 1;
                }
                continue;
            } else if rest.starts_with(mcs) {
                classes[i..i + mcs.len()].fill(Highlight::BlockComment);
                i += mcs.len();
                in_comment = true;
                continue;
            }
        }

        // ── Strings ─────────────────────────────────────────────────
        if strings {
            if let Some(quote) = in_string {
                classes[i] = Highlight::String;
                if c == b'\\' && i + 1 < render.len() {
                    classes[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == b'"' || c == b'\'' {
                in_string = Some(c);
                classes[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        // ── Numbers ─────────────────────────────────────────────────
        if numbers
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            classes[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        // ── Keywords ────────────────────────────────────────────────
        if prev_sep {
            if let Some((len, class)) = match_keyword(rest, syntax.keywords) {
                classes[i..i + len].fill(class);
                i += len;
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    RowHighlight {
        classes,
        open_comment: in_comment,
    }
}

/// Longest keyword that starts `rest` and is followed by a separator or the
/// end of the row. Returns its byte length and class.
fn match_keyword(rest: &[u8], keywords: &[&str]) -> Option<(usize, Highlight)> {
    let mut best: Option<(usize, Highlight)> = None;

    for keyword in keywords {
        let (word, class) = match keyword.strip_suffix(SECONDARY_SENTINEL) {
            Some(word) => (word, Highlight::KeywordSecondary),
            None => (*keyword, Highlight::KeywordPrimary),
        };
        let word = word.as_bytes();
        if word.is_empty() || !rest.starts_with(word) {
            continue;
        }
        let boundary = rest.get(word.len()).is_none_or(|&b| is_separator(b));
        if boundary && best.is_none_or(|(len, _)| word.len() > len) {
            best = Some((word.len(), class));
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
