//! Language profiles: what the highlighter needs to know about a language.
//!
//! A [`Syntax`] is an immutable registry entry: a display name, filename
//! patterns, a keyword list, comment markers, and feature flags. The
//! highlighter in [`crate::highlight`] is a single algorithm driven entirely
//! by this data, so adding a language is a matter of adding an entry to
//! [`SYNTAXES`].
//!
//! # Keyword classes
//!
//! Keywords come in two classes. Plain keywords (`if`, `return`) are listed
//! as-is; type-like keywords (`int`, `u32`) carry a trailing `|` in the list.
//! The sentinel is stripped before matching and only selects the class.
//!
//! # Filename matching
//!
//! A pattern starting with `.` is an extension and must equal the filename's
//! extension exactly. Any other pattern matches as a substring of the
//! filename (e.g. `Makefile`-style names).

use std::path::Path;

use bitflags::bitflags;

bitflags! {
    /// Optional highlighting passes for a language.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct SyntaxFlags: u8 {
        /// Classify numeric literals.
        const HIGHLIGHT_NUMBERS = 0b0000_0001;
        /// Classify `"..."` and `'...'` literals.
        const HIGHLIGHT_STRINGS = 0b0000_0010;
    }
}

/// Trailing marker that puts a keyword in the secondary (type-like) class.
pub const SECONDARY_SENTINEL: char = '|';

/// A language profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syntax {
    /// Name shown in the status bar.
    pub name: &'static str,
    /// Extensions (leading `.`) or filename substrings that select this profile.
    pub filematch: &'static [&'static str],
    /// Keywords; entries ending in `|` are secondary.
    pub keywords: &'static [&'static str],
    /// Marker that comments out the rest of the row. Empty = none.
    pub single_line_comment: &'static str,
    /// Block comment start marker. Empty = no block comments.
    pub block_comment_start: &'static str,
    /// Block comment end marker. Empty = no block comments.
    pub block_comment_end: &'static str,
    /// Which optional passes are enabled.
    pub flags: SyntaxFlags,
}

impl Syntax {
    /// Whether `filename` selects this profile.
    #[must_use]
    pub fn matches(&self, filename: &Path) -> bool {
        let extension = filename.extension().and_then(|e| e.to_str());
        let name = filename.to_string_lossy();

        self.filematch.iter().any(|pattern| {
            pattern.strip_prefix('.').map_or_else(
                || name.contains(*pattern),
                |ext| extension == Some(ext),
            )
        })
    }

    /// Whether this profile has both block comment markers.
    #[inline]
    #[must_use]
    pub const fn has_block_comments(&self) -> bool {
        !self.block_comment_start.is_empty() && !self.block_comment_end.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "const", "sizeof", "goto", "default", "do",
    "extern", "volatile", "register", "inline", "int|", "long|", "double|", "float|", "char|",
    "unsigned|", "signed|", "void|", "short|", "bool|", "size_t|",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "fn", "for", "if",
    "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self",
    "Self", "static", "struct", "super", "trait", "type", "unsafe", "use", "where", "while",
    "async", "await", "dyn", "true", "false", "i8|", "i16|", "i32|", "i64|", "i128|", "isize|",
    "u8|", "u16|", "u32|", "u64|", "u128|", "usize|", "f32|", "f64|", "bool|", "char|", "str|",
    "String|", "Vec|", "Option|", "Result|", "Box|",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not",
    "or", "pass", "raise", "return", "try", "while", "with", "yield", "None|", "True|", "False|",
    "int|", "float|", "str|", "bytes|", "list|", "dict|", "set|", "tuple|", "bool|",
];

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var", "nil|", "true|", "false|", "int|",
    "int8|", "int16|", "int32|", "int64|", "uint|", "uint8|", "uint16|", "uint32|", "uint64|",
    "float32|", "float64|", "string|", "byte|", "rune|", "bool|", "error|",
];

/// Every language ked knows, in match priority order.
pub static SYNTAXES: &[Syntax] = &[
    Syntax {
        name: "c",
        filematch: &[".c", ".h", ".cpp", ".hpp", ".cc"],
        keywords: C_KEYWORDS,
        single_line_comment: "//",
        block_comment_start: "/*",
        block_comment_end: "*/",
        flags: SyntaxFlags::HIGHLIGHT_NUMBERS.union(SyntaxFlags::HIGHLIGHT_STRINGS),
    },
    Syntax {
        name: "rust",
        filematch: &[".rs"],
        keywords: RUST_KEYWORDS,
        single_line_comment: "//",
        block_comment_start: "/*",
        block_comment_end: "*/",
        flags: SyntaxFlags::HIGHLIGHT_NUMBERS.union(SyntaxFlags::HIGHLIGHT_STRINGS),
    },
    Syntax {
        name: "python",
        filematch: &[".py"],
        keywords: PYTHON_KEYWORDS,
        single_line_comment: "#",
        block_comment_start: "",
        block_comment_end: "",
        flags: SyntaxFlags::HIGHLIGHT_NUMBERS.union(SyntaxFlags::HIGHLIGHT_STRINGS),
    },
    Syntax {
        name: "go",
        filematch: &[".go"],
        keywords: GO_KEYWORDS,
        single_line_comment: "//",
        block_comment_start: "/*",
        block_comment_end: "*/",
        flags: SyntaxFlags::HIGHLIGHT_NUMBERS.union(SyntaxFlags::HIGHLIGHT_STRINGS),
    },
];

/// Find the profile for `filename`, if any.
///
/// Returns `None` for unknown file types; the document then renders every
/// character as normal text.
#[must_use]
pub fn select(filename: &Path) -> Option<&'static Syntax> {
    SYNTAXES.iter().find(|syntax| syntax.matches(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_by_extension() {
        assert_eq!(select(Path::new("main.c")).map(|s| s.name), Some("c"));
        assert_eq!(select(Path::new("src/lib.rs")).map(|s| s.name), Some("rust"));
        assert_eq!(select(Path::new("a/b/tool.py")).map(|s| s.name), Some("python"));
        assert_eq!(select(Path::new("main.go")).map(|s| s.name), Some("go"));
        assert_eq!(select(Path::new("editor.h")).map(|s| s.name), Some("c"));
    }

    #[test]
    fn extension_must_match_exactly() {
        // ".c" must not match ".cs" or ".rs.bak".
        assert_eq!(select(Path::new("Program.cs")), None);
        assert_eq!(select(Path::new("lib.rs.bak")), None);
    }

    #[test]
    fn unknown_file_has_no_profile() {
        assert_eq!(select(Path::new("notes.txt")), None);
        assert_eq!(select(Path::new("README")), None);
    }

    #[test]
    fn substring_pattern_matches_anywhere() {
        const MAKE: Syntax = Syntax {
            name: "make",
            filematch: &["Makefile"],
            keywords: &[],
            single_line_comment: "#",
            block_comment_start: "",
            block_comment_end: "",
            flags: SyntaxFlags::empty(),
        };
        assert!(MAKE.matches(Path::new("Makefile")));
        assert!(MAKE.matches(Path::new("build/Makefile.inc")));
        assert!(!MAKE.matches(Path::new("makefile")));
    }

    #[test]
    fn block_comment_support() {
        let c = select(Path::new("x.c")).unwrap();
        assert!(c.has_block_comments());
        let py = select(Path::new("x.py")).unwrap();
        assert!(!py.has_block_comments());
    }

    #[test]
    fn registry_flags_are_enabled() {
        for syntax in SYNTAXES {
            assert!(syntax.flags.contains(SyntaxFlags::HIGHLIGHT_NUMBERS), "{}", syntax.name);
            assert!(syntax.flags.contains(SyntaxFlags::HIGHLIGHT_STRINGS), "{}", syntax.name);
        }
    }

    #[test]
    fn keyword_lists_have_no_empty_entries() {
        for syntax in SYNTAXES {
            for kw in syntax.keywords {
                assert!(!kw.trim_end_matches(SECONDARY_SENTINEL).is_empty());
            }
        }
    }
}
