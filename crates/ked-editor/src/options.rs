//! Editor options and the `kedrc` configuration file.
//!
//! Options are read once at start-up from a plain-text file of `set`-style
//! directives, one or more per line:
//!
//! ```text
//! # ~/.config/ked/kedrc
//! set tabstop=4
//! quittimes=2 messagetimeout=3
//! nosyntax
//! ```
//!
//! # Supported syntax
//!
//! | Syntax          | Effect                  |
//! |-----------------|-------------------------|
//! | `option`        | Enable boolean          |
//! | `nooption`      | Disable boolean         |
//! | `option!`       | Toggle boolean          |
//! | `option=N`      | Assign numeric value    |
//!
//! A leading `set` word is accepted and ignored. `#` starts a comment line.
//!
//! # Option names
//!
//! | Full name        | Abbrev | Type    | Default |
//! |------------------|--------|---------|---------|
//! | `tabstop`        | `ts`   | integer | 8       |
//! | `quittimes`      | `qt`   | integer | 3       |
//! | `messagetimeout` | `mt`   | seconds | 5       |
//! | `syntax`         | `syn`  | bool    | true    |
//!
//! A line with any invalid directive is logged and skipped as a whole; the
//! remaining lines still apply.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "KED_CONFIG";

/// Errors from applying a directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),

    #[error("not a boolean option: {0}")]
    NotBoolean(String),

    #[error("option needs a value: {0}")]
    NotNumeric(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option`: enable a boolean option.
    On(String),

    /// `nooption`: disable a boolean option.
    Off(String),

    /// `option!`: toggle a boolean option.
    Toggle(String),

    /// `option=value`: assign a value.
    Assign(String, String),
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(name, "syntax" | "syn")
}

/// Returns `true` if `name` is a known numeric option (full name or abbreviation).
#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    matches!(
        name,
        "tabstop" | "ts" | "quittimes" | "qt" | "messagetimeout" | "mt"
    )
}

/// Parse a single argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    // Assignment: option=value
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    // Toggle: option!
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // Negation: nooption, only for known booleans so an option whose own
    // name starts with "no" would still parse as On.
    if let Some(name) = arg.strip_prefix("no").filter(|name| is_bool_option(name)) {
        return SetDirective::Off(name.to_string());
    }

    SetDirective::On(arg.to_string())
}

/// Parse one config line into directives. Blank lines, comments, and a
/// leading `set` word produce nothing.
#[must_use]
pub fn parse_line(line: &str) -> Vec<SetDirective> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Vec::new();
    }
    let mut words = line.split_whitespace().peekable();
    if words.peek() == Some(&"set") {
        words.next();
    }
    words.map(parse_set_arg).collect()
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Editor-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Tab stop used when expanding tabs for display.
    pub tab_stop: usize,
    /// Consecutive Ctrl-Q presses needed to quit with unsaved changes.
    pub quit_times: u32,
    /// How long a status message stays visible.
    pub message_timeout: Duration,
    /// Whether syntax highlighting is enabled.
    pub syntax: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: crate::row::TAB_STOP,
            quit_times: 3,
            message_timeout: Duration::from_secs(5),
            syntax: true,
        }
    }
}

impl Options {
    /// Apply one directive.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] for unknown names, a boolean form applied
    /// to a numeric option (or vice versa), or an unparsable value. `self` is
    /// unchanged on error.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<(), OptionError> {
        match directive {
            SetDirective::On(name) | SetDirective::Off(name) | SetDirective::Toggle(name) => {
                let slot = self.bool_slot(name)?;
                *slot = match directive {
                    SetDirective::On(_) => true,
                    SetDirective::Off(_) => false,
                    _ => !*slot,
                };
                Ok(())
            }
            SetDirective::Assign(name, value) => self.assign(name, value),
        }
    }

    fn bool_slot(&mut self, name: &str) -> Result<&mut bool, OptionError> {
        match name {
            "syntax" | "syn" => Ok(&mut self.syntax),
            _ if is_numeric_option(name) => Err(OptionError::NotNumeric(name.to_string())),
            _ => Err(OptionError::Unknown(name.to_string())),
        }
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        if is_bool_option(name) {
            return Err(OptionError::NotBoolean(name.to_string()));
        }
        if !is_numeric_option(name) {
            return Err(OptionError::Unknown(name.to_string()));
        }
        let invalid = || OptionError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        let n: u32 = value.parse().map_err(|_| invalid())?;
        match name {
            "tabstop" | "ts" => {
                if n == 0 {
                    return Err(invalid());
                }
                self.tab_stop = n as usize;
            }
            "quittimes" | "qt" => self.quit_times = n,
            _ => self.message_timeout = Duration::from_secs(u64::from(n)),
        }
        Ok(())
    }

    /// Apply every line of a config file body.
    ///
    /// A line whose directives do not all apply is skipped entirely and
    /// logged.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut options = Self::default();
        for (lineno, line) in text.lines().enumerate() {
            let mut candidate = options.clone();
            let result = parse_line(line)
                .iter()
                .try_for_each(|directive| candidate.apply(directive));
            match result {
                Ok(()) => options = candidate,
                Err(err) => warn!(line = lineno + 1, %err, "skipping config line"),
            }
        }
        options
    }

    /// Read options from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns any read error other than `NotFound`.
    pub fn load_from(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "loaded config");
                Ok(Self::parse(&text))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err),
        }
    }

    /// Read options from the standard location, falling back to defaults on
    /// any error.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        Self::load_from(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "cannot read config");
            Self::default()
        })
    }
}

/// Config file location: `$KED_CONFIG`, else `<config_dir>/ked/kedrc`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("ked").join("kedrc")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // ── parse_set_arg ─────────────────────────────────────────────────────

    #[test]
    fn parse_boolean_forms() {
        assert_eq!(parse_set_arg("syntax"), SetDirective::On("syntax".into()));
        assert_eq!(parse_set_arg("nosyntax"), SetDirective::Off("syntax".into()));
        assert_eq!(parse_set_arg("nosyn"), SetDirective::Off("syn".into()));
        assert_eq!(parse_set_arg("syntax!"), SetDirective::Toggle("syntax".into()));
    }

    #[test]
    fn parse_no_prefix_only_for_known_booleans() {
        assert_eq!(parse_set_arg("nothing"), SetDirective::On("nothing".into()));
    }

    #[test]
    fn parse_assignment() {
        assert_eq!(
            parse_set_arg("tabstop=4"),
            SetDirective::Assign("tabstop".into(), "4".into())
        );
        assert_eq!(parse_set_arg("ts="), SetDirective::Assign("ts".into(), String::new()));
    }

    // ── parse_line ────────────────────────────────────────────────────────

    #[test]
    fn blank_and_comment_lines_are_empty() {
        assert!(parse_line("").is_empty());
        assert!(parse_line("   ").is_empty());
        assert!(parse_line("# tabstop=2").is_empty());
        assert!(parse_line("set").is_empty());
    }

    #[test]
    fn set_prefix_and_multiple_args() {
        assert_eq!(
            parse_line("set ts=2 nosyntax"),
            vec![
                SetDirective::Assign("ts".into(), "2".into()),
                SetDirective::Off("syntax".into()),
            ]
        );
    }

    // ── apply ─────────────────────────────────────────────────────────────

    #[test]
    fn defaults() {
        let o = Options::default();
        assert_eq!(o.tab_stop, 8);
        assert_eq!(o.quit_times, 3);
        assert_eq!(o.message_timeout, Duration::from_secs(5));
        assert!(o.syntax);
    }

    #[test]
    fn apply_numeric_and_abbreviations() {
        let mut o = Options::default();
        o.apply(&parse_set_arg("ts=4")).unwrap();
        o.apply(&parse_set_arg("quittimes=1")).unwrap();
        o.apply(&parse_set_arg("mt=10")).unwrap();
        assert_eq!(o.tab_stop, 4);
        assert_eq!(o.quit_times, 1);
        assert_eq!(o.message_timeout, Duration::from_secs(10));
    }

    #[test]
    fn apply_toggle() {
        let mut o = Options::default();
        o.apply(&parse_set_arg("syntax!")).unwrap();
        assert!(!o.syntax);
        o.apply(&parse_set_arg("syn!")).unwrap();
        assert!(o.syntax);
    }

    #[test]
    fn apply_errors() {
        let mut o = Options::default();
        assert_eq!(
            o.apply(&parse_set_arg("bogus")),
            Err(OptionError::Unknown("bogus".into()))
        );
        assert_eq!(
            o.apply(&parse_set_arg("tabstop")),
            Err(OptionError::NotNumeric("tabstop".into()))
        );
        assert_eq!(
            o.apply(&parse_set_arg("syntax=1")),
            Err(OptionError::NotBoolean("syntax".into()))
        );
        assert_eq!(
            o.apply(&parse_set_arg("ts=0")),
            Err(OptionError::InvalidValue {
                name: "ts".into(),
                value: "0".into()
            })
        );
        assert!(o.apply(&parse_set_arg("qt=-1")).is_err());
        assert_eq!(o, Options::default());
    }

    // ── parse / load ──────────────────────────────────────────────────────

    #[test]
    fn parse_file_skips_bad_lines_whole() {
        let text = "# ked config\nset ts=4\nqt=1 bogus\n\nnosyntax\n";
        let o = Options::parse(text);
        assert_eq!(o.tab_stop, 4);
        // The line with `bogus` is dropped, including its valid `qt=1`.
        assert_eq!(o.quit_times, 3);
        assert!(!o.syntax);
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let o = Options::load_from(&dir.path().join("kedrc")).unwrap();
        assert_eq!(o, Options::default());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kedrc");
        fs::write(&path, "tabstop=2\n").unwrap();
        assert_eq!(Options::load_from(&path).unwrap().tab_stop, 2);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            OptionError::Unknown("x".into()).to_string(),
            "unknown option: x"
        );
        assert_eq!(
            OptionError::InvalidValue {
                name: "ts".into(),
                value: "z".into()
            }
            .to_string(),
            "invalid value for ts: z"
        );
    }
}
