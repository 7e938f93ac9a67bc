// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), sigaction, and raw fd reads/writes. These
// are the standard POSIX interfaces for terminal control; there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. `Terminal::new` enters raw mode
// via termios and the original attributes come back exactly once: on drop,
// on an explicit `restore`, or from the panic hook if the editor panics
// mid-frame.
//
// Reads use VMIN = 0 / VTIME = 1, so every read returns after at most
// 100 ms. A timeout is reported as `Ok(None)` through `ByteSource`; only
// genuine read failures become errors.
//
// The panic hook bypasses Rust's stdout lock entirely, writing a pre-built
// restore sequence directly to fd 1. This prevents deadlock if the panic
// happened while holding the stdout lock.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::error::{Result, TermError};
use crate::input::{ByteSource, ESC};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: usize,
    /// Number of rows (height in character cells).
    pub rows: usize,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports a zero width.
#[cfg(unix)]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: usize::from(ws.ws_col),
            rows: usize::from(ws.ws_row),
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    None
}

/// Longest cursor position report we accept (`ESC[99999;99999R` fits).
const REPORT_MAX: usize = 32;

/// Measure the screen by pushing the cursor into the bottom-right corner
/// and asking where it ended up.
///
/// This is the fallback for terminals (or multiplexers) that do not answer
/// `TIOCGWINSZ`. Works with anything that is both a byte source and a sink,
/// which keeps it testable without a real terminal.
///
/// # Errors
///
/// Returns [`TermError::Write`] if the probe cannot be sent, or
/// [`TermError::WindowSize`] if the reply is missing or malformed.
pub fn probe_size<T: ByteSource + Write>(tty: &mut T) -> Result<Size> {
    ansi::cursor_to_far_corner(tty).map_err(TermError::Write)?;
    ansi::request_cursor_position(tty).map_err(TermError::Write)?;
    tty.flush().map_err(TermError::Write)?;

    let mut reply = Vec::with_capacity(REPORT_MAX);
    while reply.len() < REPORT_MAX - 1 {
        match tty.read_byte() {
            Ok(Some(b'R')) => break,
            Ok(Some(b)) => reply.push(b),
            Ok(None) | Err(_) => break,
        }
    }

    parse_cursor_report(&reply).ok_or_else(|| {
        TermError::WindowSize(format!(
            "unexpected cursor report {:?}",
            String::from_utf8_lossy(&reply)
        ))
    })
}

/// Parse the body of a cursor position report, `ESC [ rows ; cols`, with the
/// trailing `R` already stripped.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(&[ESC, b'['])?;
    let body = std::str::from_utf8(body).ok()?;
    let (rows, cols) = body.split_once(';')?;
    let rows: usize = rows.parse().ok()?;
    let cols: usize = cols.parse().ok()?;
    (rows > 0 && cols > 0).then_some(Size { cols, rows })
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler only sets an atomic flag, which is async-signal-safe. The
/// editor polls it with [`take_resize`] before each frame.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

/// Returns `true` once per terminal resize since the last call.
#[must_use]
pub fn take_resize() -> bool {
    SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed)
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup, behind a [`Mutex`] rather than `static mut`,
/// lets the hook restore cooked mode without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
///
/// Returns `false` when raw mode was not active, so the caller can leave the
/// screen alone.
#[cfg(unix)]
fn restore_termios_from_backup() -> bool {
    let Ok(mut guard) = TERMIOS_BACKUP.lock() else {
        return false;
    };
    let Some(original) = guard.take() else {
        return false;
    };
    unsafe {
        let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original);
    }
    true
}

/// Clear screen, home the cursor, reset colors, show the cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[m\x1b[2J\x1b[H\x1b[?25h";

/// Panic hook guard: ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_after_panic();
            original(info);
        }));
    });
}

#[cfg(unix)]
fn restore_after_panic() {
    if restore_termios_from_backup() {
        emergency_restore();
    }
}

#[cfg(not(unix))]
fn restore_after_panic() {
    emergency_restore();
}

/// Write the restore sequence directly to stdout's file descriptor,
/// bypassing Rust's `io::stdout()` lock.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle in raw mode, with RAII cleanup.
///
/// Reads come from stdin through [`ByteSource`]; writes go to stdout
/// through [`Write`]. The original terminal attributes are restored when
/// the handle is dropped, when [`restore`](Self::restore) is called, or
/// from the panic hook, whichever happens first, and only once.
///
/// # Example
///
/// ```no_run
/// use ked_term::input::read_key;
/// use ked_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// let key = read_key(&mut term)?;
/// term.restore()?;
/// # Ok::<(), ked_term::error::TermError>(())
/// ```
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,
}

impl Terminal {
    /// Enter raw mode and return the handle that will undo it.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::NotATty`] if stdin is not a terminal,
    /// [`TermError::GetAttr`] if its attributes cannot be read, or
    /// [`TermError::SetAttr`] if the new attributes are rejected.
    pub fn new() -> Result<Self> {
        let mut term = Self {
            #[cfg(unix)]
            original_termios: None,
        };

        if !is_tty() {
            return Err(TermError::NotATty);
        }

        install_panic_hook();
        term.enable_raw_mode()?;
        install_sigwinch_handler();

        Ok(term)
    }

    /// Current window size: `TIOCGWINSZ` first, then the cursor-report probe.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::WindowSize`] if neither method works.
    pub fn size(&mut self) -> Result<Size> {
        if let Some(size) = ioctl_size() {
            return Ok(size);
        }
        tracing::debug!("TIOCGWINSZ unavailable, probing with cursor report");
        probe_size(self)
    }

    /// Restore the terminal attributes saved by [`new`](Self::new).
    ///
    /// Idempotent: calling it again, or dropping the handle afterwards, does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::SetAttr`] if `tcsetattr` fails.
    pub fn restore(&mut self) -> Result<()> {
        self.disable_raw_mode()
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> Result<()> {
        let fd = libc::STDIN_FILENO;

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(TermError::GetAttr(io::Error::last_os_error()));
            }

            // Save original for restore.
            self.original_termios = Some(termios);

            // Also save to global backup for the panic hook.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // No break-to-SIGINT, no CR→NL translation, no parity check,
            // no 8th-bit stripping, no Ctrl-S/Ctrl-Q flow control.
            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            // No "\n" → "\r\n" output translation.
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            // No echo, no line buffering, no Ctrl-V, no Ctrl-C/Ctrl-Z signals.
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most 100 ms.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(TermError::SetAttr(io::Error::last_os_error()));
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> Result<()> {
        Err(TermError::GetAttr(io::Error::new(
            io::ErrorKind::Unsupported,
            "raw mode requires a unix terminal",
        )))
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> Result<()> {
        if let Some(ref original) = self.original_termios {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) != 0 {
                    return Err(TermError::SetAttr(io::Error::last_os_error()));
                }
            }

            // Restored, so the panic hook has nothing left to do.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ByteSource for Terminal {
    #[cfg(unix)]
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };
        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    // EAGAIN on some platforms when VTIME expires; EINTR when
                    // SIGWINCH lands mid-read.
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(TermError::Read(err)),
                }
            }
        }
    }

    #[cfg(not(unix))]
    fn read_byte(&mut self) -> Result<Option<u8>> {
        use std::io::Read;
        let mut byte = [0u8; 1];
        match io::stdin().read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(e) => Err(TermError::Read(e)),
        }
    }
}

impl Write for Terminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.disable_raw_mode();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
