// SPDX-License-Identifier: MIT
//
// Frame buffering.
//
// The compositor writes a whole frame into an `OutputBuffer`, then the
// session hands it to the terminal in one write. A half-drawn frame never
// reaches the screen.

use std::io::{self, Write};

/// Room for a full 80x24 frame with color changes on most rows.
const FRAME_CAPACITY: usize = 16_384;

/// Bytes of one frame, written out by [`flush_to`](Self::flush_to).
#[derive(Debug)]
pub struct OutputBuffer {
    frame: Vec<u8>,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: Vec::with_capacity(FRAME_CAPACITY),
        }
    }

    /// Send the frame to `w` in one `write_all`, then start a new one.
    ///
    /// # Errors
    ///
    /// Returns the writer's error. The frame is kept so nothing is lost if
    /// the caller retries.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.frame.is_empty() {
            return Ok(());
        }
        w.write_all(&self.frame)?;
        w.flush()?;
        self.frame.clear();
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.frame.extend_from_slice(buf);
        Ok(buf.len())
    }

    // Bytes leave only through `flush_to`.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
