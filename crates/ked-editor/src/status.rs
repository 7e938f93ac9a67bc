//! Status message shown in the message bar.

use std::time::{Duration, Instant};

/// The most recent status message and when it was set.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self {
            text: String::new(),
            set_at: Instant::now(),
        }
    }
}

impl StatusMessage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the message and restart its timer.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.set_at = Instant::now();
    }

    /// Clear the message.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// The message if it is younger than `timeout` at `now`.
    #[must_use]
    pub fn visible_at(&self, now: Instant, timeout: Duration) -> Option<&str> {
        let fresh = now.saturating_duration_since(self.set_at) < timeout;
        (fresh && !self.text.is_empty()).then_some(self.text.as_str())
    }

    /// The message if it is younger than `timeout` now.
    #[must_use]
    pub fn visible(&self, timeout: Duration) -> Option<&str> {
        self.visible_at(Instant::now(), timeout)
    }
}
