//! Scroll-to-newest signal
//!
//! Scrolling follows message arrival only: the log growing fires the signal,
//! edits and deletes never do.

use super::state::Message;

/// Whether a log going from `old_len` to `new_len` entries should scroll
/// to the newest one
pub fn should_scroll(old_len: usize, new_len: usize) -> bool {
    new_len > old_len
}

/// Tracks the log length seen at the last evaluation.
///
/// The baseline moves on every call, including when the log shrinks, so a
/// delete followed by a send still counts as an arrival.
#[derive(Debug, Default, Clone)]
pub struct ScrollTracker {
    observed_len: usize,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the previous baseline and adopt `log` as the new one
    pub fn observe(&mut self, log: &[Message]) -> bool {
        let fire = should_scroll(self.observed_len, log.len());
        self.observed_len = log.len();
        fire
    }
}
