//! Text rendering and the scrollable viewport

use crate::state_machine::{Author, ChatState, Message};
use std::fmt::Write;
use std::ops::Range;

/// Fixed-height window over the conversation log.
///
/// Only an explicit scroll moves it to the newest entry; a log that shrinks
/// just pulls it back into range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    rows: usize,
    top: usize,
}

impl Viewport {
    pub fn new(rows: usize) -> Self {
        Self {
            rows: rows.max(1),
            top: 0,
        }
    }

    fn max_top(&self, len: usize) -> usize {
        len.saturating_sub(self.rows)
    }

    pub fn scroll_to_bottom(&mut self, len: usize) {
        self.top = self.max_top(len);
    }

    pub fn page_up(&mut self) {
        self.top = self.top.saturating_sub(self.rows);
    }

    pub fn page_down(&mut self, len: usize) {
        self.top = (self.top + self.rows).min(self.max_top(len));
    }

    pub fn clamp(&mut self, len: usize) {
        self.top = self.top.min(self.max_top(len));
    }

    /// Indices of the log entries currently on screen
    pub fn visible(&self, len: usize) -> Range<usize> {
        let top = self.top.min(self.max_top(len));
        top..(top + self.rows).min(len)
    }
}

pub fn render_message(message: &Message) -> String {
    let who = match message.author {
        Author::User => "you",
        Author::Bot => "bot",
    };
    if message.is_placeholder() {
        format!("[...] {who}: {} (sending)", message.text)
    } else {
        format!("[{}] {who}: {}", message.id, message.text)
    }
}

/// The whole screen for one view state
pub fn render_view(state: &ChatState, viewport: &Viewport) -> String {
    let mut out = String::new();
    let range = viewport.visible(state.log.len());

    if range.start > 0 {
        let _ = writeln!(out, "  ({} earlier, /up to see)", range.start);
    }
    for message in &state.log[range.clone()] {
        let _ = writeln!(out, "{}", render_message(message));
    }
    let below = state.log.len() - range.end;
    if below > 0 {
        let _ = writeln!(out, "  ({below} newer, /down to see)");
    }

    if state.pending {
        let _ = writeln!(out, "  waiting for reply...");
    }
    if let Some(error) = &state.last_error {
        let _ = writeln!(out, "! {error}");
    }
    out
}
