//! Per-conversation scroll state.
//!
//! Scroll position is measured in whole entries from the newest message,
//! not in screen rows. Because older pages prepend above the anchor, a
//! prepend never moves what the reader is looking at; only appends need an
//! explicit adjustment, and only while the reader is scrolled up.

use std::ops::Range;

/// How close to the oldest loaded entry the view may get before the next
/// history page is requested.
const FETCH_MARGIN: usize = 2;

/// Scroll state for one conversation buffer.
///
/// `offset` counts entries between the bottom of the view and the newest
/// message. Zero means pinned to the latest message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
}

impl Viewport {
    /// Create a viewport pinned to the newest message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries between the bottom of the view and the newest message.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether the view follows new messages as they arrive.
    pub fn pinned(&self) -> bool {
        self.offset == 0
    }

    /// Scroll towards older messages, clamped so the oldest loaded entry
    /// stays at the top of the view.
    pub fn scroll_up(&mut self, lines: usize, total: usize, height: usize) {
        let max = total.saturating_sub(height);
        self.offset = self.offset.saturating_add(lines).min(max);
    }

    /// Scroll towards newer messages.
    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    /// Re-pin to the newest message.
    pub fn jump_to_latest(&mut self) {
        self.offset = 0;
    }

    /// Keep the current anchor when `count` messages are appended below it.
    ///
    /// Does nothing while pinned, so a pinned view follows new arrivals.
    pub fn follow_append(&mut self, count: usize) {
        if self.offset > 0 {
            self.offset = self.offset.saturating_add(count);
        }
    }

    /// Whether the view sits close enough to the oldest loaded entry that
    /// the next page should be fetched.
    pub fn near_top(&self, total: usize, height: usize) -> bool {
        self.offset.saturating_add(height).saturating_add(FETCH_MARGIN) >= total
    }

    /// Index range of the entries currently in view, oldest first.
    ///
    /// Clamps a stale offset, so the range is always within `0..total`.
    pub fn visible_range(&self, total: usize, height: usize) -> Range<usize> {
        let max = total.saturating_sub(height);
        let offset = self.offset.min(max);
        let end = total - offset;
        end.saturating_sub(height)..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_viewport_is_pinned() {
        let viewport = Viewport::new();

        assert!(viewport.pinned());
        assert_eq!(viewport.visible_range(30, 10), 20..30);
    }

    #[test]
    fn scroll_up_clamps_at_oldest_entry() {
        let mut viewport = Viewport::new();

        viewport.scroll_up(100, 30, 10);

        assert_eq!(viewport.offset(), 20);
        assert_eq!(viewport.visible_range(30, 10), 0..10);
    }

    #[test]
    fn prepend_leaves_the_anchor_alone() {
        let mut viewport = Viewport::new();
        viewport.scroll_up(5, 30, 10);
        let before = viewport.visible_range(30, 10);

        // Ten older entries arrive above the view. The same messages are
        // now ten indices further in, and the range tracks them.
        let after = viewport.visible_range(40, 10);

        assert_eq!(before, 15..25);
        assert_eq!(after, 25..35);
        assert_eq!(viewport.offset(), 5);
    }

    #[test]
    fn append_while_scrolled_keeps_the_anchor() {
        let mut viewport = Viewport::new();
        viewport.scroll_up(5, 30, 10);

        viewport.follow_append(2);

        // Offset grew with the buffer, so the same entries stay in view.
        assert_eq!(viewport.visible_range(32, 10), 15..25);
    }

    #[test]
    fn append_while_pinned_follows() {
        let mut viewport = Viewport::new();

        viewport.follow_append(3);

        assert!(viewport.pinned());
        assert_eq!(viewport.visible_range(33, 10), 23..33);
    }

    #[test]
    fn near_top_accounts_for_view_height() {
        let mut viewport = Viewport::new();

        assert!(!viewport.near_top(30, 10));

        viewport.scroll_up(17, 30, 10);
        assert!(!viewport.near_top(30, 10));

        viewport.scroll_up(1, 30, 10);
        assert!(viewport.near_top(30, 10));
    }

    #[test]
    fn short_buffers_always_read_as_near_top() {
        let viewport = Viewport::new();

        assert!(viewport.near_top(4, 10));
        assert!(viewport.near_top(0, 10));
    }

    #[test]
    fn stale_offset_is_clamped_in_visible_range() {
        let mut viewport = Viewport::new();
        viewport.scroll_up(20, 40, 10);

        // Buffer shrank to fewer entries than the stored offset.
        assert_eq!(viewport.visible_range(5, 10), 0..5);
    }
}
