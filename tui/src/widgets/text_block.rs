//! TextBlock Widget
//!
//! A borderless, bottom-anchored scrolling region for pre-wrapped lines.
//! Rows cut off at either edge are faded to hint at more content.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;

use crate::display::DisplayLine;
use crate::theme::{FADE_FAR, FADE_NEAR};

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Total content lines
    pub total_lines: usize,
}

impl TextBlockState {
    /// Scroll up (towards older lines)
    pub fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.total_lines.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max_scroll);
    }

    /// Scroll down (towards the latest line)
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Jump to the latest line
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

/// A borderless, scrollable block of wrapped lines
pub struct TextBlock<'a> {
    lines: &'a [DisplayLine],
}

impl<'a> TextBlock<'a> {
    pub fn new(lines: &'a [DisplayLine]) -> Self {
        Self { lines }
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let height = area.height as usize;
        if height == 0 || area.width == 0 {
            return;
        }

        state.total_lines = self.lines.len();

        // Clamp scroll
        let max_scroll = state.total_lines.saturating_sub(height);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let visible_end = state.total_lines.saturating_sub(state.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        let has_content_above = visible_start > 0;
        let has_content_below = state.scroll_offset > 0;

        for (i, line) in self.lines[visible_start..visible_end].iter().enumerate() {
            let style = if has_content_above && i < 2 {
                fade(i)
            } else if has_content_below && i >= height.saturating_sub(2) {
                fade(height.saturating_sub(1).saturating_sub(i))
            } else {
                line.style
            };

            let y = area.y + i as u16;
            buf.set_stringn(area.x, y, &line.text, area.width as usize, style);
        }
    }
}

/// Style for a row `dist` rows away from a cut edge
fn fade(dist: usize) -> Style {
    let shade = if dist == 0 { FADE_FAR } else { FADE_NEAR };
    Style::default().fg(shade)
}
