//! TextBlock Widget
//!
//! A borderless, scrollable block of pre-wrapped styled lines.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;
use unicode_width::UnicodeWidthChar;

use crate::display::DisplayLine;

/// State for a scrollable text block
#[derive(Debug)]
pub struct TextBlockState {
    /// Scroll offset (lines from top)
    pub scroll_offset: usize,
    /// Total content lines
    pub total_lines: usize,
    /// Stick to the bottom as content grows
    pub follow: bool,
    /// Visible height at the last render
    pub viewport: usize,
}

impl Default for TextBlockState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            total_lines: 0,
            follow: true,
            viewport: 0,
        }
    }
}

impl TextBlockState {
    /// Scroll by delta (positive = down)
    ///
    /// Scrolling up stops following new content; reaching the bottom
    /// resumes it.
    pub fn scroll(&mut self, delta: isize) {
        let max = self.max_scroll();
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(max);
        self.follow = self.scroll_offset >= max;
    }

    /// Scroll one viewport up
    pub fn page_up(&mut self) {
        let page = self.page();
        self.scroll(-page);
    }

    /// Scroll one viewport down
    pub fn page_down(&mut self) {
        let page = self.page();
        self.scroll(page);
    }

    /// Jump to the top of the content
    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.follow = self.max_scroll() == 0;
    }

    /// Scroll to bottom and keep following
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
        self.follow = true;
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport)
    }

    fn page(&self) -> isize {
        isize::try_from(self.viewport.max(1)).unwrap_or(isize::MAX)
    }
}

/// A borderless, scrollable text block
pub struct TextBlock<'a> {
    lines: &'a [DisplayLine],
}

impl<'a> TextBlock<'a> {
    /// Create a block over already wrapped lines
    pub fn new(lines: &'a [DisplayLine]) -> Self {
        Self { lines }
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.total_lines = self.lines.len();
        state.viewport = area.height as usize;

        // Clamp scroll
        let max_scroll = state.max_scroll();
        state.scroll_offset = if state.follow {
            max_scroll
        } else {
            state.scroll_offset.min(max_scroll)
        };

        // Render visible lines
        for (i, line) in self
            .lines
            .iter()
            .skip(state.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            let text = truncate_to_width(&line.text, area.width as usize);
            buf.set_string(area.x, y, text, line.style);
        }
    }
}

/// Longest prefix of `text` that fits in `width` terminal columns
pub fn truncate_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (index, c) in text.char_indices() {
        used += c.width().unwrap_or(0);
        if used > width {
            return &text[..index];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Style;

    fn lines(n: usize) -> Vec<DisplayLine> {
        (0..n)
            .map(|i| DisplayLine {
                text: format!("line {i}"),
                style: Style::default(),
            })
            .collect()
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_follow_shows_latest_lines() {
        let content = lines(10);
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        let mut state = TextBlockState::default();

        TextBlock::new(&content).render(area, &mut buf, &mut state);

        assert_eq!(state.scroll_offset, 7);
        assert_eq!(row(&buf, 0), "line 7");
        assert_eq!(row(&buf, 2), "line 9");
    }

    #[test]
    fn test_scrolling_up_stops_following() {
        let content = lines(10);
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        let mut state = TextBlockState::default();
        TextBlock::new(&content).render(area, &mut buf, &mut state);

        state.page_up();
        assert!(!state.follow);
        assert_eq!(state.scroll_offset, 4);

        // More content arrives; the view stays put
        let content = lines(12);
        let mut buf = Buffer::empty(area);
        TextBlock::new(&content).render(area, &mut buf, &mut state);
        assert_eq!(row(&buf, 0), "line 4");

        state.page_down();
        state.page_down();
        assert!(state.follow);
    }

    #[test]
    fn test_truncate_respects_wide_chars() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("搜索完成", 5), "搜索");
        assert_eq!(truncate_to_width("ok", 10), "ok");
    }
}
