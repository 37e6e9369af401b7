use ratatui::layout::{Constraint, Direction, Layout, Rect};
use std::ops::Range;
use unicode_width::UnicodeWidthChar;

/// Breaks `chars` into lines no wider than `width` display columns.
///
/// Wrapping is per character so CJK runs without spaces still break. A
/// character wider than the whole line gets a line of its own.
pub fn wrap_lines(chars: &[char], width: u16) -> Vec<Range<usize>> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0;

    for (idx, c) in chars.iter().enumerate() {
        let w = c.width().unwrap_or(0);
        if used + w > width && idx > start {
            lines.push(start..idx);
            start = idx;
            used = 0;
        }
        used += w;
    }
    if start < chars.len() || lines.is_empty() {
        lines.push(start..chars.len());
    }
    lines
}

/// Line holding `cursor`. A cursor past the end sits on the last line.
pub fn cursor_line(lines: &[Range<usize>], cursor: usize) -> usize {
    lines
        .iter()
        .position(|l| l.contains(&cursor))
        .unwrap_or_else(|| lines.len().saturating_sub(1))
}

/// First visible line. The view stays put while the cursor line fits and
/// otherwise moves so one line of context remains above the cursor.
pub fn scroll_offset(cursor_line: usize, height: usize) -> usize {
    if height == 0 || cursor_line < height {
        0
    } else if height == 1 {
        cursor_line
    } else {
        cursor_line - 1
    }
}

/// A `percent_x` by `percent_y` rectangle centered in `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn wraps_ascii_at_width() {
        let lines = wrap_lines(&chars("abcdefg"), 3);
        assert_eq!(lines, vec![0..3, 3..6, 6..7]);
    }

    #[test]
    fn wide_chars_take_two_columns() {
        // each CJK char is 2 columns wide, so only two fit in 5
        let lines = wrap_lines(&chars("你好世界"), 5);
        assert_eq!(lines, vec![0..2, 2..4]);
    }

    #[test]
    fn empty_text_has_one_empty_line() {
        assert_eq!(wrap_lines(&[], 10), vec![0..0]);
    }

    #[test]
    fn too_narrow_still_progresses() {
        let lines = wrap_lines(&chars("你好"), 1);
        assert_eq!(lines, vec![0..1, 1..2]);
    }

    #[test]
    fn cursor_line_lookup() {
        let lines = wrap_lines(&chars("abcdefg"), 3);
        assert_eq!(cursor_line(&lines, 0), 0);
        assert_eq!(cursor_line(&lines, 4), 1);
        assert_eq!(cursor_line(&lines, 7), 2);
    }

    #[test]
    fn scroll_keeps_context_line() {
        assert_eq!(scroll_offset(0, 5), 0);
        assert_eq!(scroll_offset(4, 5), 0);
        assert_eq!(scroll_offset(5, 5), 4);
        assert_eq!(scroll_offset(9, 5), 8);
        assert_eq!(scroll_offset(3, 1), 3);
        assert_eq!(scroll_offset(3, 0), 0);
    }

    #[test]
    fn centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(50, 40, outer);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 25);
        assert_eq!(inner.y, 15);
    }
}
