use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::{layout, theme};

pub struct ModalSize {
    /// Capped by terminal width - 4
    pub max_width: u16,
    /// Fraction of the terminal height (0.0 - 1.0)
    pub height_percent: f32,
}

impl Default for ModalSize {
    fn default() -> Self {
        Self {
            max_width: layout::MODAL_DEFAULT_WIDTH,
            height_percent: layout::MODAL_DEFAULT_HEIGHT_PERCENT,
        }
    }
}

/// Centered popup area
pub fn modal_area(terminal_area: Rect, size: &ModalSize) -> Rect {
    let popup_width = size.max_width.min(terminal_area.width.saturating_sub(4));
    let popup_height = (terminal_area.height as f32 * size.height_percent) as u16;
    let popup_x = terminal_area.x + (terminal_area.width.saturating_sub(popup_width)) / 2;
    let popup_y = terminal_area.y + (terminal_area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

pub fn render_modal_background(f: &mut Frame, area: Rect) {
    f.render_widget(Clear, area);
    f.render_widget(
        Block::default().style(Style::default().bg(theme::BG_MODAL)),
        area,
    );
}

/// Title on the left, key hint on the right. Returns the area below.
pub fn render_modal_header(f: &mut Frame, area: Rect, title: &str, hint: &str) -> Rect {
    let chunks = Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).split(area);
    let header_area = layout::with_modal_padding(chunks[0]);

    let spacing = (header_area.width as usize).saturating_sub(title.width() + hint.width());
    let header_line = Line::from(vec![
        Span::styled(title.to_string(), theme::modal_title()),
        Span::raw(" ".repeat(spacing)),
        Span::styled(hint.to_string(), theme::modal_hint()),
    ]);
    f.render_widget(Paragraph::new(header_line), header_area);

    chunks[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_area_is_centered_and_capped() {
        let area = modal_area(Rect::new(0, 0, 100, 50), &ModalSize::default());
        assert_eq!(area.width, layout::MODAL_DEFAULT_WIDTH);
        assert_eq!(area.height, 40);
        assert_eq!(area.x, 14);
        assert_eq!(area.y, 5);

        let small = modal_area(Rect::new(0, 0, 40, 10), &ModalSize::default());
        assert_eq!(small.width, 36);
    }
}
