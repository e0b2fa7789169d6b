// Layout constants shared by the views.

use ratatui::layout::Rect;

/// Horizontal padding for main content (left + right)
pub const CONTENT_PADDING_H: u16 = 2;

pub const MODAL_PADDING_H: u16 = 2;

pub const HEADER_HEIGHT: u16 = 2;
pub const FOOTER_HEIGHT: u16 = 1;
pub const STATUSBAR_HEIGHT: u16 = 1;

/// Inline error banner above the list
pub const BANNER_HEIGHT: u16 = 2;

pub const MODAL_DEFAULT_WIDTH: u16 = 72;
pub const MODAL_DEFAULT_HEIGHT_PERCENT: f32 = 0.8;

#[inline]
pub fn with_horizontal_padding(area: Rect, padding: u16) -> Rect {
    Rect {
        x: area.x + padding,
        y: area.y,
        width: area.width.saturating_sub(padding * 2),
        height: area.height,
    }
}

#[inline]
pub fn with_content_padding(area: Rect) -> Rect {
    with_horizontal_padding(area, CONTENT_PADDING_H)
}

#[inline]
pub fn with_modal_padding(area: Rect) -> Rect {
    with_horizontal_padding(area, MODAL_PADDING_H)
}
