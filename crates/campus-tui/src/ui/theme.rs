// Centralized theme: every color and style used by the views lives here.

use ratatui::style::{Color, Modifier, Style};

use campus_core::format::NotificationIcon;

// =============================================================================
// COLOR PALETTE
// =============================================================================

pub const BG_APP: Color = Color::Rgb(0, 0, 0);
pub const BG_SELECTED: Color = Color::Rgb(32, 32, 32);
pub const BG_SIDEBAR: Color = Color::Rgb(12, 12, 12);
pub const BG_MODAL: Color = Color::Rgb(24, 24, 24);

/// Unread high/urgent rows
pub const BG_EMPHASIS: Color = Color::Rgb(40, 24, 24);

pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 220);
pub const TEXT_MUTED: Color = Color::Rgb(128, 128, 128);
pub const TEXT_DIM: Color = Color::Rgb(90, 90, 90);

pub const ACCENT_PRIMARY: Color = Color::Rgb(86, 156, 214);
pub const ACCENT_SUCCESS: Color = Color::Rgb(106, 153, 85);
pub const ACCENT_WARNING: Color = Color::Rgb(206, 145, 120);
pub const ACCENT_ERROR: Color = Color::Rgb(244, 112, 112);
pub const ACCENT_SPECIAL: Color = Color::Rgb(169, 154, 203);

// =============================================================================
// STYLES
// =============================================================================

pub fn text_primary() -> Style {
    Style::default().fg(TEXT_PRIMARY)
}

pub fn text_muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn text_dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn text_bold() -> Style {
    Style::default()
        .fg(TEXT_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn status_success() -> Style {
    Style::default().fg(ACCENT_SUCCESS)
}

pub fn status_warning() -> Style {
    Style::default().fg(ACCENT_WARNING)
}

pub fn status_error() -> Style {
    Style::default().fg(ACCENT_ERROR)
}

pub fn badge() -> Style {
    Style::default()
        .fg(BG_APP)
        .bg(ACCENT_ERROR)
        .add_modifier(Modifier::BOLD)
}

pub fn key_hint() -> Style {
    Style::default()
        .fg(ACCENT_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn modal_title() -> Style {
    Style::default()
        .fg(TEXT_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn modal_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn row_selected() -> Style {
    Style::default().bg(BG_SELECTED)
}

/// Glyph and color of a standard row's icon.
pub fn notification_icon(icon: NotificationIcon) -> (&'static str, Color) {
    match icon {
        NotificationIcon::Bell => ("🔔", ACCENT_PRIMARY),
        NotificationIcon::Success => ("✓", ACCENT_SUCCESS),
        NotificationIcon::Warning => ("⚠", ACCENT_WARNING),
        NotificationIcon::Error => ("✗", ACCENT_ERROR),
        NotificationIcon::Calendar => ("📅", ACCENT_SPECIAL),
        NotificationIcon::Urgent => ("‼", ACCENT_ERROR),
    }
}

pub const EVENT_GLYPH: &str = "📅";
