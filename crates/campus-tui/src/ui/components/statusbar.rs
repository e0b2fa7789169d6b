// Bottom line: the current toast, with its dismiss key on the right.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::format::truncate_with_ellipsis;
use crate::ui::theme;
use crate::ui::toasts::{Toast, ToastLevel};

const DISMISS_HINT: &str = " x cerrar aviso ";

pub fn render_statusbar(f: &mut Frame, area: Rect, toast: Option<&Toast>) {
    let hint_width = (DISMISS_HINT.width() as u16).min(area.width / 2);
    let chunks =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(hint_width)]).split(area);

    let left = match toast {
        Some(toast) => {
            let (icon, color) = match toast.level {
                ToastLevel::Info => ("\u{2139}", theme::ACCENT_PRIMARY),
                ToastLevel::Success => ("\u{2713}", theme::ACCENT_SUCCESS),
                ToastLevel::Warning => ("\u{26A0}", theme::ACCENT_WARNING),
            };
            let available = (chunks[0].width as usize).saturating_sub(icon.width() + 2);
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" {icon} "), Style::default().fg(color)),
                Span::styled(
                    truncate_with_ellipsis(&toast.message, available),
                    Style::default().fg(color),
                ),
            ]))
        }
        None => Paragraph::new(""),
    };
    f.render_widget(left.style(Style::default().bg(theme::BG_SIDEBAR)), chunks[0]);

    let hint = if toast.is_some() { DISMISS_HINT } else { "" };
    let right = Paragraph::new(hint).style(theme::text_dim().bg(theme::BG_SIDEBAR));
    f.render_widget(right, chunks[1]);
}
