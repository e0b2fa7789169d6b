use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use campus_core::constants::RETRY_LABEL;
use campus_core::format::{relative_time_label, NotificationIcon};
use campus_core::models::Notification;
use campus_core::store::{ListEntry, LoadState};

use crate::ui::format::{first_line, truncate_with_ellipsis};
use crate::ui::{layout, theme, App};

/// Header: title plus the unread badge.
pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let area = layout::with_content_padding(area);
    let mut spans = vec![Span::styled("Notificaciones", theme::text_bold())];
    if app.list.unread_count() > 0 {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!(" {} ", app.list.unread_count()),
            theme::badge(),
        ));
    }
    if app.list.is_loading() {
        spans.push(Span::styled("  Cargando…", theme::text_dim()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);

    // Same row as the title; only the identity's own cells are styled.
    let identity =
        Paragraph::new(Line::styled(app.identity(), theme::text_muted())).alignment(Alignment::Right);
    f.render_widget(identity, area);
}

pub fn render_notification_list(f: &mut Frame, app: &App, area: Rect) {
    let area = layout::with_content_padding(area);
    let error = app
        .list
        .list_state()
        .error()
        .or_else(|| app.list.count_state().error());

    let body = match error {
        Some(message) => {
            let chunks =
                Layout::vertical([Constraint::Length(layout::BANNER_HEIGHT), Constraint::Min(0)])
                    .split(area);
            render_error_banner(f, chunks[0], message);
            chunks[1]
        }
        None => area,
    };

    if app.list.items().is_empty() {
        let placeholder = match app.list.list_state() {
            LoadState::Loading | LoadState::Idle => "Cargando notificaciones…",
            LoadState::Failed(_) => "",
            LoadState::Loaded => "No tienes notificaciones",
        };
        f.render_widget(Paragraph::new(placeholder).style(theme::text_muted()), body);
        return;
    }

    let width = body.width as usize;
    let now = Local::now();
    let items: Vec<ListItem> = app
        .list
        .entries()
        .enumerate()
        .map(|(i, entry)| {
            let text = if entry.is_event {
                event_card(entry, width, now)
            } else {
                standard_row(entry.notification, width, now)
            };
            ListItem::new(text).style(row_style(entry.notification, i == app.selected))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(List::new(items), body, &mut state);
}

fn render_error_banner(f: &mut Frame, area: Rect, message: &str) {
    let line = Line::from(vec![
        Span::styled(format!("✗ {message} "), theme::status_error()),
        Span::styled("[r] ", theme::key_hint()),
        Span::styled(RETRY_LABEL, theme::text_primary()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn row_style(notification: &Notification, selected: bool) -> Style {
    if selected {
        theme::row_selected()
    } else if notification.is_emphasized() {
        Style::default().bg(theme::BG_EMPHASIS)
    } else {
        Style::default()
    }
}

fn title_style(notification: &Notification) -> Style {
    if notification.read {
        theme::text_muted()
    } else {
        theme::text_bold()
    }
}

fn unread_marker(notification: &Notification) -> Span<'static> {
    if notification.read {
        Span::raw("  ")
    } else {
        Span::styled("● ", Style::default().fg(theme::ACCENT_PRIMARY))
    }
}

fn standard_row(notification: &Notification, width: usize, now: chrono::DateTime<Local>) -> Text<'static> {
    let (glyph, color) = theme::notification_icon(NotificationIcon::for_notification(notification));
    let time = relative_time_label(&notification.created_at, now);
    let title_width = width.saturating_sub(time.chars().count() + 8);

    let title = Line::from(vec![
        unread_marker(notification),
        Span::styled(format!("{glyph} "), Style::default().fg(color)),
        Span::styled(
            truncate_with_ellipsis(&notification.title, title_width),
            title_style(notification),
        ),
        Span::raw("  "),
        Span::styled(time, theme::text_dim()),
    ]);
    let message = Line::from(vec![
        Span::raw("     "),
        Span::styled(
            truncate_with_ellipsis(first_line(&notification.message), width.saturating_sub(5)),
            theme::text_muted(),
        ),
    ]);
    Text::from(vec![title, message])
}

/// Event cards show a date/location preview instead of the message.
fn event_card(entry: ListEntry<'_>, width: usize, now: chrono::DateTime<Local>) -> Text<'static> {
    let notification = entry.notification;
    let time = relative_time_label(&notification.created_at, now);
    let title_width = width.saturating_sub(time.chars().count() + 8);

    let title = Line::from(vec![
        unread_marker(notification),
        Span::styled(
            format!("{} ", theme::EVENT_GLYPH),
            Style::default().fg(theme::ACCENT_SPECIAL),
        ),
        Span::styled(
            truncate_with_ellipsis(&notification.title, title_width),
            title_style(notification),
        ),
        Span::raw("  "),
        Span::styled(time, theme::text_dim()),
    ]);

    let meta = notification.metadata.as_ref();
    let mut preview: Vec<String> = Vec::new();
    if let Some(date) = notification.event_date() {
        preview.push(campus_core::format::format_event_date(date, &Local));
    }
    if let Some(location) = meta.and_then(|m| m.location()) {
        preview.push(location.to_string());
    }
    if preview.is_empty() {
        preview.push(first_line(&notification.message).to_string());
    }
    let detail = Line::from(vec![
        Span::raw("     "),
        Span::styled(
            truncate_with_ellipsis(&preview.join(" · "), width.saturating_sub(5)),
            Style::default().fg(theme::ACCENT_SPECIAL),
        ),
    ]);
    let hint = Line::from(vec![
        Span::raw("     "),
        Span::styled("Enter: ver evento y responder", theme::text_dim()),
    ]);
    Text::from(vec![title, detail, hint])
}
