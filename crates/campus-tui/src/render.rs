use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::ui::components::render_statusbar;
use crate::ui::{layout, theme, views, App};

pub(crate) fn render(f: &mut Frame, app: &App) {
    f.render_widget(Block::default().style(Style::default().bg(theme::BG_APP)), f.area());

    let chunks = Layout::vertical([
        Constraint::Length(layout::HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(layout::FOOTER_HEIGHT),
        Constraint::Length(layout::STATUSBAR_HEIGHT),
    ])
    .split(f.area());

    views::render_header(f, app, chunks[0]);
    views::render_notification_list(f, app, chunks[1]);
    render_footer(f, app, chunks[2]);
    render_statusbar(f, chunks[3], app.toasts.current());

    if let Some(surface) = app.surface.as_ref() {
        views::render_event_modal(f, surface, app.notes.as_ref());
    }
}

fn render_footer(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let area = layout::with_content_padding(area);
    if app.pending_quit {
        let warning = Paragraph::new("Pulsa Ctrl+C de nuevo para salir").style(theme::status_error());
        f.render_widget(warning, area);
        return;
    }
    let hints: &[(&str, &str)] = if app.notes.is_some() {
        &[("Enter", "enviar"), ("Esc", "cancelar")]
    } else if app.surface.is_some() {
        &[("c/m/n", "responder"), ("r", "reintentar"), ("Esc", "cerrar")]
    } else {
        &[
            ("↑↓", "mover"),
            ("Enter", "abrir"),
            ("d", "eliminar"),
            ("a", "marcar todo leído"),
            ("r", "recargar"),
            ("q", "salir"),
        ]
    };
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!("{key} "), theme::key_hint()));
        spans.push(Span::styled(format!("{label}  "), theme::text_dim()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
