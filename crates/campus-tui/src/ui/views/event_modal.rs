use chrono::Local;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use campus_core::constants::{PAST_EVENT_NOTICE, RETRY_LABEL};
use campus_core::models::{AttendanceCounts, AttendanceStatus};
use campus_core::store::{DetailsState, EventSurface, RsvpView};

use crate::ui::app::NotesPrompt;
use crate::ui::components::{modal_area, render_modal_background, render_modal_header, ModalSize};
use crate::ui::{layout, theme};

pub fn render_event_modal(f: &mut Frame, surface: &EventSurface, notes: Option<&NotesPrompt>) {
    let area = modal_area(f.area(), &ModalSize::default());
    render_modal_background(f, area);
    let body = render_modal_header(f, area, surface.title(), "Esc cerrar");
    let body = layout::with_modal_padding(body);

    let mut lines: Vec<Line<'static>> = Vec::new();
    if !surface.message().trim().is_empty() {
        lines.push(Line::styled(surface.message().to_string(), theme::text_primary()));
        lines.push(Line::raw(""));
    }

    for (label, value) in surface.metadata_rows(&Local) {
        lines.push(Line::from(vec![
            Span::styled(format!("{label}: "), theme::text_muted()),
            Span::styled(value, theme::text_primary()),
        ]));
    }
    if let Some(description) = surface.description() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(description.to_string(), theme::text_muted()));
    }

    lines.push(Line::raw(""));
    match surface.details() {
        DetailsState::Loading => {
            lines.push(Line::styled("Cargando detalles del evento…", theme::text_dim()));
        }
        DetailsState::Failed(message) => {
            lines.push(retry_line(message));
        }
        DetailsState::Loaded(details) => {
            lines.push(counts_line(&details.counts));
        }
    }
    lines.push(Line::raw(""));

    rsvp_lines(surface, notes, &mut lines);

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
}

fn retry_line(message: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("✗ {message} "), theme::status_error()),
        Span::styled("[r] ", theme::key_hint()),
        Span::styled(RETRY_LABEL, theme::text_primary()),
    ])
}

fn counts_line(counts: &AttendanceCounts) -> Line<'static> {
    let cell = |label: &str, n: u32, style: Style| {
        vec![
            Span::styled(format!("{n} "), style.add_modifier(Modifier::BOLD)),
            Span::styled(format!("{label}   "), theme::text_muted()),
        ]
    };
    let mut spans = Vec::new();
    spans.extend(cell("confirmados", counts.confirmed_count, theme::status_success()));
    spans.extend(cell("tal vez", counts.maybe_count, theme::status_warning()));
    spans.extend(cell("no asistirán", counts.declined_count, theme::status_error()));
    spans.extend(cell("pendientes", counts.pending_count, theme::text_primary()));
    Line::from(spans)
}

fn status_style(status: AttendanceStatus) -> Style {
    match status {
        AttendanceStatus::Confirmed => theme::status_success(),
        AttendanceStatus::Maybe => theme::status_warning(),
        AttendanceStatus::Declined => theme::status_error(),
        AttendanceStatus::Pending => theme::text_muted(),
    }
}

fn rsvp_lines(surface: &EventSurface, notes: Option<&NotesPrompt>, lines: &mut Vec<Line<'static>>) {
    match surface.rsvp_view() {
        RsvpView::PastEvent => {
            lines.push(Line::styled(PAST_EVENT_NOTICE, theme::status_warning()));
        }
        RsvpView::Waiting => {}
        RsvpView::Responded(status) => {
            lines.push(Line::from(vec![
                Span::styled("Tu respuesta: ", theme::text_muted()),
                Span::styled(
                    format!(" {} ", status.label()),
                    status_style(status).add_modifier(Modifier::REVERSED | Modifier::BOLD),
                ),
            ]));
            if surface.close_at().is_some() {
                lines.push(Line::styled("✓ ¡Respuesta registrada!", theme::status_success()));
            }
        }
        RsvpView::Actions {
            submitting,
            failure,
        } => {
            let key_style = if submitting {
                theme::text_dim()
            } else {
                theme::key_hint()
            };
            let label_style = if submitting {
                theme::text_dim()
            } else {
                theme::text_primary()
            };
            let mut spans = Vec::new();
            for (key, status) in [
                ('c', AttendanceStatus::Confirmed),
                ('m', AttendanceStatus::Maybe),
                ('n', AttendanceStatus::Declined),
            ] {
                spans.push(Span::styled(format!("[{key}] "), key_style));
                spans.push(Span::styled(format!("{}   ", status.action_label()), label_style));
            }
            lines.push(Line::from(spans));

            if submitting {
                lines.push(Line::styled("Enviando respuesta…", theme::text_dim()));
            }
            if let Some(failure) = failure {
                lines.push(retry_line(&failure.message));
            }
            if let Some(prompt) = notes {
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    format!("Notas para \"{}\" (opcional):", prompt.target.action_label()),
                    theme::text_muted(),
                ));
                lines.push(Line::from(vec![
                    Span::styled(format!("> {}", prompt.text), theme::text_primary()),
                    Span::styled("▏", theme::key_hint()),
                ]));
                lines.push(Line::styled("Enter enviar · Esc cancelar", theme::text_dim()));
            }
        }
    }
}
