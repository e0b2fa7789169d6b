//! Display helpers shared by the front ends: relative time labels, event
//! dates and icon selection.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};
use std::fmt;

use crate::models::{Notification, Priority, Timestamp};

/// `hace unos minutos` under an hour, `hace N horas` under a day, otherwise
/// the date as dd/mm/yyyy in `now`'s timezone. Unparseable timestamps are shown
/// verbatim.
pub fn relative_time_label<Tz>(ts: &Timestamp, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(at) = ts.parsed() else {
        return ts.raw().trim().to_string();
    };
    let elapsed = now.with_timezone(&Utc).signed_duration_since(at);
    let hours = elapsed.num_hours();
    if hours < 1 {
        "hace unos minutos".to_string()
    } else if hours == 1 {
        "hace 1 hora".to_string()
    } else if hours < 24 {
        format!("hace {hours} horas")
    } else {
        at.with_timezone(&now.timezone())
            .format("%d/%m/%Y")
            .to_string()
    }
}

/// Long Spanish rendering, e.g. `sábado, 24 de octubre de 2026, 18:30`.
pub fn format_event_date<Tz: TimeZone>(ts: &Timestamp, tz: &Tz) -> String {
    let Some(at) = ts.parsed() else {
        return ts.raw().trim().to_string();
    };
    let local = at.with_timezone(tz);
    format!(
        "{}, {} de {} de {}, {:02}:{:02}",
        weekday_es(local.weekday()),
        local.day(),
        month_es(local.month()),
        local.year(),
        local.hour(),
        local.minute()
    )
}

fn weekday_es(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

fn month_es(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "enero",
        "febrero",
        "marzo",
        "abril",
        "mayo",
        "junio",
        "julio",
        "agosto",
        "septiembre",
        "octubre",
        "noviembre",
        "diciembre",
    ];
    MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

/// Icon family of a standard row. Unknown types fall back to [`NotificationIcon::Bell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationIcon {
    Bell,
    Success,
    Warning,
    Error,
    Calendar,
    Urgent,
}

impl NotificationIcon {
    /// Matches keywords in the type tag first, then falls back on priority.
    pub fn for_notification(notification: &Notification) -> Self {
        let kind = notification.kind.as_str().to_lowercase();
        let by_kind = [
            ("success", Self::Success),
            ("approv", Self::Success),
            ("warn", Self::Warning),
            ("error", Self::Error),
            ("fail", Self::Error),
            ("event", Self::Calendar),
        ]
        .into_iter()
        .find(|(needle, _)| kind.contains(needle))
        .map(|(_, icon)| icon);

        match (by_kind, &notification.priority) {
            (Some(icon), _) => icon,
            (None, Some(Priority::Urgent)) => Self::Urgent,
            (None, Some(Priority::High)) => Self::Warning,
            _ => Self::Bell,
        }
    }
}
