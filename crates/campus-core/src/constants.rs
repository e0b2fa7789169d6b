//! Application-wide constants
//!
//! Centralized location for endpoint paths, defaults and user-facing strings
//! shared by the TUI and the CLI.

/// Default backend base URL (local development server)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Number of notifications requested per panel load
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Delay before the event surface closes itself after a successful RSVP
pub const RSVP_AUTO_CLOSE_MS: u64 = 1500;

/// Keywords that mark a notification as an event when neither the type nor the
/// metadata does. Matched case-insensitively against title + message.
pub const DEFAULT_EVENT_KEYWORDS: [&str; 7] = [
    "evento",
    "reunión",
    "entrevista",
    "invitación",
    "cita",
    "appointment",
    "meeting",
];

/// The single message shown for any failed store call
pub const GENERIC_ERROR_MESSAGE: &str = "Ocurrió un error. Por favor, inténtalo de nuevo.";

/// Label of every manual retry control
pub const RETRY_LABEL: &str = "Reintentar";

/// Notice replacing the RSVP actions once the event date has passed
pub const PAST_EVENT_NOTICE: &str = "Este evento ya pasó. Ya no es posible registrar tu asistencia.";

/// Keyring service name for the stored session
pub const KEYRING_SERVICE: &str = "com.campus.notify";

/// Directory name under the platform data dir
pub const DATA_DIR_NAME: &str = "campus-notify";

// REST paths, relative to the API base URL
pub mod paths {
    pub const NOTIFICATIONS: &str = "/api/notifications/";
    pub const UNREAD_COUNT: &str = "/api/notifications/unread-count/";
    pub const MARK_ALL_READ: &str = "/api/notifications/mark-all-read/";
    pub const REGISTER_ATTENDANCE: &str = "/api/mass-notifications/events/attendance/register/";

    pub fn mark_read(id: &str) -> String {
        format!("/api/notifications/{id}/mark-read/")
    }

    pub fn delete(id: &str) -> String {
        format!("/api/notifications/{id}/delete/")
    }

    pub fn event_details(id: &str) -> String {
        format!("/api/mass-notifications/events/{id}/details/")
    }
}
