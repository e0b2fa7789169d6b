use serde::{Deserialize, Serialize};

use campus_core::models::AttendanceStatus;
use campus_core::UserRole;

/// Envelope printed for every command, success or failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl Response {
    pub fn success(result: serde_json::Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            result: None,
            error: Some(ErrorInfo {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// CLI command parsed from arguments
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Most recent notifications plus the unread badge
    List { limit: Option<usize> },
    Unread,
    MarkRead { id: String },
    MarkAllRead,
    Delete { id: String },
    /// Event details with the current user's registration
    Event { id: String },
    Rsvp {
        id: String,
        status: AttendanceStatus,
        notes: Option<String>,
    },
    Login {
        user_id: String,
        name: String,
        role: UserRole,
        token: Option<String>,
    },
    Logout,
    Whoami,
}

impl CliCommand {
    /// Whether the command talks to the notification store at all.
    pub fn needs_store(&self) -> bool {
        !matches!(self, Self::Login { .. } | Self::Logout | Self::Whoami)
    }
}
