use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::wire::string_or_number;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Pending,
    Confirmed,
    Declined,
    Maybe,
}

impl AttendanceStatus {
    pub const RESPONSES: [AttendanceStatus; 3] = [Self::Confirmed, Self::Maybe, Self::Declined];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
            Self::Maybe => "maybe",
        }
    }

    /// Badge text shown once a response is on record.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Confirmed => "Confirmado",
            Self::Declined => "No asistirá",
            Self::Maybe => "Tal vez",
        }
    }

    /// Text of the button that submits this response.
    pub fn action_label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Confirmed => "¡Sí, confirmo!",
            Self::Declined => "No podré asistir",
            Self::Maybe => "Tal vez",
        }
    }

    pub fn is_response(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Notes travel with `maybe` and `declined` only.
    pub fn accepts_notes(&self) -> bool {
        matches!(self, Self::Maybe | Self::Declined)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Ok(Self::Pending),
            "confirmed" | "confirm" | "yes" | "si" | "sí" => Ok(Self::Confirmed),
            "declined" | "decline" | "no" => Ok(Self::Declined),
            "maybe" | "tal-vez" | "talvez" => Ok(Self::Maybe),
            other => Err(format!("unknown attendance status: {other}")),
        }
    }
}

/// The current user's response to one event notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRegistration {
    #[serde(deserialize_with = "string_or_number")]
    pub event_id: String,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of the register-attendance call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAttendanceRequest {
    pub event_id: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
