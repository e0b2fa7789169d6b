use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;
use super::wire::{lenient_count, lenient_optional_timestamp, lenient_timestamp, string_or_number};

/// Notification category. The backend's set is open: unknown tags are kept
/// verbatim and rendered with the default look.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Event,
    Other(String),
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Event => "event",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for NotificationType {
    fn from(tag: String) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "info" => Self::Info,
            "success" => Self::Success,
            "warning" => Self::Warning,
            "error" => Self::Error,
            "event" => Self::Event,
            _ => Self::Other(tag),
        }
    }
}

impl From<NotificationType> for String {
    fn from(kind: NotificationType) -> Self {
        kind.as_str().to_string()
    }
}

/// Optional urgency tag. Absent means "normal".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
            Self::Other(tag) => tag,
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::High | Self::Urgent)
    }
}

impl From<String> for Priority {
    fn from(tag: String) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "urgent" => Self::Urgent,
            _ => Self::Other(tag),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

/// Structured payload attached to a notification. Only the event keys are
/// interpreted; everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationMetadata {
    #[serde(
        default,
        deserialize_with = "lenient_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl NotificationMetadata {
    /// Whether any of the keys that mark a notification as an event is present.
    pub fn has_event_keys(&self) -> bool {
        self.event_date.as_ref().is_some_and(|d| !d.is_blank())
            || non_blank(&self.event_location)
            || non_blank(&self.event_type)
    }

    pub fn location(&self) -> Option<&str> {
        self.event_location.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.event_description.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn event_kind(&self) -> Option<&str> {
        self.event_type.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn date(&self) -> Option<&Timestamp> {
        self.event_date.as_ref().filter(|d| !d.is_blank())
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, alias = "is_read")]
    pub read: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NotificationMetadata>,
}

impl Notification {
    pub fn event_date(&self) -> Option<&Timestamp> {
        self.metadata.as_ref().and_then(|m| m.date())
    }

    /// Unread and tagged `high` or `urgent`.
    pub fn is_emphasized(&self) -> bool {
        !self.read && self.priority.as_ref().is_some_and(Priority::is_elevated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_backend_record() {
        let json = r#"{
            "id": 17,
            "title": "Entrevista con Acme",
            "message": "Te esperamos",
            "type": "event",
            "priority": "high",
            "is_read": false,
            "created_at": "2026-10-19T09:00:00Z",
            "metadata": {"event_date": "2026-10-26T15:00:00Z", "event_capacity": "25", "room_code": "B-12"}
        }"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.id, "17");
        assert_eq!(n.kind, NotificationType::Event);
        assert_eq!(n.priority, Some(Priority::High));
        assert!(!n.read);
        let meta = n.metadata.as_ref().unwrap();
        assert_eq!(meta.event_capacity, Some(25));
        assert_eq!(meta.extra.get("room_code").and_then(|v| v.as_str()), Some("B-12"));
        assert!(n.is_emphasized());
    }

    #[test]
    fn test_unknown_type_and_priority_are_kept() {
        let json = r#"{"id": "x", "type": "Reminder", "priority": "whenever", "created_at": ""}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind, NotificationType::Other("Reminder".to_string()));
        assert_eq!(n.priority, Some(Priority::Other("whenever".to_string())));
        assert!(!n.is_emphasized());
        assert_eq!(n.kind.as_str(), "Reminder");
    }

    #[test]
    fn test_null_priority_means_normal() {
        let json = r#"{"id": "x", "priority": null, "read": true}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert!(n.priority.is_none());
        assert_eq!(n.kind, NotificationType::Info);
    }

    #[test]
    fn test_blank_event_keys_do_not_count() {
        let meta: NotificationMetadata =
            serde_json::from_str(r#"{"event_location": "  ", "event_date": ""}"#).unwrap();
        assert!(!meta.has_event_keys());
        let meta: NotificationMetadata =
            serde_json::from_str(r#"{"event_type": "charla"}"#).unwrap();
        assert!(meta.has_event_keys());
    }

    #[test]
    fn test_null_created_at_does_not_fail_the_page() {
        let json = r#"[{"id": 1, "created_at": null}, {"id": 2, "created_at": "2026-10-19"}]"#;
        let page: Vec<Notification> = serde_json::from_str(json).unwrap();
        assert_eq!(page.len(), 2);
        assert!(page[0].created_at.is_blank());
        assert!(page[1].created_at.parsed().is_some());
    }
}
