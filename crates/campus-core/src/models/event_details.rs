use serde::{Deserialize, Serialize};

use super::attendance::{AttendanceRegistration, AttendanceStatus};
use super::notification::NotificationMetadata;
use super::wire::string_or_number;

/// Server-computed tallies of responses per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCounts {
    #[serde(default)]
    pub confirmed_count: u32,
    #[serde(default)]
    pub maybe_count: u32,
    #[serde(default)]
    pub declined_count: u32,
    #[serde(default)]
    pub pending_count: u32,
}

impl AttendanceCounts {
    /// Local estimate after the current user answered `target`, until the
    /// server's numbers replace it.
    pub fn estimate_response(&mut self, target: AttendanceStatus) {
        match target {
            AttendanceStatus::Pending => return,
            AttendanceStatus::Confirmed => self.confirmed_count += 1,
            AttendanceStatus::Maybe => self.maybe_count += 1,
            AttendanceStatus::Declined => self.declined_count += 1,
        }
        self.pending_count = self.pending_count.saturating_sub(1);
    }

    pub fn get(&self, status: AttendanceStatus) -> u32 {
        match status {
            AttendanceStatus::Pending => self.pending_count,
            AttendanceStatus::Confirmed => self.confirmed_count,
            AttendanceStatus::Maybe => self.maybe_count,
            AttendanceStatus::Declined => self.declined_count,
        }
    }
}

/// Aggregate view backing the event detail surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NotificationMetadata>,
    #[serde(flatten)]
    pub counts: AttendanceCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_registration: Option<AttendanceRegistration>,
}

impl EventDetails {
    pub fn user_status(&self) -> AttendanceStatus {
        self.user_registration
            .as_ref()
            .map(|r| r.status)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_flat_counts() {
        let json = r#"{
            "id": 5,
            "title": "Feria de empleo",
            "confirmed_count": 12,
            "maybe_count": 3,
            "declined_count": 1,
            "pending_count": 40,
            "user_registration": {"event_id": 5, "status": "maybe", "notes": "llego tarde"}
        }"#;
        let details: EventDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.counts.confirmed_count, 12);
        assert_eq!(details.counts.pending_count, 40);
        assert_eq!(details.user_status(), AttendanceStatus::Maybe);
    }

    #[test]
    fn test_estimate_moves_one_from_pending() {
        let mut counts = AttendanceCounts {
            confirmed_count: 1,
            pending_count: 0,
            ..Default::default()
        };
        counts.estimate_response(AttendanceStatus::Confirmed);
        assert_eq!(counts.confirmed_count, 2);
        assert_eq!(counts.pending_count, 0);

        counts.estimate_response(AttendanceStatus::Pending);
        assert_eq!(counts.confirmed_count, 2);
    }
}
