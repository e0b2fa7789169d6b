//! In-memory implementation of the notification store.
//!
//! Backs tests and the offline demo mode. State lives behind a single mutex;
//! every call is recorded so tests can assert that an operation reached the
//! store, and any operation can be switched into a failing mode.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use super::{NotificationStore, StoreError, StoreResult};
use crate::models::{
    AttendanceCounts, AttendanceRegistration, AttendanceStatus, EventDetails, Notification,
    NotificationMetadata, NotificationType, Priority, RegisterAttendanceRequest, Timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    UnreadCount,
    MarkRead,
    MarkAllRead,
    Delete,
    EventDetails,
    RegisterAttendance,
}

#[derive(Debug, Default)]
struct MemoryState {
    notifications: Vec<Notification>,
    /// Responses from everyone except the current user
    tallies: HashMap<String, AttendanceCounts>,
    /// The current user's registrations, created on first details fetch
    registrations: HashMap<String, AttendanceRegistration>,
    failing: HashSet<StoreOp>,
    calls: HashMap<StoreOp, usize>,
}

impl MemoryState {
    fn enter(&mut self, op: StoreOp) -> StoreResult<()> {
        *self.calls.entry(op).or_default() += 1;
        if self.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} is switched off")));
        }
        Ok(())
    }

    fn sort(&mut self) {
        self.notifications
            .sort_by(|a, b| b.created_at.parsed().cmp(&a.created_at.parsed()));
    }
}

#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    state: Mutex<MemoryState>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifications(notifications: Vec<Notification>) -> Self {
        let store = Self::new();
        for n in notifications {
            store.insert(n);
        }
        store
    }

    pub fn insert(&self, notification: Notification) {
        let mut state = self.state.lock();
        state.notifications.retain(|n| n.id != notification.id);
        state.notifications.push(notification);
        state.sort();
    }

    pub fn set_tally(&self, event_id: &str, counts: AttendanceCounts) {
        self.state.lock().tallies.insert(event_id.to_string(), counts);
    }

    /// Make every subsequent call of `op` fail until [`Self::recover`] is called.
    pub fn fail(&self, op: StoreOp) {
        self.state.lock().failing.insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        self.state.lock().failing.remove(&op);
    }

    pub fn calls(&self, op: StoreOp) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn notification(&self, id: &str) -> Option<Notification> {
        self.state
            .lock()
            .notifications
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    pub fn registration(&self, event_id: &str) -> Option<AttendanceRegistration> {
        self.state.lock().registrations.get(event_id).cloned()
    }

    /// Sample data relative to `now`: an upcoming event, a past one, a
    /// keyword-only invitation, an urgent warning and some plain notices.
    pub fn demo(now: DateTime<Utc>) -> Self {
        let at = |offset: Duration| Timestamp::from_datetime(now + offset);
        let store = Self::with_notifications(vec![
            Notification {
                id: "101".to_string(),
                title: "Feria de prácticas profesionales".to_string(),
                message: "Empresas del sector tecnológico presentarán sus vacantes.".to_string(),
                kind: NotificationType::Event,
                priority: Some(Priority::High),
                read: false,
                created_at: at(-Duration::minutes(20)),
                metadata: Some(NotificationMetadata {
                    event_date: Some(at(Duration::days(7))),
                    event_location: Some("Auditorio principal".to_string()),
                    event_description: Some("Trae tu CV impreso.".to_string()),
                    event_capacity: Some(120),
                    event_type: Some("feria".to_string()),
                    ..Default::default()
                }),
            },
            Notification {
                id: "102".to_string(),
                title: "Entrega de evaluación pendiente".to_string(),
                message: "La evaluación del proyecto vence mañana.".to_string(),
                kind: NotificationType::Warning,
                priority: Some(Priority::Urgent),
                read: false,
                created_at: at(-Duration::hours(3)),
                metadata: None,
            },
            Notification {
                id: "103".to_string(),
                title: "Invitación a entrevista".to_string(),
                message: "Acme S.A. quiere conocerte.".to_string(),
                kind: NotificationType::Info,
                priority: None,
                read: false,
                created_at: at(-Duration::hours(26)),
                metadata: None,
            },
            Notification {
                id: "104".to_string(),
                title: "Charla de bienvenida".to_string(),
                message: "Gracias por asistir.".to_string(),
                kind: NotificationType::Event,
                priority: Some(Priority::Low),
                read: true,
                created_at: at(-Duration::days(10)),
                metadata: Some(NotificationMetadata {
                    event_date: Some(at(-Duration::days(9))),
                    event_location: Some("Sala 4".to_string()),
                    ..Default::default()
                }),
            },
            Notification {
                id: "105".to_string(),
                title: "Proyecto aprobado".to_string(),
                message: "Tu propuesta fue aprobada por el comité.".to_string(),
                kind: NotificationType::Success,
                priority: None,
                read: true,
                created_at: at(-Duration::days(2)),
                metadata: None,
            },
        ]);
        store.set_tally(
            "101",
            AttendanceCounts {
                confirmed_count: 34,
                maybe_count: 6,
                declined_count: 2,
                pending_count: 57,
            },
        );
        store.set_tally(
            "104",
            AttendanceCounts {
                confirmed_count: 18,
                ..Default::default()
            },
        );
        store
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn list_notifications(&self, limit: usize) -> StoreResult<Vec<Notification>> {
        let mut state = self.state.lock();
        state.enter(StoreOp::List)?;
        Ok(state.notifications.iter().take(limit).cloned().collect())
    }

    async fn unread_count(&self) -> StoreResult<u64> {
        let mut state = self.state.lock();
        state.enter(StoreOp::UnreadCount)?;
        Ok(state.notifications.iter().filter(|n| !n.read).count() as u64)
    }

    async fn mark_read(&self, id: &str) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.enter(StoreOp::MarkRead)?;
        let n = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        n.read = true;
        Ok(())
    }

    async fn mark_all_read(&self) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.enter(StoreOp::MarkAllRead)?;
        state.notifications.iter_mut().for_each(|n| n.read = true);
        Ok(())
    }

    async fn delete_notification(&self, id: &str) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.enter(StoreOp::Delete)?;
        let before = state.notifications.len();
        state.notifications.retain(|n| n.id != id);
        if state.notifications.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn event_details(&self, event_id: &str) -> StoreResult<EventDetails> {
        let mut state = self.state.lock();
        state.enter(StoreOp::EventDetails)?;
        let notification = state
            .notifications
            .iter()
            .find(|n| n.id == event_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(event_id.to_string()))?;

        let registration = state
            .registrations
            .entry(event_id.to_string())
            .or_insert_with(|| AttendanceRegistration {
                event_id: event_id.to_string(),
                status: AttendanceStatus::Pending,
                notes: None,
            })
            .clone();

        let mut counts = state.tallies.get(event_id).copied().unwrap_or_default();
        match registration.status {
            AttendanceStatus::Pending => counts.pending_count += 1,
            AttendanceStatus::Confirmed => counts.confirmed_count += 1,
            AttendanceStatus::Maybe => counts.maybe_count += 1,
            AttendanceStatus::Declined => counts.declined_count += 1,
        }

        Ok(EventDetails {
            id: notification.id,
            title: notification.title,
            message: notification.message,
            metadata: notification.metadata,
            counts,
            user_registration: Some(registration),
        })
    }

    async fn register_attendance(&self, request: &RegisterAttendanceRequest) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.enter(StoreOp::RegisterAttendance)?;
        if !state.notifications.iter().any(|n| n.id == request.event_id) {
            return Err(StoreError::NotFound(request.event_id.clone()));
        }
        if let Some(existing) = state.registrations.get(&request.event_id) {
            if existing.status.is_response() {
                return Err(StoreError::Rejected(
                    "La asistencia ya fue registrada".to_string(),
                ));
            }
        }
        state.registrations.insert(
            request.event_id.clone(),
            AttendanceRegistration {
                event_id: request.event_id.clone(),
                status: request.status,
                notes: request.notes.clone(),
            },
        );
        Ok(())
    }
}
