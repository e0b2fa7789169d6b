use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::attendance::{AttendanceAttempt, AttendanceMachine, RsvpFailure, RsvpRejected};
use crate::api::StoreResult;
use crate::format::format_event_date;
use crate::models::{
    AttendanceCounts, AttendanceStatus, EventDetails, Notification, NotificationMetadata,
};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one opening of the event surface. Details and attendance
/// answers carry it back so that results for a closed surface are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl SurfaceId {
    fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsState {
    Loading,
    Loaded(EventDetails),
    Failed(String),
}

/// What the RSVP area of the surface shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RsvpView<'a> {
    /// The event date is behind us; no actions at all.
    PastEvent,
    /// Details are not in yet, so the user's standing answer is unknown.
    Waiting,
    /// A response is on record; shown as a read-only badge.
    Responded(AttendanceStatus),
    Actions {
        submitting: bool,
        failure: Option<&'a RsvpFailure>,
    },
}

/// One opened event card: lazily fetched details plus the RSVP workflow.
///
/// The past-event check uses the clock captured at open time and is not
/// re-evaluated later. The card's own date is checked on open and the first
/// details payload's date is checked on arrival; either one in the past locks
/// the RSVP actions.
#[derive(Debug)]
pub struct EventSurface {
    id: SurfaceId,
    notification: Notification,
    details: DetailsState,
    machine: AttendanceMachine,
    opened_at: DateTime<Utc>,
    past_checked: bool,
    auto_close: Duration,
    close_at: Option<Instant>,
}

impl EventSurface {
    pub fn open(notification: Notification, now: DateTime<Utc>, auto_close: Duration) -> Self {
        let mut machine = AttendanceMachine::new(notification.id.clone());
        if notification.event_date().is_some_and(|d| d.is_before(now)) {
            machine.lock_past_event();
        }
        tracing::debug!(event_id = %notification.id, "event surface opened");
        Self {
            id: SurfaceId::next(),
            notification,
            details: DetailsState::Loading,
            machine,
            opened_at: now,
            past_checked: false,
            auto_close,
            close_at: None,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn event_id(&self) -> &str {
        &self.notification.id
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    pub fn details(&self) -> &DetailsState {
        &self.details
    }

    pub fn loaded_details(&self) -> Option<&EventDetails> {
        match &self.details {
            DetailsState::Loaded(details) => Some(details),
            _ => None,
        }
    }

    pub fn machine(&self) -> &AttendanceMachine {
        &self.machine
    }

    pub fn status(&self) -> AttendanceStatus {
        self.machine.status()
    }

    pub fn is_event_passed(&self) -> bool {
        self.machine.is_event_passed()
    }

    pub fn title(&self) -> &str {
        match self.loaded_details() {
            Some(details) if !details.title.trim().is_empty() => &details.title,
            _ => &self.notification.title,
        }
    }

    pub fn message(&self) -> &str {
        match self.loaded_details() {
            Some(details) if !details.message.trim().is_empty() => &details.message,
            _ => &self.notification.message,
        }
    }

    fn metadata(&self) -> Option<&NotificationMetadata> {
        self.loaded_details()
            .and_then(|d| d.metadata.as_ref())
            .or(self.notification.metadata.as_ref())
    }

    // ===== Details =====

    /// Start (or restart after a failure) the details fetch. Loaded details
    /// stay on screen while a reconciling fetch runs.
    pub fn begin_details_fetch(&mut self) -> SurfaceId {
        if !matches!(self.details, DetailsState::Loaded(_)) {
            self.details = DetailsState::Loading;
        }
        self.id
    }

    pub fn can_retry_details(&self) -> bool {
        matches!(self.details, DetailsState::Failed(_))
    }

    pub fn apply_details(&mut self, surface: SurfaceId, result: StoreResult<EventDetails>) -> bool {
        if surface != self.id {
            tracing::debug!(event_id = %self.notification.id, "discarding details for a closed surface");
            return false;
        }
        match result {
            Ok(details) => {
                if !self.past_checked {
                    self.past_checked = true;
                    let date = details.metadata.as_ref().and_then(|m| m.date());
                    if date.is_some_and(|d| d.is_before(self.opened_at)) {
                        self.machine.lock_past_event();
                    }
                }
                if let Some(registration) = &details.user_registration {
                    self.machine.apply_registration(registration);
                }
                self.details = DetailsState::Loaded(details);
            }
            Err(err) => {
                tracing::warn!(event_id = %self.notification.id, error = %err, "failed to fetch event details");
                // A failed reconcile keeps the estimate on screen.
                if !matches!(self.details, DetailsState::Loaded(_)) {
                    self.details = DetailsState::Failed(err.user_message().to_string());
                }
            }
        }
        true
    }

    // ===== RSVP =====

    fn ready(&self) -> Result<(), RsvpRejected> {
        if self.machine.is_event_passed() {
            return Err(RsvpRejected::EventPassed);
        }
        if self.loaded_details().is_none() {
            return Err(RsvpRejected::NotReady);
        }
        Ok(())
    }

    pub fn request_confirm(&mut self) -> Result<AttendanceAttempt, RsvpRejected> {
        self.ready()?;
        self.machine.request_confirm()
    }

    pub fn request_decline_or_maybe(
        &mut self,
        target: AttendanceStatus,
        notes: Option<&str>,
    ) -> Result<AttendanceAttempt, RsvpRejected> {
        self.ready()?;
        self.machine.request_decline_or_maybe(target, notes)
    }

    pub fn request(
        &mut self,
        target: AttendanceStatus,
        notes: Option<&str>,
    ) -> Result<AttendanceAttempt, RsvpRejected> {
        self.ready()?;
        self.machine.request(target, notes)
    }

    pub fn retry(&mut self) -> Result<AttendanceAttempt, RsvpRejected> {
        self.ready()?;
        self.machine.retry()
    }

    /// Apply the store's answer to a submission.
    ///
    /// On success the counts get a local estimate, the surface schedules its
    /// own close, and `true` is returned: the caller must re-fetch the details
    /// so the server's tallies replace the estimate.
    pub fn attendance_settled(
        &mut self,
        surface: SurfaceId,
        attempt: &AttendanceAttempt,
        result: &StoreResult<()>,
        now: Instant,
    ) -> bool {
        if surface != self.id {
            return false;
        }
        if !self.machine.complete(attempt, result) {
            return false;
        }
        tracing::info!(event_id = %self.notification.id, status = %attempt.target, "attendance registered");
        if let DetailsState::Loaded(details) = &mut self.details {
            details.counts.estimate_response(attempt.target);
            if let Some(registration) = details.user_registration.as_mut() {
                registration.status = attempt.target;
                registration.notes = attempt.notes.clone();
            }
        }
        self.close_at = Some(now + self.auto_close);
        true
    }

    pub fn close_at(&self) -> Option<Instant> {
        self.close_at
    }

    /// Whether the post-submission delay has elapsed.
    pub fn should_close(&self, now: Instant) -> bool {
        self.close_at.is_some_and(|at| now >= at)
    }

    pub fn rsvp_view(&self) -> RsvpView<'_> {
        if self.machine.is_event_passed() {
            return RsvpView::PastEvent;
        }
        if self.machine.status().is_response() {
            return RsvpView::Responded(self.machine.status());
        }
        if self.loaded_details().is_none() {
            return RsvpView::Waiting;
        }
        RsvpView::Actions {
            submitting: self.machine.is_submitting(),
            failure: self.machine.failure(),
        }
    }

    pub fn counts(&self) -> Option<AttendanceCounts> {
        self.loaded_details().map(|d| d.counts)
    }

    /// Labelled metadata lines; absent fields are left out entirely.
    pub fn metadata_rows<Tz: TimeZone>(&self, tz: &Tz) -> Vec<(&'static str, String)> {
        let Some(meta) = self.metadata() else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        if let Some(date) = meta.date() {
            rows.push(("Fecha", format_event_date(date, tz)));
        }
        if let Some(location) = meta.location() {
            rows.push(("Lugar", location.to_string()));
        }
        if let Some(kind) = meta.event_kind() {
            rows.push(("Tipo", kind.to_string()));
        }
        if let Some(capacity) = meta.event_capacity {
            rows.push(("Capacidad", format!("{capacity} personas")));
        }
        rows
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StoreError;
    use crate::models::{AttendanceRegistration, NotificationType, Timestamp};
    use chrono::Duration as ChronoDuration;

    const CLOSE: Duration = Duration::from_millis(1500);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn event(date: Option<Timestamp>) -> Notification {
        Notification {
            id: "42".to_string(),
            title: "Feria".to_string(),
            message: "Ven".to_string(),
            kind: NotificationType::Event,
            priority: None,
            read: false,
            created_at: Timestamp::default(),
            metadata: Some(NotificationMetadata {
                event_date: date,
                event_location: Some("Aula magna".to_string()),
                ..Default::default()
            }),
        }
    }

    fn details(status: AttendanceStatus, date: Option<Timestamp>) -> EventDetails {
        EventDetails {
            id: "42".to_string(),
            title: "Feria".to_string(),
            message: "Ven".to_string(),
            metadata: Some(NotificationMetadata {
                event_date: date,
                ..Default::default()
            }),
            counts: AttendanceCounts {
                confirmed_count: 3,
                maybe_count: 1,
                declined_count: 0,
                pending_count: 5,
            },
            user_registration: Some(AttendanceRegistration {
                event_id: "42".to_string(),
                status,
                notes: None,
            }),
        }
    }

    fn next_week() -> Option<Timestamp> {
        Some(Timestamp::from_datetime(now() + ChronoDuration::days(7)))
    }

    fn loaded(date: Option<Timestamp>) -> EventSurface {
        let mut surface = EventSurface::open(event(date.clone()), now(), CLOSE);
        let id = surface.begin_details_fetch();
        surface.apply_details(id, Ok(details(AttendanceStatus::Pending, date)));
        surface
    }

    #[test]
    fn test_confirm_shows_badge_and_schedules_close() {
        let mut surface = loaded(next_week());
        assert!(matches!(surface.rsvp_view(), RsvpView::Actions { submitting: false, failure: None }));

        let attempt = surface.request_confirm().unwrap();
        assert!(matches!(surface.rsvp_view(), RsvpView::Actions { submitting: true, .. }));

        let t0 = Instant::now();
        assert!(surface.attendance_settled(surface.id(), &attempt, &Ok(()), t0));
        assert_eq!(surface.rsvp_view(), RsvpView::Responded(AttendanceStatus::Confirmed));
        assert_eq!(AttendanceStatus::Confirmed.label(), "Confirmado");

        let counts = surface.counts().unwrap();
        assert_eq!(counts.confirmed_count, 4);
        assert_eq!(counts.pending_count, 4);

        assert!(!surface.should_close(t0));
        assert!(surface.should_close(t0 + CLOSE));
        assert_eq!(
            surface.request_decline_or_maybe(AttendanceStatus::Maybe, None),
            Err(RsvpRejected::AlreadyAnswered(AttendanceStatus::Confirmed))
        );
    }

    #[test]
    fn test_past_event_from_notification_date() {
        let yesterday = Some(Timestamp::from_datetime(now() - ChronoDuration::days(1)));
        let surface = EventSurface::open(event(yesterday), now(), CLOSE);
        assert_eq!(surface.rsvp_view(), RsvpView::PastEvent);
    }

    #[test]
    fn test_past_event_wins_over_recorded_status() {
        let yesterday = Some(Timestamp::from_datetime(now() - ChronoDuration::days(1)));
        let mut surface = EventSurface::open(event(yesterday.clone()), now(), CLOSE);
        let id = surface.begin_details_fetch();
        surface.apply_details(id, Ok(details(AttendanceStatus::Confirmed, yesterday)));
        assert_eq!(surface.rsvp_view(), RsvpView::PastEvent);
        assert_eq!(surface.request_confirm(), Err(RsvpRejected::EventPassed));
    }

    #[test]
    fn test_late_date_from_details_is_checked_once() {
        let mut surface = EventSurface::open(event(None), now(), CLOSE);
        let id = surface.begin_details_fetch();
        let last_month = Some(Timestamp::from_datetime(now() - ChronoDuration::days(30)));
        surface.apply_details(id, Ok(details(AttendanceStatus::Pending, last_month)));
        assert!(surface.is_event_passed());
    }

    #[test]
    fn test_details_date_in_past_locks_despite_future_card() {
        let mut surface = EventSurface::open(event(next_week()), now(), CLOSE);
        assert!(!surface.is_event_passed());
        let id = surface.begin_details_fetch();
        let yesterday = Some(Timestamp::from_datetime(now() - ChronoDuration::days(1)));
        surface.apply_details(id, Ok(details(AttendanceStatus::Pending, yesterday)));
        assert_eq!(surface.rsvp_view(), RsvpView::PastEvent);
        assert_eq!(surface.request_confirm(), Err(RsvpRejected::EventPassed));
    }

    #[test]
    fn test_reconcile_payload_is_not_rechecked() {
        let mut surface = loaded(next_week());
        let id = surface.begin_details_fetch();
        let last_month = Some(Timestamp::from_datetime(now() - ChronoDuration::days(30)));
        surface.apply_details(id, Ok(details(AttendanceStatus::Pending, last_month)));
        assert!(!surface.is_event_passed());
    }

    #[test]
    fn test_unparseable_date_is_not_past() {
        let surface = loaded(Some(Timestamp::parse("el próximo martes")));
        assert!(!surface.is_event_passed());
        assert!(matches!(surface.rsvp_view(), RsvpView::Actions { .. }));
    }

    #[test]
    fn test_actions_wait_for_details() {
        let mut surface = EventSurface::open(event(next_week()), now(), CLOSE);
        assert_eq!(surface.rsvp_view(), RsvpView::Waiting);
        assert_eq!(surface.request_confirm(), Err(RsvpRejected::NotReady));
    }

    #[test]
    fn test_server_status_renders_badge() {
        let mut surface = EventSurface::open(event(next_week()), now(), CLOSE);
        let id = surface.begin_details_fetch();
        surface.apply_details(id, Ok(details(AttendanceStatus::Declined, next_week())));
        assert_eq!(surface.rsvp_view(), RsvpView::Responded(AttendanceStatus::Declined));
    }

    #[test]
    fn test_failed_submission_then_retry_same_status() {
        let mut surface = loaded(next_week());
        let attempt = surface
            .request_decline_or_maybe(AttendanceStatus::Declined, Some("viaje"))
            .unwrap();
        let failed: StoreResult<()> = Err(StoreError::Rejected("success=false".into()));
        assert!(!surface.attendance_settled(surface.id(), &attempt, &failed, Instant::now()));

        match surface.rsvp_view() {
            RsvpView::Actions { failure: Some(f), submitting: false } => {
                assert_eq!(f.attempt.target, AttendanceStatus::Declined);
            }
            other => panic!("unexpected view {other:?}"),
        }
        let again = surface.retry().unwrap();
        assert_eq!(again.target, AttendanceStatus::Declined);
        assert_eq!(again.notes.as_deref(), Some("viaje"));
        assert!(surface.close_at().is_none());
    }

    #[test]
    fn test_details_for_other_surface_are_dropped() {
        let mut first = EventSurface::open(event(next_week()), now(), CLOSE);
        let stale = first.begin_details_fetch();
        let mut second = EventSurface::open(event(next_week()), now(), CLOSE);
        second.begin_details_fetch();

        assert!(!second.apply_details(stale, Ok(details(AttendanceStatus::Pending, None))));
        assert_eq!(second.details(), &DetailsState::Loading);
    }

    #[test]
    fn test_failed_reconcile_keeps_estimate() {
        let mut surface = loaded(next_week());
        let attempt = surface.request_confirm().unwrap();
        surface.attendance_settled(surface.id(), &attempt, &Ok(()), Instant::now());

        let id = surface.begin_details_fetch();
        surface.apply_details(id, Err(StoreError::Unavailable("down".into())));
        assert_eq!(surface.counts().unwrap().confirmed_count, 4);
    }

    #[test]
    fn test_failed_fetch_can_be_retried() {
        let mut surface = EventSurface::open(event(next_week()), now(), CLOSE);
        let id = surface.begin_details_fetch();
        surface.apply_details(id, Err(StoreError::Unavailable("down".into())));
        assert!(surface.can_retry_details());

        let id = surface.begin_details_fetch();
        assert_eq!(surface.details(), &DetailsState::Loading);
        surface.apply_details(id, Ok(details(AttendanceStatus::Pending, None)));
        assert!(surface.loaded_details().is_some());
    }

    #[test]
    fn test_metadata_rows_skip_absent_fields() {
        let surface = EventSurface::open(event(None), now(), CLOSE);
        assert_eq!(surface.metadata_rows(&Utc), vec![("Lugar", "Aula magna".to_string())]);
        assert_eq!(surface.description(), None);
    }
}
