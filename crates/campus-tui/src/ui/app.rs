use std::time::{Duration, Instant};

use chrono::Utc;

use campus_core::config::CoreConfig;
use campus_core::constants::PAST_EVENT_NOTICE;
use campus_core::events::CoreEvent;
use campus_core::models::AttendanceStatus;
use campus_core::runtime::NotificationCenter;
use campus_core::session::Session;
use campus_core::store::{AttendanceAttempt, EventSurface, NotificationList, RsvpRejected};

use crate::ui::toasts::{Toast, ToastQueue};

/// Free-text notes collected before a `maybe` or `declined` submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesPrompt {
    pub target: AttendanceStatus,
    pub text: String,
}

pub struct App {
    pub running: bool,
    /// First Ctrl+C arms, second quits
    pub pending_quit: bool,
    pub list: NotificationList,
    pub selected: usize,
    pub surface: Option<EventSurface>,
    pub notes: Option<NotesPrompt>,
    pub toasts: ToastQueue,
    pub session: Option<Session>,
    center: NotificationCenter,
    page_size: usize,
    auto_close: Duration,
}

impl App {
    pub fn new(center: NotificationCenter, config: &CoreConfig, session: Option<Session>) -> Self {
        Self {
            running: true,
            pending_quit: false,
            list: NotificationList::new(config.classifier()),
            selected: 0,
            surface: None,
            notes: None,
            toasts: ToastQueue::new(),
            session,
            center,
            page_size: config.page_size,
            auto_close: config.auto_close(),
        }
    }

    pub fn quit(&mut self) {
        self.list.unmount();
        self.running = false;
    }

    // ===== Panel =====

    /// Mount (if needed) and fetch both the page and the badge count.
    pub fn reload(&mut self) {
        let scope = self.list.begin_load();
        self.center.load(scope, self.page_size);
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.list.items().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.list.items().len().saturating_sub(1));
    }

    fn selected_id(&self) -> Option<String> {
        self.list.items().get(self.selected).map(|n| n.id.clone())
    }

    /// Marks the row read and, for event notifications, opens the event surface.
    pub fn activate_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Some(mutation) = self.list.mark_read(&id) {
            self.center.submit_mutation(self.list.scope(), mutation);
        }
        let Some(notification) = self.list.get(&id).cloned() else {
            return;
        };
        if self.list.is_event(&notification) {
            let surface = EventSurface::open(notification, Utc::now(), self.auto_close);
            self.surface = Some(surface);
            self.fetch_details();
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Some(mutation) = self.list.remove(&id) {
            self.center.submit_mutation(self.list.scope(), mutation);
            self.clamp_selection();
        }
    }

    pub fn mark_all_read(&mut self) {
        let mutation = self.list.mark_all_read();
        self.center.submit_mutation(self.list.scope(), mutation);
    }

    // ===== Event surface =====

    fn fetch_details(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            let id = surface.begin_details_fetch();
            self.center
                .fetch_event_details(id, surface.event_id().to_string());
        }
    }

    pub fn close_surface(&mut self) {
        self.notes = None;
        self.surface = None;
    }

    /// `confirmed` submits straight away; the other two ask for notes first.
    pub fn choose_response(&mut self, target: AttendanceStatus) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        if target.accepts_notes() {
            if surface.machine().can_respond() && surface.loaded_details().is_some() {
                self.notes = Some(NotesPrompt {
                    target,
                    text: String::new(),
                });
            }
            return;
        }
        let result = self.surface.as_mut().map(|s| s.request(target, None));
        self.dispatch_attempt(result);
    }

    pub fn submit_notes(&mut self) {
        let Some(prompt) = self.notes.take() else {
            return;
        };
        let result = self
            .surface
            .as_mut()
            .map(|s| s.request_decline_or_maybe(prompt.target, Some(&prompt.text)));
        self.dispatch_attempt(result);
    }

    pub fn cancel_notes(&mut self) {
        self.notes = None;
    }

    /// Retry whatever failed on the surface: the details fetch or the last submission.
    pub fn retry_surface(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if surface.can_retry_details() {
            self.fetch_details();
            return;
        }
        let result = surface.retry();
        self.dispatch_attempt(Some(result));
    }

    fn dispatch_attempt(&mut self, result: Option<Result<AttendanceAttempt, RsvpRejected>>) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        match result {
            Some(Ok(attempt)) => self.center.register_attendance(surface.id(), attempt),
            Some(Err(RsvpRejected::NotReady)) => {
                self.toasts.push(Toast::info("Cargando detalles del evento…"));
            }
            Some(Err(RsvpRejected::EventPassed)) => {
                self.toasts.push(Toast::warning(PAST_EVENT_NOTICE));
            }
            Some(Err(rejected)) => tracing::debug!(%rejected, "rsvp action ignored"),
            None => {}
        }
    }

    // ===== Loop hooks =====

    pub fn handle_core_event(&mut self, event: CoreEvent) {
        match event {
            CoreEvent::NotificationsLoaded { scope, result } => {
                if self.list.apply_notifications(scope, result) {
                    self.clamp_selection();
                }
            }
            CoreEvent::UnreadCountLoaded { scope, result } => {
                self.list.apply_unread_count(scope, result);
            }
            CoreEvent::MutationSettled {
                scope,
                mutation,
                result,
            } => {
                self.list.settle(scope, mutation, result);
                self.clamp_selection();
            }
            CoreEvent::EventDetailsLoaded { surface, result } => {
                if let Some(current) = self.surface.as_mut() {
                    current.apply_details(surface, result);
                }
            }
            CoreEvent::AttendanceSettled {
                surface,
                attempt,
                result,
            } => {
                let Some(current) = self.surface.as_mut() else {
                    return;
                };
                if current.attendance_settled(surface, &attempt, &result, Instant::now()) {
                    self.toasts.push(Toast::success(format!(
                        "Respuesta registrada: {}",
                        attempt.target.label()
                    )));
                    self.fetch_details();
                }
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if !self.toasts.is_empty() {
            self.toasts.tick(now);
        }
        if self.surface.as_ref().is_some_and(|s| s.should_close(now)) {
            self.close_surface();
        }
    }

    pub fn identity(&self) -> String {
        match &self.session {
            Some(s) => format!("{} · {}", s.display_name, s.role.label()),
            None => "Sin sesión".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::api::{MemoryNotificationStore, StoreOp};
    use campus_core::store::{DetailsState, RsvpView};
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn app() -> (App, UnboundedReceiver<CoreEvent>, Arc<MemoryNotificationStore>) {
        let memory = Arc::new(MemoryNotificationStore::demo(Utc::now()));
        let (center, rx) = NotificationCenter::new(memory.clone());
        let config = CoreConfig {
            data_dir: std::env::temp_dir(),
            ..CoreConfig::default()
        };
        (App::new(center, &config, None), rx, memory)
    }

    async fn pump(app: &mut App, rx: &mut UnboundedReceiver<CoreEvent>, n: usize) {
        for _ in 0..n {
            let event = rx.recv().await.unwrap();
            app.handle_core_event(event);
        }
    }

    fn select(app: &mut App, id: &str) {
        app.selected = app.list.items().iter().position(|n| n.id == id).unwrap();
    }

    #[tokio::test]
    async fn test_opening_plain_row_marks_read() {
        let (mut app, mut rx, memory) = app();
        app.reload();
        pump(&mut app, &mut rx, 2).await;
        assert_eq!(app.list.unread_count(), 3);

        select(&mut app, "102");
        app.activate_selected();
        assert!(app.surface.is_none());
        assert_eq!(app.list.unread_count(), 2);
        pump(&mut app, &mut rx, 1).await;
        assert!(memory.notification("102").unwrap().read);
    }

    #[tokio::test]
    async fn test_event_row_opens_surface_and_confirms() {
        let (mut app, mut rx, _) = app();
        app.reload();
        pump(&mut app, &mut rx, 2).await;

        select(&mut app, "101");
        app.activate_selected();
        assert!(app.surface.is_some());
        // mark-read answer and details answer, in either order
        pump(&mut app, &mut rx, 2).await;
        let surface = app.surface.as_ref().unwrap();
        assert!(matches!(surface.details(), DetailsState::Loaded(_)));

        app.choose_response(AttendanceStatus::Confirmed);
        pump(&mut app, &mut rx, 1).await;
        let surface = app.surface.as_ref().unwrap();
        assert_eq!(surface.rsvp_view(), RsvpView::Responded(AttendanceStatus::Confirmed));
        assert!(app.toasts.current().is_some());

        // reconcile fetch
        pump(&mut app, &mut rx, 1).await;
        let close_at = app.surface.as_ref().unwrap().close_at().unwrap();
        app.tick(close_at);
        assert!(app.surface.is_none());
    }

    #[tokio::test]
    async fn test_maybe_goes_through_notes_prompt() {
        let (mut app, mut rx, memory) = app();
        app.reload();
        pump(&mut app, &mut rx, 2).await;
        select(&mut app, "101");
        app.activate_selected();
        pump(&mut app, &mut rx, 2).await;

        app.choose_response(AttendanceStatus::Maybe);
        assert_eq!(app.notes.as_ref().unwrap().target, AttendanceStatus::Maybe);
        app.notes.as_mut().unwrap().text.push_str("  depende del horario ");
        app.submit_notes();
        assert!(app.notes.is_none());
        pump(&mut app, &mut rx, 1).await;

        let registration = memory.registration("101").unwrap();
        assert_eq!(registration.status, AttendanceStatus::Maybe);
        assert_eq!(registration.notes.as_deref(), Some("depende del horario"));
    }

    #[tokio::test]
    async fn test_past_event_offers_no_actions() {
        let (mut app, mut rx, memory) = app();
        app.reload();
        pump(&mut app, &mut rx, 2).await;
        select(&mut app, "104");
        app.activate_selected();
        pump(&mut app, &mut rx, 1).await;

        assert_eq!(app.surface.as_ref().unwrap().rsvp_view(), RsvpView::PastEvent);
        app.choose_response(AttendanceStatus::Confirmed);
        app.choose_response(AttendanceStatus::Declined);
        assert!(app.notes.is_none());
        assert!(app.toasts.current().is_some());
        assert_eq!(memory.calls(StoreOp::RegisterAttendance), 0);
    }

    #[tokio::test]
    async fn test_failed_rsvp_retry_resubmits() {
        let (mut app, mut rx, memory) = app();
        app.reload();
        pump(&mut app, &mut rx, 2).await;
        select(&mut app, "101");
        app.activate_selected();
        pump(&mut app, &mut rx, 2).await;

        memory.fail(StoreOp::RegisterAttendance);
        app.choose_response(AttendanceStatus::Confirmed);
        pump(&mut app, &mut rx, 1).await;
        assert!(matches!(
            app.surface.as_ref().unwrap().rsvp_view(),
            RsvpView::Actions { failure: Some(_), .. }
        ));

        memory.recover(StoreOp::RegisterAttendance);
        app.retry_surface();
        pump(&mut app, &mut rx, 1).await;
        assert_eq!(memory.calls(StoreOp::RegisterAttendance), 2);
        assert_eq!(
            memory.registration("101").unwrap().status,
            AttendanceStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn test_delete_keeps_selection_in_bounds() {
        let (mut app, mut rx, _) = app();
        app.reload();
        pump(&mut app, &mut rx, 2).await;
        app.selected = app.list.items().len() - 1;
        app.delete_selected();
        assert_eq!(app.selected, app.list.items().len() - 1);
        app.move_selection(10);
        assert_eq!(app.selected, app.list.items().len() - 1);
        app.move_selection(-10);
        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn test_answers_after_quit_are_dropped() {
        let (mut app, mut rx, _) = app();
        app.reload();
        app.quit();
        pump(&mut app, &mut rx, 2).await;
        assert!(app.list.items().is_empty());
    }
}
