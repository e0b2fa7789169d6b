use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{NotificationStore, StoreResult};
use crate::events::CoreEvent;
use crate::models::Notification;
use crate::store::{AttendanceAttempt, PendingMutation, Scope, SurfaceId};

/// Issues store calls in the background and reports each answer as a
/// [`CoreEvent`]. Cheap to clone; every clone feeds the same receiver.
#[derive(Clone)]
pub struct NotificationCenter {
    store: Arc<dyn NotificationStore>,
    events_tx: UnboundedSender<CoreEvent>,
}

impl NotificationCenter {
    pub fn new(store: Arc<dyn NotificationStore>) -> (Self, UnboundedReceiver<CoreEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (Self { store, events_tx }, events_rx)
    }

    pub fn store(&self) -> Arc<dyn NotificationStore> {
        self.store.clone()
    }

    /// Fetch the list and the unread count as two independent tasks; either
    /// may land first and a failure in one does not hold back the other.
    pub fn load(&self, scope: Scope, limit: usize) {
        let store = self.store.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.list_notifications(limit).await;
            emit(&tx, CoreEvent::NotificationsLoaded { scope, result });
        });

        let store = self.store.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.unread_count().await;
            emit(&tx, CoreEvent::UnreadCountLoaded { scope, result });
        });
    }

    pub fn submit_mutation(&self, scope: Scope, mutation: PendingMutation) {
        let store = self.store.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = run_mutation(store.as_ref(), &mutation).await;
            emit(&tx, CoreEvent::MutationSettled { scope, mutation, result });
        });
    }

    pub fn fetch_event_details(&self, surface: SurfaceId, event_id: String) {
        let store = self.store.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.event_details(&event_id).await;
            emit(&tx, CoreEvent::EventDetailsLoaded { surface, result });
        });
    }

    pub fn register_attendance(&self, surface: SurfaceId, attempt: AttendanceAttempt) {
        let store = self.store.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.register_attendance(&attempt.to_request()).await;
            emit(&tx, CoreEvent::AttendanceSettled { surface, attempt, result });
        });
    }
}

fn emit(tx: &UnboundedSender<CoreEvent>, event: CoreEvent) {
    if tx.send(event).is_err() {
        tracing::debug!("event receiver dropped, discarding store answer");
    }
}

/// The store call that confirms an optimistic mutation.
pub async fn run_mutation(
    store: &dyn NotificationStore,
    mutation: &PendingMutation,
) -> StoreResult<()> {
    match mutation {
        PendingMutation::MarkRead { id, .. } => store.mark_read(id).await,
        PendingMutation::MarkAllRead { .. } => store.mark_all_read().await,
        PendingMutation::Remove { item, .. } => store.delete_notification(&item.id).await,
    }
}

/// Both halves of a panel load, awaited together. Used by one-shot callers.
pub async fn load_once(
    store: &dyn NotificationStore,
    limit: usize,
) -> (StoreResult<Vec<Notification>>, StoreResult<u64>) {
    futures::join!(store.list_notifications(limit), store.unread_count())
}
