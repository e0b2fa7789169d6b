use crate::api::StoreResult;
use crate::classifier::EventClassifier;
use crate::models::Notification;

/// Identifies one mount of the notification panel. Answers tagged with an
/// older scope belong to a panel that has since closed and are discarded.
pub type Scope = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// An optimistic change already applied locally, waiting on the store.
///
/// Each variant carries what is needed to undo exactly that change. The
/// revisions record which server snapshot the change was made against, so a
/// rollback never clobbers data from a newer load.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingMutation {
    MarkRead {
        id: String,
        decremented: bool,
        list_revision: u64,
        count_revision: u64,
    },
    MarkAllRead {
        flipped: Vec<String>,
        previous_count: u64,
        list_revision: u64,
        count_revision: u64,
    },
    Remove {
        index: usize,
        item: Notification,
        decremented: bool,
        list_revision: u64,
        count_revision: u64,
    },
}

impl PendingMutation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MarkRead { .. } => "mark_read",
            Self::MarkAllRead { .. } => "mark_all_read",
            Self::Remove { .. } => "remove",
        }
    }
}

/// A row ready for rendering: the notification plus the classifier's verdict.
#[derive(Debug, Clone, Copy)]
pub struct ListEntry<'a> {
    pub notification: &'a Notification,
    pub is_event: bool,
}

/// Owner of the notification list and the unread badge.
///
/// No other component mutates either; the event surface and the front ends go
/// through these methods. Reads, deletions and mark-all are applied locally
/// first and rolled back if the store refuses them.
#[derive(Debug)]
pub struct NotificationList {
    items: Vec<Notification>,
    unread_count: u64,
    list_state: LoadState,
    count_state: LoadState,
    scope: Scope,
    mounted: bool,
    list_revision: u64,
    count_revision: u64,
    classifier: EventClassifier,
}

impl NotificationList {
    pub fn new(classifier: EventClassifier) -> Self {
        Self {
            items: Vec::new(),
            unread_count: 0,
            list_state: LoadState::Idle,
            count_state: LoadState::Idle,
            scope: 0,
            mounted: false,
            list_revision: 0,
            count_revision: 0,
            classifier,
        }
    }

    // ===== Lifetime =====

    pub fn mount(&mut self) -> Scope {
        self.scope += 1;
        self.mounted = true;
        self.scope
    }

    /// Anything still in flight for the current scope will be dropped on arrival.
    pub fn unmount(&mut self) {
        self.scope += 1;
        self.mounted = false;
        self.list_state = LoadState::Idle;
        self.count_state = LoadState::Idle;
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn accepts(&self, scope: Scope, what: &str) -> bool {
        if self.mounted && scope == self.scope {
            return true;
        }
        tracing::debug!(scope, current = self.scope, what, "discarding stale answer");
        false
    }

    // ===== Getters =====

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn unread_count(&self) -> u64 {
        self.unread_count
    }

    pub fn list_state(&self) -> &LoadState {
        &self.list_state
    }

    pub fn count_state(&self) -> &LoadState {
        &self.count_state
    }

    pub fn is_loading(&self) -> bool {
        self.list_state.is_loading() || self.count_state.is_loading()
    }

    /// A manual reload makes sense once either half has failed.
    pub fn can_retry(&self) -> bool {
        self.list_state.error().is_some() || self.count_state.error().is_some()
    }

    pub fn classifier(&self) -> &EventClassifier {
        &self.classifier
    }

    pub fn is_event(&self, notification: &Notification) -> bool {
        self.classifier.classify(notification).is_event
    }

    pub fn entries(&self) -> impl Iterator<Item = ListEntry<'_>> {
        self.items.iter().map(|n| ListEntry {
            notification: n,
            is_event: self.classifier.classify(n).is_event,
        })
    }

    // ===== Loading =====

    /// Mark both halves as loading; the caller issues both fetches with the returned scope.
    pub fn begin_load(&mut self) -> Scope {
        if !self.mounted {
            self.mount();
        }
        self.list_state = LoadState::Loading;
        self.count_state = LoadState::Loading;
        self.scope
    }

    pub fn apply_notifications(
        &mut self,
        scope: Scope,
        result: StoreResult<Vec<Notification>>,
    ) -> bool {
        if !self.accepts(scope, "notifications") {
            return false;
        }
        match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "notifications applied");
                self.items = items;
                self.list_revision += 1;
                self.list_state = LoadState::Loaded;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch notifications");
                self.list_state = LoadState::Failed(err.user_message().to_string());
            }
        }
        true
    }

    pub fn apply_unread_count(&mut self, scope: Scope, result: StoreResult<u64>) -> bool {
        if !self.accepts(scope, "unread_count") {
            return false;
        }
        match result {
            Ok(count) => {
                self.unread_count = count;
                self.count_revision += 1;
                self.count_state = LoadState::Loaded;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch unread count");
                self.count_state = LoadState::Failed(err.user_message().to_string());
            }
        }
        true
    }

    // ===== Optimistic mutations =====

    /// Returns `None` when there is nothing to do (unknown id or already read),
    /// in which case no store call is needed.
    pub fn mark_read(&mut self, id: &str) -> Option<PendingMutation> {
        let item = self.items.iter_mut().find(|n| n.id == id)?;
        if item.read {
            return None;
        }
        item.read = true;
        let decremented = self.decrement_unread();
        Some(PendingMutation::MarkRead {
            id: id.to_string(),
            decremented,
            list_revision: self.list_revision,
            count_revision: self.count_revision,
        })
    }

    /// Always yields a mutation: the store call is issued even when nothing is unread.
    pub fn mark_all_read(&mut self) -> PendingMutation {
        let flipped = self
            .items
            .iter_mut()
            .filter(|n| !n.read)
            .map(|n| {
                n.read = true;
                n.id.clone()
            })
            .collect();
        let previous_count = std::mem::take(&mut self.unread_count);
        PendingMutation::MarkAllRead {
            flipped,
            previous_count,
            list_revision: self.list_revision,
            count_revision: self.count_revision,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<PendingMutation> {
        let index = self.items.iter().position(|n| n.id == id)?;
        let item = self.items.remove(index);
        let decremented = if item.read {
            false
        } else {
            self.decrement_unread()
        };
        Some(PendingMutation::Remove {
            index,
            item,
            decremented,
            list_revision: self.list_revision,
            count_revision: self.count_revision,
        })
    }

    /// Apply the store's answer to an optimistic change. Failures undo the change.
    pub fn settle(&mut self, scope: Scope, mutation: PendingMutation, result: StoreResult<()>) {
        if !self.accepts(scope, mutation.label()) {
            return;
        }
        match result {
            Ok(()) => tracing::debug!(mutation = mutation.label(), "mutation confirmed"),
            Err(err) => {
                tracing::warn!(
                    mutation = mutation.label(),
                    error = %err,
                    "mutation failed, rolling back"
                );
                self.rollback(mutation);
            }
        }
    }

    fn rollback(&mut self, mutation: PendingMutation) {
        match mutation {
            PendingMutation::MarkRead {
                id,
                decremented,
                list_revision,
                count_revision,
            } => {
                if list_revision == self.list_revision {
                    if let Some(item) = self.items.iter_mut().find(|n| n.id == id) {
                        item.read = false;
                    }
                }
                if decremented && count_revision == self.count_revision {
                    self.unread_count += 1;
                }
            }
            PendingMutation::MarkAllRead {
                flipped,
                previous_count,
                list_revision,
                count_revision,
            } => {
                if list_revision == self.list_revision {
                    for item in self.items.iter_mut().filter(|n| flipped.contains(&n.id)) {
                        item.read = false;
                    }
                }
                if count_revision == self.count_revision {
                    self.unread_count += previous_count;
                }
            }
            PendingMutation::Remove {
                index,
                item,
                decremented,
                list_revision,
                count_revision,
            } => {
                if list_revision == self.list_revision && self.get(&item.id).is_none() {
                    let index = index.min(self.items.len());
                    self.items.insert(index, item);
                }
                if decremented && count_revision == self.count_revision {
                    self.unread_count += 1;
                }
            }
        }
    }

    /// Returns whether the count actually moved (it never goes below zero).
    fn decrement_unread(&mut self) -> bool {
        if self.unread_count == 0 {
            return false;
        }
        self.unread_count -= 1;
        true
    }
}

impl Default for NotificationList {
    fn default() -> Self {
        Self::new(EventClassifier::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StoreError;
    use crate::models::{NotificationType, Timestamp};

    fn item(id: &str, read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            title: format!("Aviso {id}"),
            message: String::new(),
            kind: NotificationType::Info,
            priority: None,
            read,
            created_at: Timestamp::default(),
            metadata: None,
        }
    }

    fn loaded(items: Vec<Notification>, unread: u64) -> NotificationList {
        let mut list = NotificationList::default();
        let scope = list.begin_load();
        list.apply_notifications(scope, Ok(items));
        list.apply_unread_count(scope, Ok(unread));
        list
    }

    fn failure() -> StoreResult<()> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    #[test]
    fn test_badge_follows_first_click() {
        let mut list = loaded(vec![item("a", false), item("b", false), item("c", true)], 2);
        assert_eq!(list.unread_count(), 2);

        assert!(list.mark_read("a").is_some());
        assert!(list.get("a").unwrap().read);
        assert_eq!(list.unread_count(), 1);
    }

    #[test]
    fn test_clicking_read_row_needs_no_call() {
        let mut list = loaded(vec![item("c", true)], 0);
        assert!(list.mark_read("c").is_none());
        assert!(list.mark_read("missing").is_none());
    }

    #[test]
    fn test_partial_load_failure_applies_other_half() {
        let mut list = NotificationList::default();
        let scope = list.begin_load();
        assert!(list.is_loading());

        list.apply_unread_count(scope, Ok(5));
        list.apply_notifications(scope, Err(StoreError::Unavailable("down".into())));

        assert_eq!(list.unread_count(), 5);
        assert_eq!(list.count_state(), &LoadState::Loaded);
        assert!(list.list_state().error().is_some());
        assert!(list.can_retry());
        assert!(!list.is_loading());
    }

    #[test]
    fn test_unread_never_negative() {
        // Server count lags behind the list: one unread item but a zero badge.
        let mut list = loaded(vec![item("a", false), item("b", false)], 0);
        let m = list.mark_read("a").unwrap();
        assert_eq!(list.unread_count(), 0);
        assert!(matches!(m, PendingMutation::MarkRead { decremented: false, .. }));
        list.remove("b");
        assert_eq!(list.unread_count(), 0);
    }

    #[test]
    fn test_remove_unread_decrements() {
        let mut list = loaded(vec![item("a", false), item("b", true)], 1);
        list.remove("b");
        assert_eq!(list.unread_count(), 1);
        list.remove("a");
        assert_eq!(list.unread_count(), 0);
        assert!(list.items().is_empty());
    }

    #[test]
    fn test_mark_all_twice_is_stable() {
        let mut list = loaded(vec![item("a", false), item("b", false)], 2);
        let first = list.mark_all_read();
        assert!(list.items().iter().all(|n| n.read));
        assert_eq!(list.unread_count(), 0);

        let second = list.mark_all_read();
        assert!(list.items().iter().all(|n| n.read));
        assert_eq!(list.unread_count(), 0);
        assert!(matches!(first, PendingMutation::MarkAllRead { ref flipped, .. } if flipped.len() == 2));
        assert!(matches!(second, PendingMutation::MarkAllRead { ref flipped, previous_count: 0, .. } if flipped.is_empty()));
    }

    #[test]
    fn test_failed_mark_read_rolls_back() {
        let mut list = loaded(vec![item("a", false)], 1);
        let scope = list.scope();
        let m = list.mark_read("a").unwrap();
        list.settle(scope, m, failure());
        assert!(!list.get("a").unwrap().read);
        assert_eq!(list.unread_count(), 1);
    }

    #[test]
    fn test_failed_remove_restores_position() {
        let mut list = loaded(vec![item("a", true), item("b", false), item("c", true)], 1);
        let scope = list.scope();
        let m = list.remove("b").unwrap();
        assert_eq!(list.unread_count(), 0);
        list.settle(scope, m, failure());
        let ids: Vec<_> = list.items().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(list.unread_count(), 1);
    }

    #[test]
    fn test_failed_mark_all_restores_flags_and_count() {
        let mut list = loaded(vec![item("a", false), item("b", true)], 1);
        let scope = list.scope();
        let m = list.mark_all_read();
        list.settle(scope, m, failure());
        assert!(!list.get("a").unwrap().read);
        assert!(list.get("b").unwrap().read);
        assert_eq!(list.unread_count(), 1);
    }

    #[test]
    fn test_rollback_does_not_touch_newer_load() {
        let mut list = loaded(vec![item("a", false)], 1);
        let scope = list.scope();
        let m = list.remove("a").unwrap();

        // A reload lands before the delete fails.
        let reload = list.begin_load();
        list.apply_notifications(reload, Ok(vec![item("z", false)]));
        list.apply_unread_count(reload, Ok(1));

        list.settle(scope, m, failure());
        let ids: Vec<_> = list.items().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["z"]);
        assert_eq!(list.unread_count(), 1);
    }

    #[test]
    fn test_failed_mark_read_keeps_newer_server_flag() {
        let mut list = loaded(vec![item("a", false)], 1);
        let scope = list.scope();
        let m = list.mark_read("a").unwrap();

        // The server already has it read by the time the call fails.
        let reload = list.begin_load();
        list.apply_notifications(reload, Ok(vec![item("a", true)]));
        list.apply_unread_count(reload, Ok(0));

        list.settle(scope, m, failure());
        assert!(list.get("a").unwrap().read);
        assert_eq!(list.unread_count(), 0);
    }

    #[test]
    fn test_answers_after_unmount_are_discarded() {
        let mut list = NotificationList::default();
        let scope = list.begin_load();
        list.unmount();

        assert!(!list.apply_notifications(scope, Ok(vec![item("a", false)])));
        assert!(!list.apply_unread_count(scope, Ok(9)));
        assert!(list.items().is_empty());
        assert_eq!(list.unread_count(), 0);

        let fresh = list.begin_load();
        assert_ne!(fresh, scope);
        assert!(list.apply_unread_count(fresh, Ok(3)));
    }

    #[test]
    fn test_entries_dispatch_through_classifier() {
        let mut event = item("e", false);
        event.kind = NotificationType::Event;
        let list = loaded(vec![event, item("p", false)], 2);
        let flags: Vec<_> = list.entries().map(|e| e.is_event).collect();
        assert_eq!(flags, [true, false]);
    }
}
