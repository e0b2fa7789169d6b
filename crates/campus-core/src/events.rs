use crate::api::StoreResult;
use crate::models::{EventDetails, Notification};
use crate::store::{AttendanceAttempt, PendingMutation, Scope, SurfaceId};

/// Store answers delivered back to the UI loop. Each one carries the scope or
/// surface it was issued for so the receiver can drop stale ones.
#[derive(Debug)]
pub enum CoreEvent {
    NotificationsLoaded {
        scope: Scope,
        result: StoreResult<Vec<Notification>>,
    },
    UnreadCountLoaded {
        scope: Scope,
        result: StoreResult<u64>,
    },
    MutationSettled {
        scope: Scope,
        mutation: PendingMutation,
        result: StoreResult<()>,
    },
    EventDetailsLoaded {
        surface: SurfaceId,
        result: StoreResult<EventDetails>,
    },
    AttendanceSettled {
        surface: SurfaceId,
        attempt: AttendanceAttempt,
        result: StoreResult<()>,
    },
}
