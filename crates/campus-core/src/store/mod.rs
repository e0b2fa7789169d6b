//! Client-side state: the notification list, the event surface and the
//! per-event attendance machine. Nothing here performs I/O; the runtime feeds
//! store answers back in through the `apply_*`/`settle` methods.

pub mod attendance;
pub mod event_surface;
pub mod notification_list;

pub use attendance::{AttendanceAttempt, AttendanceMachine, RsvpFailure, RsvpRejected};
pub use event_surface::{DetailsState, EventSurface, RsvpView, SurfaceId};
pub use notification_list::{ListEntry, LoadState, NotificationList, PendingMutation, Scope};
