pub mod attendance;
pub mod event_details;
pub mod notification;
pub mod timestamp;
pub mod wire;

pub use attendance::{AttendanceRegistration, AttendanceStatus, RegisterAttendanceRequest};
pub use event_details::{AttendanceCounts, EventDetails};
pub use notification::{Notification, NotificationMetadata, NotificationType, Priority};
pub use timestamp::Timestamp;
