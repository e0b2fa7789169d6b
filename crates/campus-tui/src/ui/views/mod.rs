pub mod event_modal;
pub mod notification_list;

pub use event_modal::render_event_modal;
pub use notification_list::{render_header, render_notification_list};
