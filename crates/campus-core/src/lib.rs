pub mod api;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod events;
pub mod format;
pub mod models;
pub mod runtime;
pub mod session;
pub mod store;
pub mod tracing_setup;

pub use api::{HttpNotificationStore, MemoryNotificationStore, NotificationStore, StoreError};
pub use classifier::EventClassifier;
pub use config::CoreConfig;
pub use events::CoreEvent;
pub use runtime::NotificationCenter;
pub use session::{AuthContext, Session, UserRole};
