//! Notification store: the backend that owns notifications and attendance
//! registrations. The client only ever talks to it through this trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::constants::GENERIC_ERROR_MESSAGE;
use crate::models::{EventDetails, Notification, RegisterAttendanceRequest};

pub mod http;
pub mod memory;

pub use http::HttpNotificationStore;
pub use memory::{MemoryNotificationStore, StoreOp};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("server rejected the request: {0}")]
    Rejected(String),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Every failure surfaces to the user as the same message; the variant is
    /// for logs only.
    pub fn user_message(&self) -> &'static str {
        GENERIC_ERROR_MESSAGE
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn list_notifications(&self, limit: usize) -> StoreResult<Vec<Notification>>;
    async fn unread_count(&self) -> StoreResult<u64>;
    async fn mark_read(&self, id: &str) -> StoreResult<()>;
    async fn mark_all_read(&self) -> StoreResult<()>;
    async fn delete_notification(&self, id: &str) -> StoreResult<()>;
    async fn event_details(&self, event_id: &str) -> StoreResult<EventDetails>;
    async fn register_attendance(&self, request: &RegisterAttendanceRequest) -> StoreResult<()>;
}
