use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{NotificationStore, StoreError, StoreResult};
use crate::constants::paths;
use crate::models::{EventDetails, Notification, RegisterAttendanceRequest};

/// `{ success, data?, message? }` wrapper used by every endpoint except event details.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnreadCount {
    unread_count: u64,
}

/// Event details come back bare (possibly with a top-level `success` flag),
/// but some deployments wrap them like the rest. Bare is tried first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetailsPayload {
    Bare(EventDetails),
    Wrapped(Envelope<EventDetails>),
}

/// REST client for the notification backend
pub struct HttpNotificationStore {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpNotificationStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(base_url, token, reqwest::Client::new())
    }

    pub fn with_client(
        base_url: impl Into<String>,
        token: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> StoreResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn call<T: DeserializeOwned>(&self, builder: RequestBuilder) -> StoreResult<Option<T>> {
        let body = self.send(builder).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            let reason = envelope
                .message
                .or(envelope.error)
                .unwrap_or_else(|| "success=false".to_string());
            return Err(StoreError::Rejected(reason));
        }
        Ok(envelope.data)
    }

    async fn call_unit(&self, builder: RequestBuilder) -> StoreResult<()> {
        self.call::<serde_json::Value>(builder).await.map(|_| ())
    }
}

#[async_trait]
impl NotificationStore for HttpNotificationStore {
    async fn list_notifications(&self, limit: usize) -> StoreResult<Vec<Notification>> {
        let builder = self
            .request(Method::GET, paths::NOTIFICATIONS)
            .query(&[("limit", limit)]);
        let data: Option<Vec<Notification>> = self.call(builder).await?;
        let notifications = data.unwrap_or_default();
        tracing::debug!(count = notifications.len(), limit, "fetched notifications");
        Ok(notifications)
    }

    async fn unread_count(&self) -> StoreResult<u64> {
        let data: Option<UnreadCount> = self
            .call(self.request(Method::GET, paths::UNREAD_COUNT))
            .await?;
        data.map(|d| d.unread_count)
            .ok_or_else(|| StoreError::Rejected("missing unread_count".to_string()))
    }

    async fn mark_read(&self, id: &str) -> StoreResult<()> {
        self.call_unit(self.request(Method::POST, &paths::mark_read(id)))
            .await
    }

    async fn mark_all_read(&self) -> StoreResult<()> {
        self.call_unit(self.request(Method::POST, paths::MARK_ALL_READ))
            .await
    }

    async fn delete_notification(&self, id: &str) -> StoreResult<()> {
        self.call_unit(self.request(Method::DELETE, &paths::delete(id)))
            .await
    }

    async fn event_details(&self, event_id: &str) -> StoreResult<EventDetails> {
        let body = self
            .send(self.request(Method::GET, &paths::event_details(event_id)))
            .await?;
        match serde_json::from_str::<DetailsPayload>(&body)? {
            DetailsPayload::Bare(details) => Ok(details),
            DetailsPayload::Wrapped(envelope) => match (envelope.success, envelope.data) {
                (true, Some(details)) => Ok(details),
                (_, _) => Err(StoreError::Rejected(
                    envelope
                        .message
                        .or(envelope.error)
                        .unwrap_or_else(|| "event details unavailable".to_string()),
                )),
            },
        }
    }

    async fn register_attendance(&self, request: &RegisterAttendanceRequest) -> StoreResult<()> {
        tracing::info!(
            event_id = %request.event_id,
            status = %request.status,
            "registering attendance"
        );
        self.call_unit(
            self.request(Method::POST, paths::REGISTER_ATTENDANCE)
                .json(request),
        )
        .await
    }
}
