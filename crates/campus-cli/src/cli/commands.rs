use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, Utc};
use serde_json::{json, Value};

use campus_core::api::{NotificationStore, StoreError};
use campus_core::config::CoreConfig;
use campus_core::format::{format_event_date, relative_time_label};
use campus_core::models::{EventDetails, Notification, NotificationType};
use campus_core::runtime::load_once;
use campus_core::session::{AuthContext, Session, SessionError};
use campus_core::store::{EventSurface, NotificationList, RsvpRejected};

use super::protocol::{CliCommand, Response};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{0}")]
    Rsvp(#[from] RsvpRejected),

    #[error("no notification store configured for this command")]
    NoStore,
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(StoreError::NotFound(_)) => "not_found",
            Self::Store(_) => "store_error",
            Self::Session(_) => "session_error",
            Self::Rsvp(_) => "rsvp_rejected",
            Self::NoStore => "no_store",
        }
    }

    pub fn into_response(self) -> Response {
        Response::error(self.code(), &self.to_string())
    }
}

/// Everything a one-shot command may touch.
pub struct CommandContext {
    pub store: Option<Arc<dyn NotificationStore>>,
    pub auth: AuthContext,
    pub config: CoreConfig,
}

impl CommandContext {
    fn store(&self) -> Result<&dyn NotificationStore, CommandError> {
        self.store.as_deref().ok_or(CommandError::NoStore)
    }
}

pub async fn execute(command: CliCommand, ctx: &mut CommandContext) -> Result<Value, CommandError> {
    tracing::debug!(?command, "executing command");
    match command {
        CliCommand::List { limit } => {
            let limit = limit.unwrap_or(ctx.config.page_size);
            list(ctx, limit).await
        }
        CliCommand::Unread => {
            let count = ctx.store()?.unread_count().await?;
            Ok(json!({ "unreadCount": count }))
        }
        CliCommand::MarkRead { id } => {
            ctx.store()?.mark_read(&id).await?;
            Ok(json!({ "id": id, "read": true }))
        }
        CliCommand::MarkAllRead => {
            ctx.store()?.mark_all_read().await?;
            Ok(json!({ "markedAllRead": true }))
        }
        CliCommand::Delete { id } => {
            ctx.store()?.delete_notification(&id).await?;
            Ok(json!({ "deleted": id }))
        }
        CliCommand::Event { id } => {
            let details = ctx.store()?.event_details(&id).await?;
            Ok(event_json(&details))
        }
        CliCommand::Rsvp { id, status, notes } => {
            let store = ctx.store()?;
            let mut surface = open_surface(store, &id, &ctx.config).await?;

            let attempt = surface.request(status, notes.as_deref())?;
            let result = store.register_attendance(&attempt.to_request()).await;
            let registered =
                surface.attendance_settled(surface.id(), &attempt, &result, Instant::now());
            result?;

            // The local estimate stands if the reconcile fetch fails.
            if registered {
                let fetch = surface.begin_details_fetch();
                let reconciled = store.event_details(&id).await;
                surface.apply_details(fetch, reconciled);
            }
            Ok(json!({
                "eventId": id,
                "status": surface.status(),
                "counts": surface.counts(),
            }))
        }
        CliCommand::Login {
            user_id,
            name,
            role,
            token,
        } => {
            let session = Session {
                user_id,
                display_name: name,
                role,
                token,
            };
            ctx.auth.login(session)?;
            Ok(whoami(&ctx.auth))
        }
        CliCommand::Logout => {
            ctx.auth.logout()?;
            Ok(json!({ "signedIn": false }))
        }
        CliCommand::Whoami => Ok(whoami(&ctx.auth)),
    }
}

async fn list(ctx: &CommandContext, limit: usize) -> Result<Value, CommandError> {
    let (items, count) = load_once(ctx.store()?, limit).await;

    let mut panel = NotificationList::new(ctx.config.classifier());
    let scope = panel.begin_load();
    panel.apply_notifications(scope, items);
    if let Some(message) = panel.list_state().error() {
        tracing::warn!(%message, "notification list failed to load");
    }
    let unread = match count {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(error = %e, "unread count failed to load");
            None
        }
    };

    let now = Local::now();
    let notifications: Vec<Value> = panel
        .entries()
        .map(|entry| {
            let n = entry.notification;
            json!({
                "id": n.id,
                "title": n.title,
                "message": n.message,
                "type": n.kind,
                "priority": n.priority,
                "read": n.read,
                "createdAt": n.created_at,
                "age": relative_time_label(&n.created_at, now),
                "isEvent": entry.is_event,
            })
        })
        .collect();

    if let Some(message) = panel.list_state().error() {
        return Err(CommandError::Store(StoreError::Unavailable(message.to_string())));
    }
    Ok(json!({
        "unreadCount": unread,
        "notifications": notifications,
    }))
}

/// Build a surface for `event_id` and load its details, exactly as the panel
/// does when an event card is opened.
async fn open_surface(
    store: &dyn NotificationStore,
    event_id: &str,
    config: &CoreConfig,
) -> Result<EventSurface, CommandError> {
    let details = store.event_details(event_id).await?;
    let mut surface = EventSurface::open(notification_for(&details), Utc::now(), config.auto_close());
    let fetch = surface.begin_details_fetch();
    surface.apply_details(fetch, Ok(details));
    Ok(surface)
}

fn notification_for(details: &EventDetails) -> Notification {
    Notification {
        id: details.id.clone(),
        title: details.title.clone(),
        message: details.message.clone(),
        kind: NotificationType::Event,
        priority: None,
        read: true,
        created_at: Default::default(),
        metadata: details.metadata.clone(),
    }
}

fn event_json(details: &EventDetails) -> Value {
    let meta = details.metadata.as_ref();
    let date = meta.and_then(|m| m.date());
    json!({
        "id": details.id,
        "title": details.title,
        "message": details.message,
        "date": date.map(|d| format_event_date(d, &Local)),
        "location": meta.and_then(|m| m.location()),
        "type": meta.and_then(|m| m.event_kind()),
        "capacity": meta.and_then(|m| m.event_capacity),
        "description": meta.and_then(|m| m.description()),
        "isPast": date.is_some_and(|d| d.is_before(Utc::now())),
        "counts": details.counts,
        "userStatus": details.user_status(),
        "notes": details.user_registration.as_ref().and_then(|r| r.notes.as_deref()),
    })
}

fn whoami(auth: &AuthContext) -> Value {
    match auth.session() {
        Some(session) => json!({
            "signedIn": true,
            "userId": session.user_id,
            "displayName": session.display_name,
            "role": session.role,
            "roleLabel": session.role.label(),
            "hasToken": session.token.is_some(),
        }),
        None => json!({ "signedIn": false }),
    }
}
