// Transient status-bar feedback. Inline banners and the modal carry the
// persistent errors; toasts only confirm that something happened.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Higher levels pre-empt lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub duration: Duration,
    shown_at: Option<Instant>,
}

impl Toast {
    fn new(message: impl Into<String>, level: ToastLevel, secs: u64) -> Self {
        Self {
            message: message.into(),
            level,
            duration: Duration::from_secs(secs),
            shown_at: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Info, 3)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Success, 3)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Warning, 4)
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.shown_at
            .is_some_and(|shown| now.duration_since(shown) >= self.duration)
    }

    fn mark_shown(&mut self, now: Instant) {
        if self.shown_at.is_none() {
            self.shown_at = Some(now);
        }
    }
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    queue: VecDeque<Toast>,
    current: Option<Toast>,
    /// Messages shown recently, with the instant their dedup window ends
    recent: Vec<(String, Instant)>,
}

const DEDUP_WINDOW: Duration = Duration::from_secs(2);

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast) {
        self.push_at(toast, Instant::now());
    }

    /// A higher-level toast replaces the one on screen, which is dropped
    /// rather than re-queued. Repeats within two seconds are ignored.
    pub fn push_at(&mut self, mut toast: Toast, now: Instant) {
        self.recent.retain(|(_, until)| *until > now);
        if self.recent.iter().any(|(m, _)| *m == toast.message) {
            return;
        }
        self.recent.push((toast.message.clone(), now + DEDUP_WINDOW));

        match &self.current {
            None => {
                toast.mark_shown(now);
                self.current = Some(toast);
            }
            Some(current) if toast.level > current.level => {
                toast.mark_shown(now);
                self.current = Some(toast);
            }
            Some(_) => {
                let pos = self
                    .queue
                    .iter()
                    .position(|t| t.level < toast.level)
                    .unwrap_or(self.queue.len());
                self.queue.insert(pos, toast);
            }
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
        self.advance(Instant::now());
    }

    pub fn tick(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.current = None;
            self.advance(now);
        }
    }

    fn advance(&mut self, now: Instant) {
        if self.current.is_none() {
            if let Some(mut next) = self.queue.pop_front() {
                next.mark_shown(now);
                self.current = Some(next);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }
}
