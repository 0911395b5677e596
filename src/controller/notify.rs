use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NoticeKind,
    #[serde(skip)]
    expires_at: Instant,
}

impl Notification {
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            NoticeKind::Success => write!(f, "✓ {}", self.message),
            NoticeKind::Error => write!(f, "✗ {}", self.message),
        }
    }
}

/// At most one transient notification; a new one replaces the old, and each
/// one dismisses itself after `ttl`.
#[derive(Debug)]
pub struct Notifications {
    ttl: Duration,
    current: Option<Notification>,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(message.into(), NoticeKind::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message.into(), NoticeKind::Error);
    }

    fn show(&mut self, message: String, kind: NoticeKind) {
        match kind {
            NoticeKind::Success => tracing::info!("{}", message),
            NoticeKind::Error => tracing::warn!("{}", message),
        }
        self.current = Some(Notification {
            message,
            kind,
            expires_at: Instant::now() + self.ttl,
        });
    }

    /// The visible notification, if it has not expired yet
    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref().filter(|n| Instant::now() < n.expires_at)
    }

    /// Drop an expired notification; returns true if one was removed
    pub fn dismiss_expired(&mut self) -> bool {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|n| Instant::now() >= n.expires_at);
        if expired {
            self.current = None;
        }
        expired
    }
}
