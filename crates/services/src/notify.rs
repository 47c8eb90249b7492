//! # Notification Center
//!
//! In-process implementation of the `Notifier` port. One live record per
//! in-flight submission, identified by a correlation token so the later
//! state update targets exactly the record created at submission start.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use domains::ports::{NotificationStatus, NotificationToken, Notifier};

/// Lifecycle state of one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub state: NotificationState,
    pub message: String,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Token-indexed registry of notifications.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    records: DashMap<NotificationToken, Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of the notification opened under `token`, if any.
    pub fn snapshot(&self, token: NotificationToken) -> Option<Notification> {
        self.records.get(&token).map(|r| r.clone())
    }

    pub fn open_count(&self) -> usize {
        self.records.len()
    }

    /// The most recently opened notification. Failed submissions do not
    /// return their correlation token, so observers use this to inspect the
    /// outcome.
    pub fn latest(&self) -> Option<Notification> {
        self.records
            .iter()
            .max_by_key(|r| r.value().opened_at)
            .map(|r| r.value().clone())
    }
}

impl Notifier for NotificationCenter {
    fn open(&self, message: &str) -> NotificationToken {
        let token = Uuid::new_v4();
        let now = Utc::now();
        self.records.insert(
            token,
            Notification {
                state: NotificationState::Pending,
                message: message.to_string(),
                opened_at: now,
                updated_at: now,
            },
        );
        tracing::info!(%token, message, "notification opened");
        token
    }

    fn update(&self, token: NotificationToken, status: NotificationStatus, message: &str) {
        match self.records.get_mut(&token) {
            Some(mut record) => {
                record.state = match status {
                    NotificationStatus::Success => NotificationState::Success,
                    NotificationStatus::Error => NotificationState::Error,
                };
                record.message = message.to_string();
                record.updated_at = Utc::now();
                tracing::info!(%token, ?status, message, "notification updated");
            }
            // An update for a token we never opened is a caller bug, but the
            // surface is purely observational so we log and move on.
            None => tracing::warn!(%token, ?status, "update for unknown notification token"),
        }
    }
}
