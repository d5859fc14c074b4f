use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::sender::NotificationMessage;
use crate::shared::DomainError;

/// What a notification is for. Cancellation is scoped to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The recurring daily reminder.
    Reminder,
    /// Badge and achievement announcements.
    Unlock,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Reminder => write!(f, "reminder"),
            NotificationKind::Unlock => write!(f, "unlock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub kind: NotificationKind,
    pub message: NotificationMessage,
    pub trigger_at: DateTime<Utc>,
}

impl ScheduledNotification {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        trigger_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            message: NotificationMessage::new(title, body),
            trigger_at,
        }
    }
}

/// Schedules local notifications. Callers treat it as fire-and-forget.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    async fn schedule(&self, notification: ScheduledNotification) -> Result<(), DomainError>;

    /// Cancel pending notifications of `kind`. Other kinds keep running.
    async fn cancel(&self, kind: NotificationKind) -> Result<(), DomainError>;
}
