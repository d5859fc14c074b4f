use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use dadjokes_domain::calendar::Calendar;
use dadjokes_domain::notification::{
    NotificationKind, NotificationScheduler, NotificationSender, ScheduledNotification,
};
use dadjokes_domain::shared::DomainError;

/// Schedules notifications as delayed tokio tasks that hand the message to a
/// sender once due. Triggers in the past fire immediately.
pub struct TokioNotificationScheduler {
    sender: Arc<dyn NotificationSender>,
    calendar: Arc<dyn Calendar>,
    pending: Mutex<Vec<(NotificationKind, JoinHandle<()>)>>,
}

impl TokioNotificationScheduler {
    pub fn new(sender: Arc<dyn NotificationSender>, calendar: Arc<dyn Calendar>) -> Self {
        Self {
            sender,
            calendar,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Number of scheduled notifications that have not fired yet.
    pub async fn pending_count(&self) -> usize {
        let mut pending = self.pending.lock().await;
        pending.retain(|(_, handle)| !handle.is_finished());
        pending.len()
    }
}

#[async_trait]
impl NotificationScheduler for TokioNotificationScheduler {
    async fn schedule(&self, notification: ScheduledNotification) -> Result<(), DomainError> {
        let delay = (notification.trigger_at - self.calendar.now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        debug!(
            "[notify] scheduling {} '{}' in {}s",
            notification.kind,
            notification.message.title,
            delay.as_secs()
        );

        let kind = notification.kind;
        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Err(e) = sender.send(&notification.message).await {
                warn!(
                    "[notify] failed to deliver '{}': {}",
                    notification.message.title, e
                );
            }
        });

        let mut pending = self.pending.lock().await;
        pending.retain(|(_, h)| !h.is_finished());
        pending.push((kind, handle));
        Ok(())
    }

    async fn cancel(&self, kind: NotificationKind) -> Result<(), DomainError> {
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|(pending_kind, handle)| {
            if *pending_kind == kind {
                handle.abort();
                false
            } else {
                true
            }
        });
        debug!(
            "[notify] cancelled {} pending {} notifications",
            before - pending.len(),
            kind
        );
        Ok(())
    }
}
