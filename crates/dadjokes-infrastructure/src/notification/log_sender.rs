use async_trait::async_trait;
use log::info;

use dadjokes_domain::notification::{NotificationMessage, NotificationSender};
use dadjokes_domain::shared::DomainError;

/// Writes notifications to the application log. Stands in for the platform
/// push channel, which lives outside this engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSender;

impl LogNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send(&self, message: &NotificationMessage) -> Result<(), DomainError> {
        info!("[notify] {}: {}", message.title, message.body);
        Ok(())
    }
}
