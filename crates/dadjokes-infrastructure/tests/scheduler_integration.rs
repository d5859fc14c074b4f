use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use dadjokes_domain::calendar::{Calendar, ManualCalendar};
use dadjokes_domain::notification::{
    NotificationKind, NotificationMessage, NotificationScheduler, NotificationSender,
    ScheduledNotification,
};
use dadjokes_domain::shared::DomainError;
use dadjokes_infrastructure::notification::TokioNotificationScheduler;

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<NotificationMessage>>,
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, message: &NotificationMessage) -> Result<(), DomainError> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

fn setup() -> (Arc<RecordingSender>, Arc<ManualCalendar>, TokioNotificationScheduler) {
    let sender = Arc::new(RecordingSender::default());
    let calendar = Arc::new(ManualCalendar::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
    ));
    let scheduler = TokioNotificationScheduler::new(sender.clone(), calendar.clone());
    (sender, calendar, scheduler)
}

async fn wait_for_sent(sender: &RecordingSender, count: usize) {
    for _ in 0..100 {
        if sender.sent.lock().await.len() >= count {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn past_trigger_fires_immediately() {
    let (sender, calendar, scheduler) = setup();

    scheduler
        .schedule(ScheduledNotification::new(
            NotificationKind::Unlock,
            "Badge earned",
            "3 day streak!",
            calendar.now() - Duration::minutes(1),
        ))
        .await
        .expect("schedule");

    wait_for_sent(&sender, 1).await;
    let sent = sender.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Badge earned");
}

#[tokio::test]
async fn cancel_drops_future_notifications_of_that_kind() {
    let (sender, calendar, scheduler) = setup();

    scheduler
        .schedule(ScheduledNotification::new(
            NotificationKind::Reminder,
            "Daily joke",
            "Your joke is waiting",
            calendar.now() + Duration::hours(1),
        ))
        .await
        .expect("schedule");
    assert_eq!(scheduler.pending_count().await, 1);

    scheduler
        .cancel(NotificationKind::Reminder)
        .await
        .expect("cancel");
    assert_eq!(scheduler.pending_count().await, 0);
    assert!(sender.sent.lock().await.is_empty());
}

#[tokio::test]
async fn cancelling_reminders_keeps_pending_unlocks() {
    let (_, calendar, scheduler) = setup();
    let later = calendar.now() + Duration::hours(1);

    for kind in [NotificationKind::Reminder, NotificationKind::Unlock] {
        scheduler
            .schedule(ScheduledNotification::new(kind, "title", "body", later))
            .await
            .expect("schedule");
    }
    assert_eq!(scheduler.pending_count().await, 2);

    scheduler
        .cancel(NotificationKind::Reminder)
        .await
        .expect("cancel");
    assert_eq!(scheduler.pending_count().await, 1);

    scheduler
        .cancel(NotificationKind::Unlock)
        .await
        .expect("cancel");
    assert_eq!(scheduler.pending_count().await, 0);
}
