use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;

use dadjokes_domain::achievement::AchievementDefinition;
use dadjokes_domain::calendar::Calendar;
use dadjokes_domain::notification::{
    NotificationKind, NotificationScheduler, ScheduledNotification,
};
use dadjokes_domain::preferences::UserPreferences;
use dadjokes_domain::streak::{BadgeDefinition, StreakData};

const REMINDER_TITLE: &str = "Your daily dad joke is ready";

/// Turns user preferences and unlock events into scheduled notifications.
/// Scheduler failures are logged and never reach the caller.
pub struct ReminderService {
    scheduler: Arc<dyn NotificationScheduler>,
    calendar: Arc<dyn Calendar>,
}

impl ReminderService {
    pub fn new(scheduler: Arc<dyn NotificationScheduler>, calendar: Arc<dyn Calendar>) -> Self {
        Self {
            scheduler,
            calendar,
        }
    }

    /// Replace the pending daily reminder with the next one. Unlock
    /// announcements still waiting to fire are left alone.
    ///
    /// The reminder fires today at the preferred local time if that is still
    /// ahead, otherwise tomorrow. Returns the trigger time, or `None` when
    /// reminders are disabled.
    pub async fn schedule_daily_reminder(
        &self,
        preferences: &UserPreferences,
        streak: &StreakData,
    ) -> Option<DateTime<Utc>> {
        if let Err(e) = self.scheduler.cancel(NotificationKind::Reminder).await {
            warn!("[reminder] failed to cancel pending reminder: {}", e);
        }

        if !preferences.notifications_enabled {
            info!("[reminder] notifications disabled, nothing scheduled");
            return None;
        }

        let trigger_at = self.next_trigger(preferences)?;
        let body = if streak.is_at_risk(self.calendar.today()) {
            format!(
                "Keep your {}-day streak going!",
                streak.current_streak()
            )
        } else {
            "A fresh groaner is waiting for you.".to_string()
        };

        match self
            .scheduler
            .schedule(ScheduledNotification::new(
                NotificationKind::Reminder,
                REMINDER_TITLE,
                body,
                trigger_at,
            ))
            .await
        {
            Ok(()) => {
                info!("[reminder] daily reminder scheduled at {}", trigger_at);
                Some(trigger_at)
            }
            Err(e) => {
                warn!("[reminder] failed to schedule daily reminder: {}", e);
                None
            }
        }
    }

    fn next_trigger(&self, preferences: &UserPreferences) -> Option<DateTime<Utc>> {
        let today = self.calendar.today();
        let at = self.calendar.at_local(today, preferences.reminder_time);
        if at > self.calendar.now() {
            return Some(at);
        }
        let tomorrow = today.succ_opt()?;
        Some(self.calendar.at_local(tomorrow, preferences.reminder_time))
    }

    /// Fire one notification per newly earned badge or achievement.
    /// Returns how many were scheduled.
    pub async fn announce_unlocks(
        &self,
        badges: &[&'static BadgeDefinition],
        achievements: &[&'static AchievementDefinition],
    ) -> usize {
        let now = self.calendar.now();
        let notifications = badges
            .iter()
            .map(|b| {
                ScheduledNotification::new(
                    NotificationKind::Unlock,
                    "Streak badge earned",
                    format!("{} ({} days in a row)", b.title, b.days),
                    now,
                )
            })
            .chain(achievements.iter().map(|a| {
                ScheduledNotification::new(
                    NotificationKind::Unlock,
                    format!("Achievement unlocked: {}", a.title),
                    a.description,
                    now,
                )
            }));

        let mut scheduled = 0;
        for notification in notifications {
            match self.scheduler.schedule(notification).await {
                Ok(()) => scheduled += 1,
                Err(e) => warn!("[reminder] failed to announce unlock: {}", e),
            }
        }
        scheduled
    }
}
