use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::value_objects::{StreakTransition, StreakUpdate, STREAK_BADGES};

/// Daily viewing streak.
///
/// Only [`StreakData::record_view`] moves the streak forward; everything else
/// is reconstruction from persistence or a remote snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakData {
    current_streak: u32,
    longest_streak: u32,
    last_viewed_date: Option<NaiveDate>,
    total_jokes_viewed: u64,
    streak_badges: Vec<String>,
}

impl StreakData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruct from persistence or a remote record.
    ///
    /// `longest_streak` is raised to `current_streak` if the source disagrees.
    pub fn restore(
        current_streak: u32,
        longest_streak: u32,
        last_viewed_date: Option<NaiveDate>,
        total_jokes_viewed: u64,
        streak_badges: Vec<String>,
    ) -> Self {
        let mut badges: Vec<String> = Vec::with_capacity(streak_badges.len());
        for badge in streak_badges {
            if !badges.contains(&badge) {
                badges.push(badge);
            }
        }

        Self {
            current_streak,
            longest_streak: longest_streak.max(current_streak),
            last_viewed_date,
            total_jokes_viewed,
            streak_badges: badges,
        }
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    pub fn last_viewed_date(&self) -> Option<NaiveDate> {
        self.last_viewed_date
    }

    pub fn total_jokes_viewed(&self) -> u64 {
        self.total_jokes_viewed
    }

    pub fn streak_badges(&self) -> &[String] {
        &self.streak_badges
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.streak_badges.iter().any(|b| b == id)
    }

    /// True when the streak is still alive but nothing was viewed today yet.
    pub fn is_at_risk(&self, today: NaiveDate) -> bool {
        self.current_streak > 0
            && self
                .last_viewed_date
                .and_then(|last| today.pred_opt().map(|yesterday| last == yesterday))
                .unwrap_or(false)
    }

    /// Record one joke view on `today`.
    pub fn record_view(&mut self, today: NaiveDate) -> StreakUpdate {
        self.total_jokes_viewed += 1;

        let transition = match self.last_viewed_date {
            Some(last) if last == today => StreakTransition::Unchanged,
            Some(last) if (today - last).num_days() == 1 => StreakTransition::Extended,
            Some(last) => {
                if last > today {
                    warn!(
                        "[streak] last viewed date {} is after today {}, restarting",
                        last, today
                    );
                }
                StreakTransition::Started
            }
            None => StreakTransition::Started,
        };

        match transition {
            StreakTransition::Unchanged => {
                debug!(
                    "[streak] repeat view on {} total={}",
                    today, self.total_jokes_viewed
                );
            }
            StreakTransition::Extended => {
                self.current_streak += 1;
                self.last_viewed_date = Some(today);
            }
            StreakTransition::Started => {
                self.current_streak = 1;
                self.last_viewed_date = Some(today);
            }
        }

        self.longest_streak = self.longest_streak.max(self.current_streak);
        let new_badges = self.award_badges();

        if transition != StreakTransition::Unchanged {
            info!(
                "[streak] {:?} on {} current={} longest={} new_badges={}",
                transition,
                today,
                self.current_streak,
                self.longest_streak,
                new_badges.len()
            );
        }

        StreakUpdate {
            transition,
            current_streak: self.current_streak,
            new_badges,
        }
    }

    fn award_badges(&mut self) -> Vec<&'static super::BadgeDefinition> {
        let mut earned = Vec::new();
        for badge in STREAK_BADGES {
            if self.current_streak >= badge.days && !self.has_badge(badge.id) {
                self.streak_badges.push(badge.id.to_string());
                earned.push(badge);
            }
        }
        earned
    }
}
