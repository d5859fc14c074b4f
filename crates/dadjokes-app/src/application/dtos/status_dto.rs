use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dadjokes_domain::achievement::ACHIEVEMENTS;
use dadjokes_domain::entitlement::AccessLevel;
use dadjokes_domain::state::UserState;
use dadjokes_domain::streak::StreakData;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakDto {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_jokes_viewed: u64,
    pub last_viewed_date: Option<String>, // YYYY-MM-DD
    pub badges: Vec<String>,
}

impl From<&StreakData> for StreakDto {
    fn from(streak: &StreakData) -> Self {
        Self {
            current_streak: streak.current_streak(),
            longest_streak: streak.longest_streak(),
            total_jokes_viewed: streak.total_jokes_viewed(),
            last_viewed_date: streak
                .last_viewed_date()
                .map(|d| d.format("%Y-%m-%d").to_string()),
            badges: streak.streak_badges().to_vec(),
        }
    }
}

/// Summary printed by the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDto {
    pub streak: StreakDto,
    pub achievements_unlocked: usize,
    pub achievements_total: usize,
    pub favorites: usize,
    pub ratings: usize,
    pub total_shares: u64,
    pub categories_explored: usize,
    pub collections: usize,
    pub history_entries: usize,
    pub access_level: AccessLevel,
    pub trial_expires_at: Option<DateTime<Utc>>,
}

impl StatusDto {
    pub fn from_state(state: &UserState, now: DateTime<Utc>) -> Self {
        Self {
            streak: StreakDto::from(state.streak()),
            achievements_unlocked: state.achievements().unlocked_count(),
            achievements_total: ACHIEVEMENTS.len(),
            favorites: state.favorites().len(),
            ratings: state.ratings().len(),
            total_shares: state.total_shares(),
            categories_explored: state.explored_categories().len(),
            collections: state.collections().len(),
            history_entries: state.history().len(),
            access_level: state.entitlement().access_level(now),
            trial_expires_at: state.entitlement().trial_expires_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dadjokes_domain::history::HistoryLimits;
    use dadjokes_domain::shared::JokeId;

    #[test]
    fn test_status_from_state() {
        let mut state = UserState::new();
        let now = Utc::now();
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        state.record_view(JokeId::from("j1"), Some("puns"), now, today, HistoryLimits::default());
        state.toggle_favorite(JokeId::from("j1"));
        state.check_achievements(now);

        let status = StatusDto::from_state(&state, now);

        assert_eq!(status.streak.current_streak, 1);
        assert_eq!(status.streak.last_viewed_date.as_deref(), Some("2024-02-29"));
        assert_eq!(status.favorites, 1);
        assert_eq!(status.achievements_total, 20);
        // first_laugh and first_favorite
        assert_eq!(status.achievements_unlocked, 2);
        assert_eq!(status.access_level, AccessLevel::Free);
    }
}
