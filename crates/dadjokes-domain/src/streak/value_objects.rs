use serde::{Deserialize, Serialize};

/// A badge awarded once a streak reaches `days` consecutive days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub days: u32,
    pub title: &'static str,
}

/// Ordered by threshold, ascending.
pub const STREAK_BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "streak_3",
        days: 3,
        title: "Chuckle Starter",
    },
    BadgeDefinition {
        id: "streak_7",
        days: 7,
        title: "Week of Whimsy",
    },
    BadgeDefinition {
        id: "streak_14",
        days: 14,
        title: "Fortnight of Funnies",
    },
    BadgeDefinition {
        id: "streak_30",
        days: 30,
        title: "Monthly Giggler",
    },
    BadgeDefinition {
        id: "streak_60",
        days: 60,
        title: "Pun Devotee",
    },
    BadgeDefinition {
        id: "streak_100",
        days: 100,
        title: "Centurion of Chuckles",
    },
    BadgeDefinition {
        id: "streak_365",
        days: 365,
        title: "Year of Groans",
    },
];

pub fn badge_for(id: &str) -> Option<&'static BadgeDefinition> {
    STREAK_BADGES.iter().find(|badge| badge.id == id)
}

/// How a view changed the running streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// First view ever, or the previous view was two or more days ago.
    Started,
    /// Last view was yesterday.
    Extended,
    /// Already viewed today.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakUpdate {
    pub transition: StreakTransition,
    pub current_streak: u32,
    pub new_badges: Vec<&'static BadgeDefinition>,
}

impl StreakUpdate {
    pub fn earned_badges(&self) -> bool {
        !self.new_badges.is_empty()
    }
}
