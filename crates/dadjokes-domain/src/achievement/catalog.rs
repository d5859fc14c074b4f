use serde::{Deserialize, Serialize};
use std::fmt;

/// Counter an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Views,
    Shares,
    Favorites,
    Categories,
    Collections,
    Streak,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Views => "views",
            Metric::Shares => "shares",
            Metric::Favorites => "favorites",
            Metric::Categories => "categories",
            Metric::Collections => "collections",
            Metric::Streak => "streak",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub metric: Metric,
    pub target: u32,
}

macro_rules! achievement {
    ($id:literal, $title:literal, $description:literal, $metric:ident, $target:literal) => {
        AchievementDefinition {
            id: $id,
            title: $title,
            description: $description,
            metric: Metric::$metric,
            target: $target,
        }
    };
}

pub const ACHIEVEMENTS: &[AchievementDefinition] = &[
    // Views
    achievement!("first_laugh", "First Laugh", "Read your first joke", Views, 1),
    achievement!("warming_up", "Warming Up", "Read 10 jokes", Views, 10),
    achievement!("joke_enthusiast", "Joke Enthusiast", "Read 50 jokes", Views, 50),
    achievement!("centurion", "Centurion", "Read 100 jokes", Views, 100),
    achievement!("pun_master", "Pun Master", "Read 500 jokes", Views, 500),
    // Shares
    achievement!("sharing_is_caring", "Sharing Is Caring", "Share your first joke", Shares, 1),
    achievement!("social_butterfly", "Social Butterfly", "Share 10 jokes", Shares, 10),
    achievement!("spread_the_groan", "Spread the Groan", "Share 50 jokes", Shares, 50),
    // Favorites
    achievement!("first_favorite", "Keeper", "Favorite your first joke", Favorites, 1),
    achievement!("collector", "Collector", "Favorite 10 jokes", Favorites, 10),
    achievement!("curator", "Curator", "Favorite 25 jokes", Favorites, 25),
    achievement!("hoarder", "Hoarder", "Favorite 50 jokes", Favorites, 50),
    // Categories
    achievement!("explorer", "Explorer", "Read jokes from 3 categories", Categories, 3),
    achievement!("globetrotter", "Globetrotter", "Read jokes from 8 categories", Categories, 8),
    // Collections
    achievement!("organizer", "Organizer", "Create your first collection", Collections, 1),
    achievement!("librarian", "Librarian", "Create 5 collections", Collections, 5),
    // Streak
    achievement!("three_day_streak", "On a Roll", "Keep a 3-day streak", Streak, 3),
    achievement!("week_streak", "Weekly Regular", "Keep a 7-day streak", Streak, 7),
    achievement!("month_streak", "Dedicated Dad", "Keep a 30-day streak", Streak, 30),
    achievement!("century_streak", "Unstoppable", "Keep a 100-day streak", Streak, 100),
];

pub fn definition(id: &str) -> Option<&'static AchievementDefinition> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}
