use async_trait::async_trait;

use crate::collection::JokeCollection;
use crate::preferences::UserPreferences;
use crate::shared::{DomainError, JokeId, UserId};
use crate::streak::StreakData;

/// Authenticated cloud mirror of the user's data.
///
/// Fetches return `None` or an empty list when the user has no record yet.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch_favorites(&self, user: &UserId) -> Result<Vec<JokeId>, DomainError>;

    async fn fetch_collections(&self, user: &UserId) -> Result<Vec<JokeCollection>, DomainError>;

    async fn fetch_streak(&self, user: &UserId) -> Result<Option<StreakData>, DomainError>;

    async fn fetch_preferences(&self, user: &UserId)
        -> Result<Option<UserPreferences>, DomainError>;

    async fn upsert_favorites(&self, user: &UserId, favorites: &[JokeId])
        -> Result<(), DomainError>;

    async fn upsert_collections(
        &self,
        user: &UserId,
        collections: &[JokeCollection],
    ) -> Result<(), DomainError>;

    async fn upsert_streak(&self, user: &UserId, streak: &StreakData) -> Result<(), DomainError>;

    async fn upsert_preferences(
        &self,
        user: &UserId,
        preferences: &UserPreferences,
    ) -> Result<(), DomainError>;
}

/// The independently synced parts of the user's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RemoteField {
    Favorites,
    Collections,
    Streak,
    Preferences,
}

impl RemoteField {
    pub const ALL: [RemoteField; 4] = [
        RemoteField::Favorites,
        RemoteField::Collections,
        RemoteField::Streak,
        RemoteField::Preferences,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteField::Favorites => "favorites",
            RemoteField::Collections => "collections",
            RemoteField::Streak => "streak",
            RemoteField::Preferences => "preferences",
        }
    }
}

impl std::fmt::Display for RemoteField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
