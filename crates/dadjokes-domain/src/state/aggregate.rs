use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::achievement::{AchievementBook, AchievementCounters, AchievementDefinition};
use crate::collection::{CollectionBook, JokeCollection};
use crate::entitlement::Entitlement;
use crate::history::{HistoryLimits, JokeHistory};
use crate::preferences::UserPreferences;
use crate::shared::{DomainError, JokeId};
use crate::streak::{StreakData, StreakUpdate};

pub const STATE_SCHEMA_VERSION: u32 = 1;

/// Everything the app knows about the local user.
///
/// Persisted as one JSON snapshot; mirrored (never owned) by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserState {
    version: u32,
    streak: StreakData,
    achievements: AchievementBook,
    favorites: Vec<JokeId>,
    ratings: BTreeMap<JokeId, u8>,
    total_shares: u64,
    explored_categories: BTreeSet<String>,
    collections: CollectionBook,
    history: JokeHistory,
    preferences: UserPreferences,
    entitlement: Entitlement,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            version: STATE_SCHEMA_VERSION,
            streak: StreakData::default(),
            achievements: AchievementBook::default(),
            favorites: Vec::new(),
            ratings: BTreeMap::new(),
            total_shares: 0,
            explored_categories: BTreeSet::new(),
            collections: CollectionBook::default(),
            history: JokeHistory::default(),
            preferences: UserPreferences::default(),
            entitlement: Entitlement::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOutcome {
    pub streak: StreakUpdate,
    pub new_category: bool,
}

/// Portable copy of the user's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryExport {
    pub exported_at: DateTime<Utc>,
    pub favorites: Vec<JokeId>,
    pub ratings: BTreeMap<JokeId, u8>,
    pub collections: Vec<JokeCollection>,
}

impl UserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let state: Self = serde_json::from_str(json).map_err(|e| {
            DomainError::Deserialization(format!("Failed to deserialize user state: {}", e))
        })?;
        if state.version > STATE_SCHEMA_VERSION {
            return Err(DomainError::Deserialization(format!(
                "User state schema {} is newer than supported {}",
                state.version, STATE_SCHEMA_VERSION
            )));
        }
        Ok(state)
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self).map_err(|e| {
            DomainError::Serialization(format!("Failed to serialize user state: {}", e))
        })
    }

    // Getters

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn streak(&self) -> &StreakData {
        &self.streak
    }

    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    pub fn favorites(&self) -> &[JokeId] {
        &self.favorites
    }

    pub fn is_favorite(&self, joke: &JokeId) -> bool {
        self.favorites.contains(joke)
    }

    pub fn rating(&self, joke: &JokeId) -> Option<u8> {
        self.ratings.get(joke).copied()
    }

    pub fn ratings(&self) -> &BTreeMap<JokeId, u8> {
        &self.ratings
    }

    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    pub fn explored_categories(&self) -> &BTreeSet<String> {
        &self.explored_categories
    }

    pub fn collections(&self) -> &CollectionBook {
        &self.collections
    }

    pub fn history(&self) -> &JokeHistory {
        &self.history
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn entitlement(&self) -> &Entitlement {
        &self.entitlement
    }

    // Mutable access for the merge and command layers

    pub fn streak_mut(&mut self) -> &mut StreakData {
        &mut self.streak
    }

    pub fn collections_mut(&mut self) -> &mut CollectionBook {
        &mut self.collections
    }

    pub fn entitlement_mut(&mut self) -> &mut Entitlement {
        &mut self.entitlement
    }

    // Business methods

    /// Record a joke view: streak, history and explored categories.
    pub fn record_view(
        &mut self,
        joke: JokeId,
        category: Option<&str>,
        now: DateTime<Utc>,
        today: NaiveDate,
        limits: HistoryLimits,
    ) -> ViewOutcome {
        let streak = self.streak.record_view(today);
        self.history.record(joke, now, today, limits);

        let new_category = match category.map(normalize_category) {
            Some(category) if !category.is_empty() => self.explored_categories.insert(category),
            _ => false,
        };

        ViewOutcome {
            streak,
            new_category,
        }
    }

    /// Returns whether the joke is a favorite after the toggle.
    pub fn toggle_favorite(&mut self, joke: JokeId) -> bool {
        if let Some(index) = self.favorites.iter().position(|f| *f == joke) {
            self.favorites.remove(index);
            debug!("[favorites] removed {}", joke);
            false
        } else {
            debug!("[favorites] added {}", joke);
            self.favorites.push(joke);
            true
        }
    }

    pub fn set_favorites(&mut self, favorites: Vec<JokeId>) {
        self.favorites = favorites;
    }

    pub fn rate(&mut self, joke: JokeId, stars: u8) -> Result<(), DomainError> {
        if !(1..=5).contains(&stars) {
            return Err(DomainError::InvalidInput(format!(
                "Rating must be between 1 and 5, got {}",
                stars
            )));
        }
        self.ratings.insert(joke, stars);
        Ok(())
    }

    pub fn record_share(&mut self, joke: &JokeId) -> u64 {
        self.total_shares += 1;
        debug!("[share] {} total_shares={}", joke, self.total_shares);
        self.total_shares
    }

    pub fn set_preferences(&mut self, preferences: UserPreferences) -> Result<(), DomainError> {
        preferences.validate()?;
        self.preferences = preferences;
        Ok(())
    }

    /// Overwrite preferences with the remote record. Blank categories are
    /// stripped instead of rejecting the record.
    pub fn replace_preferences(&mut self, preferences: UserPreferences) {
        self.preferences = preferences.sanitized();
    }

    /// Drop expired history entries (e.g. after a long absence).
    pub fn prune_history(&mut self, today: NaiveDate, limits: HistoryLimits) {
        self.history.prune(today, limits);
    }

    pub fn counters(&self) -> AchievementCounters {
        AchievementCounters {
            views: self.streak.total_jokes_viewed(),
            shares: self.total_shares,
            favorites: self.favorites.len() as u64,
            categories: self.explored_categories.len() as u64,
            collections: self.collections.len() as u64,
            streak: self.streak.current_streak() as u64,
        }
    }

    pub fn check_achievements(
        &mut self,
        now: DateTime<Utc>,
    ) -> Vec<&'static AchievementDefinition> {
        let counters = self.counters();
        self.achievements.recheck(&counters, now)
    }

    pub fn export_library(&self, now: DateTime<Utc>) -> LibraryExport {
        LibraryExport {
            exported_at: now,
            favorites: self.favorites.clone(),
            ratings: self.ratings.clone(),
            collections: self.collections.all().to_vec(),
        }
    }
}

fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}
