use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

use dadjokes_domain::achievement::AchievementDefinition;
use dadjokes_domain::calendar::Calendar;
use dadjokes_domain::entitlement::{PremiumFeature, DEFAULT_TRIAL_DAYS};
use dadjokes_domain::history::{HistoryLimits, JokeHistoryEntry};
use dadjokes_domain::merge::{merge_remote, MergeReport, RemoteSnapshot};
use dadjokes_domain::preferences::UserPreferences;
use dadjokes_domain::shared::{CollectionId, DomainError, JokeId};
use dadjokes_domain::state::{LibraryExport, UserState, ViewOutcome};
use dadjokes_domain::storage::KeyValueStore;

/// Key under which the whole user state snapshot is stored.
pub const STATE_KEY: &str = "dadjokes.user_state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateStoreOptions {
    /// Persist after every command.
    pub auto_save: bool,
    pub history_limits: HistoryLimits,
    pub trial_days: u32,
}

impl Default for StateStoreOptions {
    fn default() -> Self {
        Self {
            auto_save: true,
            history_limits: HistoryLimits::default(),
            trial_days: DEFAULT_TRIAL_DAYS,
        }
    }
}

/// Result of a command: the new immutable snapshot, the command's own
/// value and any achievements the change unlocked.
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub state: Arc<UserState>,
    pub value: T,
    pub unlocked: Vec<&'static AchievementDefinition>,
}

/// Owns the user state for the session.
///
/// Commands copy the current state, mutate the copy and swap it in, so
/// readers holding an older `Arc<UserState>` never observe a partial update.
pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
    calendar: Arc<dyn Calendar>,
    options: StateStoreOptions,
    state: RwLock<Arc<UserState>>,
}

impl StateStore {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        calendar: Arc<dyn Calendar>,
        options: StateStoreOptions,
    ) -> Self {
        Self {
            kv,
            calendar,
            options,
            state: RwLock::new(Arc::new(UserState::new())),
        }
    }

    pub fn options(&self) -> &StateStoreOptions {
        &self.options
    }

    pub async fn snapshot(&self) -> Arc<UserState> {
        self.state.read().await.clone()
    }

    // Persistence

    /// Load the persisted snapshot. A missing or unreadable snapshot leaves
    /// a fresh state in place.
    pub async fn hydrate(&self) -> Arc<UserState> {
        let loaded = match self.kv.get(STATE_KEY).await {
            Ok(Some(json)) => match UserState::from_json(&json) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!("[store] discarding unreadable snapshot: {}", e);
                    None
                }
            },
            Ok(None) => {
                info!("[store] no saved state, starting fresh");
                None
            }
            Err(e) => {
                warn!("[store] failed to read saved state: {}", e);
                None
            }
        };

        let mut state = loaded.unwrap_or_default();
        state.prune_history(self.calendar.today(), self.options.history_limits);

        let snapshot = Arc::new(state);
        *self.state.write().await = snapshot.clone();
        info!(
            "[store] hydrated: streak={} favorites={} collections={}",
            snapshot.streak().current_streak(),
            snapshot.favorites().len(),
            snapshot.collections().len()
        );
        snapshot
    }

    pub async fn save(&self) -> Result<(), DomainError> {
        let guard = self.state.read().await;
        self.write_snapshot(&guard).await
    }

    /// Delete the persisted snapshot and reset to a fresh state (logout).
    pub async fn clear(&self) -> Result<Arc<UserState>, DomainError> {
        let mut guard = self.state.write().await;
        self.kv.delete(STATE_KEY).await?;
        let fresh = Arc::new(UserState::new());
        *guard = fresh.clone();
        info!("[store] cleared saved state");
        Ok(fresh)
    }

    async fn write_snapshot(&self, state: &UserState) -> Result<(), DomainError> {
        let json = state.to_json()?;
        self.kv.set(STATE_KEY, &json).await?;
        debug!("[store] saved snapshot ({} bytes)", json.len());
        Ok(())
    }

    /// Apply `mutate` to a copy of the state and publish it. The write lock
    /// is held through the save so snapshots reach storage in order.
    async fn apply<T>(
        &self,
        recheck: bool,
        mutate: impl FnOnce(&mut UserState, DateTime<Utc>) -> Result<T, DomainError>,
    ) -> Result<Applied<T>, DomainError> {
        let now = self.calendar.now();
        let mut guard = self.state.write().await;

        let mut next = UserState::clone(&guard);
        let value = mutate(&mut next, now)?;
        let unlocked = if recheck {
            next.check_achievements(now)
        } else {
            Vec::new()
        };
        for achievement in &unlocked {
            info!("[achievement] unlocked {}", achievement.id);
        }

        let snapshot = Arc::new(next);
        *guard = snapshot.clone();

        if self.options.auto_save {
            if let Err(e) = self.write_snapshot(&snapshot).await {
                warn!("[store] auto-save failed, keeping in-memory state: {}", e);
            }
        }

        Ok(Applied {
            state: snapshot,
            value,
            unlocked,
        })
    }

    async fn require(&self, feature: PremiumFeature) -> Result<(), DomainError> {
        let now = self.calendar.now();
        self.state.read().await.entitlement().require(feature, now)
    }

    // Commands

    pub async fn record_view(
        &self,
        joke: JokeId,
        category: Option<&str>,
    ) -> Result<Applied<ViewOutcome>, DomainError> {
        let today = self.calendar.today();
        let limits = self.options.history_limits;
        self.apply(true, |state, now| {
            Ok(state.record_view(joke, category, now, today, limits))
        })
        .await
    }

    /// The value is whether the joke is a favorite afterwards.
    pub async fn toggle_favorite(&self, joke: JokeId) -> Result<Applied<bool>, DomainError> {
        self.apply(true, |state, _| Ok(state.toggle_favorite(joke)))
            .await
    }

    pub async fn rate_joke(&self, joke: JokeId, stars: u8) -> Result<Applied<()>, DomainError> {
        self.apply(false, |state, _| state.rate(joke, stars)).await
    }

    /// The value is the new share total.
    pub async fn record_share(&self, joke: &JokeId) -> Result<Applied<u64>, DomainError> {
        self.apply(true, |state, _| Ok(state.record_share(joke)))
            .await
    }

    pub async fn create_collection(
        &self,
        name: &str,
        emoji: &str,
    ) -> Result<Applied<CollectionId>, DomainError> {
        self.require(PremiumFeature::Collections).await?;
        self.apply(true, |state, now| {
            state.collections_mut().create(name, emoji, now)
        })
        .await
    }

    /// The value is false when the joke was already in the collection.
    pub async fn add_to_collection(
        &self,
        id: &CollectionId,
        joke: JokeId,
    ) -> Result<Applied<bool>, DomainError> {
        self.apply(false, |state, _| state.collections_mut().add_ref(id, joke))
            .await
    }

    pub async fn remove_from_collection(
        &self,
        id: &CollectionId,
        joke: &JokeId,
    ) -> Result<Applied<bool>, DomainError> {
        self.apply(false, |state, _| state.collections_mut().remove_ref(id, joke))
            .await
    }

    pub async fn rename_collection(
        &self,
        id: &CollectionId,
        name: &str,
    ) -> Result<Applied<()>, DomainError> {
        self.apply(false, |state, _| state.collections_mut().rename(id, name))
            .await
    }

    pub async fn delete_collection(&self, id: &CollectionId) -> Result<Applied<()>, DomainError> {
        self.apply(true, |state, _| {
            state.collections_mut().delete(id).map(|_| ())
        })
        .await
    }

    /// Explicit recheck from the achievements screen. Commands still track
    /// progress for free users; only this entry point is gated.
    pub async fn check_achievements(&self) -> Result<Applied<()>, DomainError> {
        self.require(PremiumFeature::Achievements).await?;
        self.apply(true, |_, _| Ok(())).await
    }

    pub async fn update_preferences(
        &self,
        preferences: UserPreferences,
    ) -> Result<Applied<()>, DomainError> {
        self.apply(false, |state, _| state.set_preferences(preferences))
            .await
    }

    /// The value is the trial expiry.
    pub async fn start_trial(&self) -> Result<Applied<DateTime<Utc>>, DomainError> {
        let days = self.options.trial_days;
        self.apply(false, |state, now| {
            state.entitlement_mut().start_trial(now, days)
        })
        .await
    }

    pub async fn set_premium(&self, premium: bool) -> Result<Applied<()>, DomainError> {
        self.apply(false, |state, _| {
            state.entitlement_mut().set_premium(premium);
            Ok(())
        })
        .await
    }

    /// Fold a remote snapshot in (merge-on-login).
    pub async fn apply_remote(
        &self,
        remote: RemoteSnapshot,
    ) -> Result<Applied<MergeReport>, DomainError> {
        self.apply(true, |state, _| Ok(merge_remote(state, remote)))
            .await
    }

    // Queries

    pub async fn is_entitled(&self, feature: PremiumFeature) -> bool {
        let now = self.calendar.now();
        self.state.read().await.entitlement().is_entitled(feature, now)
    }

    /// Viewing history, newest first.
    pub async fn history(&self) -> Result<Vec<JokeHistoryEntry>, DomainError> {
        self.require(PremiumFeature::History).await?;
        Ok(self.state.read().await.history().entries().to_vec())
    }

    /// Favorites, ratings and collections as one view.
    pub async fn library(&self) -> Result<LibraryExport, DomainError> {
        self.require(PremiumFeature::Library).await?;
        let now = self.calendar.now();
        Ok(self.state.read().await.export_library(now))
    }

    /// The library serialized as JSON, ready to hand to a share sheet.
    pub async fn export_library(&self) -> Result<String, DomainError> {
        self.require(PremiumFeature::Export).await?;
        let now = self.calendar.now();
        let export = self.state.read().await.export_library(now);
        serde_json::to_string_pretty(&export).map_err(|e| {
            DomainError::Serialization(format!("Failed to serialize library export: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use dadjokes_domain::calendar::ManualCalendar;
    use dadjokes_domain::streak::StreakTransition;
    use dadjokes_infrastructure::persistence::InMemoryKeyValueStore;

    fn setup() -> (Arc<InMemoryKeyValueStore>, Arc<ManualCalendar>, StateStore) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let calendar = Arc::new(ManualCalendar::at(
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        ));
        let store = StateStore::new(kv.clone(), calendar.clone(), StateStoreOptions::default());
        (kv, calendar, store)
    }

    #[tokio::test]
    async fn test_record_view_updates_streak_and_unlocks_first_laugh() {
        let (_, _, store) = setup();

        let applied = store
            .record_view(JokeId::from("j1"), Some("Animals"))
            .await
            .unwrap();

        assert_eq!(applied.value.streak.transition, StreakTransition::Started);
        assert!(applied.value.new_category);
        assert_eq!(applied.state.streak().current_streak(), 1);
        assert!(applied.unlocked.iter().any(|a| a.id == "first_laugh"));
        assert_eq!(applied.state.history().len(), 1);
    }

    #[tokio::test]
    async fn test_old_snapshots_are_not_mutated() {
        let (_, _, store) = setup();
        let before = store.snapshot().await;

        store.toggle_favorite(JokeId::from("j1")).await.unwrap();

        assert!(before.favorites().is_empty());
        assert_eq!(store.snapshot().await.favorites().len(), 1);
    }

    #[tokio::test]
    async fn test_auto_save_persists_each_command() {
        let (kv, _, store) = setup();

        store.toggle_favorite(JokeId::from("j1")).await.unwrap();

        let json = kv.get(STATE_KEY).await.unwrap().expect("saved snapshot");
        let saved = UserState::from_json(&json).unwrap();
        assert_eq!(saved.favorites(), &[JokeId::from("j1")]);
    }

    #[tokio::test]
    async fn test_failed_command_leaves_state_untouched() {
        let (_, _, store) = setup();
        let before = store.snapshot().await;

        let err = store.rate_joke(JokeId::from("j1"), 9).await.unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(*store.snapshot().await, *before);
    }

    #[tokio::test]
    async fn test_collections_require_entitlement() {
        let (_, _, store) = setup();

        let err = store.create_collection("Puns", "").await.unwrap_err();
        assert!(matches!(err, DomainError::NotEntitled(_)));

        store.start_trial().await.unwrap();
        let applied = store.create_collection("Puns", "").await.unwrap();
        assert!(applied.unlocked.iter().any(|a| a.id == "organizer"));
        assert_eq!(applied.state.collections().len(), 1);
    }

    #[tokio::test]
    async fn test_trial_expires() {
        let (_, calendar, store) = setup();

        store.start_trial().await.unwrap();
        assert!(store.is_entitled(PremiumFeature::History).await);

        calendar.advance_days(8);
        assert!(!store.is_entitled(PremiumFeature::History).await);
        assert!(matches!(
            store.history().await.unwrap_err(),
            DomainError::NotEntitled(_)
        ));
        assert!(matches!(
            store.start_trial().await.unwrap_err(),
            DomainError::TrialAlreadyUsed(_)
        ));
    }

    #[tokio::test]
    async fn test_hydrate_restores_saved_state() {
        let (kv, calendar, store) = setup();
        store.record_view(JokeId::from("j1"), None).await.unwrap();
        store.toggle_favorite(JokeId::from("j1")).await.unwrap();

        let reloaded = StateStore::new(kv, calendar, StateStoreOptions::default());
        let state = reloaded.hydrate().await;

        assert_eq!(state.streak().total_jokes_viewed(), 1);
        assert_eq!(state.favorites(), &[JokeId::from("j1")]);
    }

    #[tokio::test]
    async fn test_hydrate_discards_corrupt_snapshot() {
        let (kv, _, store) = setup();
        kv.set(STATE_KEY, "{not json").await.unwrap();

        let state = store.hydrate().await;

        assert_eq!(*state, UserState::new());
    }

    #[tokio::test]
    async fn test_clear_removes_snapshot() {
        let (kv, _, store) = setup();
        store.toggle_favorite(JokeId::from("j1")).await.unwrap();

        let fresh = store.clear().await.unwrap();

        assert!(fresh.favorites().is_empty());
        assert!(kv.get(STATE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_manual_save_when_auto_save_disabled() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let calendar = Arc::new(ManualCalendar::new(Utc::now()));
        let options = StateStoreOptions {
            auto_save: false,
            ..StateStoreOptions::default()
        };
        let store = StateStore::new(kv.clone(), calendar, options);

        store.record_share(&JokeId::from("j1")).await.unwrap();
        assert!(kv.is_empty().await);

        store.save().await.unwrap();
        assert!(!kv.is_empty().await);
    }

    #[tokio::test]
    async fn test_achievements_and_library_require_entitlement() {
        let (_, _, store) = setup();
        store.toggle_favorite(JokeId::from("j1")).await.unwrap();

        assert!(matches!(
            store.check_achievements().await.unwrap_err(),
            DomainError::NotEntitled(f) if f == "achievements"
        ));
        assert!(matches!(
            store.library().await.unwrap_err(),
            DomainError::NotEntitled(f) if f == "library"
        ));

        store.set_premium(true).await.unwrap();
        store.check_achievements().await.unwrap();
        let library = store.library().await.unwrap();
        assert_eq!(library.favorites, vec![JokeId::from("j1")]);
    }

    #[tokio::test]
    async fn test_trial_length_out_of_range_is_rejected() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let calendar = Arc::new(ManualCalendar::new(Utc::now()));
        let options = StateStoreOptions {
            trial_days: 200_000_000,
            ..StateStoreOptions::default()
        };
        let store = StateStore::new(kv, calendar, options);

        let err = store.start_trial().await.unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(!store.snapshot().await.entitlement().trial_used());
    }
}
