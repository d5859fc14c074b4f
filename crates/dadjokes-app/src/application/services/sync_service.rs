use log::{info, warn};
use std::sync::Arc;

use super::StateStore;
use dadjokes_domain::merge::{MergeReport, RemoteSnapshot};
use dadjokes_domain::remote::{RemoteField, RemoteStore};
use dadjokes_domain::shared::{DomainError, UserId};

/// Per-field outcome of a sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub succeeded: Vec<RemoteField>,
    pub failed: Vec<RemoteField>,
    /// Set by `load_from_remote` once the fetched fields were merged.
    pub merge: Option<MergeReport>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record<T>(&mut self, field: RemoteField, result: Result<T, DomainError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.succeeded.push(field);
                Some(value)
            }
            Err(e) => {
                warn!("[sync] {} failed: {}", field, e);
                self.failed.push(field);
                None
            }
        }
    }
}

/// Mirrors local state to the remote store and merges it back on login.
///
/// Best effort: a failing field is logged and skipped, the rest proceed.
/// No retries and no rollback.
pub struct SyncService {
    store: Arc<StateStore>,
    remote: Arc<dyn RemoteStore>,
}

impl SyncService {
    pub fn new(store: Arc<StateStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { store, remote }
    }

    pub async fn sync_to_remote(&self, user: &UserId) -> SyncReport {
        let state = self.store.snapshot().await;
        let mut report = SyncReport::default();

        let (favorites, collections, streak, preferences) = tokio::join!(
            self.remote.upsert_favorites(user, state.favorites()),
            self.remote.upsert_collections(user, state.collections().all()),
            self.remote.upsert_streak(user, state.streak()),
            self.remote.upsert_preferences(user, state.preferences()),
        );
        report.record(RemoteField::Favorites, favorites);
        report.record(RemoteField::Collections, collections);
        report.record(RemoteField::Streak, streak);
        report.record(RemoteField::Preferences, preferences);

        info!(
            "[sync] pushed {} of {} fields for user {}",
            report.succeeded.len(),
            RemoteField::ALL.len(),
            user
        );
        report
    }

    /// Merge-on-login: fetch every field, merge whatever arrived, save.
    pub async fn load_from_remote(&self, user: &UserId) -> SyncReport {
        let mut report = SyncReport::default();

        let (favorites, collections, streak, preferences) = tokio::join!(
            self.remote.fetch_favorites(user),
            self.remote.fetch_collections(user),
            self.remote.fetch_streak(user),
            self.remote.fetch_preferences(user),
        );
        let snapshot = RemoteSnapshot {
            favorites: report.record(RemoteField::Favorites, favorites),
            collections: report.record(RemoteField::Collections, collections),
            streak: report
                .record(RemoteField::Streak, streak)
                .flatten(),
            preferences: report
                .record(RemoteField::Preferences, preferences)
                .flatten(),
        };

        match self.store.apply_remote(snapshot).await {
            Ok(applied) => {
                for achievement in &applied.unlocked {
                    info!("[sync] merge unlocked {}", achievement.id);
                }
                report.merge = Some(applied.value);
            }
            Err(e) => warn!("[sync] merge failed: {}", e),
        }

        if !self.store.options().auto_save {
            if let Err(e) = self.store.save().await {
                warn!("[sync] saving merged state failed: {}", e);
            }
        }

        info!(
            "[sync] loaded {} of {} fields for user {}",
            report.succeeded.len(),
            RemoteField::ALL.len(),
            user
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::StateStoreOptions;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use dadjokes_domain::calendar::ManualCalendar;
    use dadjokes_domain::collection::JokeCollection;
    use dadjokes_domain::preferences::UserPreferences;
    use dadjokes_domain::shared::JokeId;
    use dadjokes_domain::streak::StreakData;
    use dadjokes_infrastructure::persistence::InMemoryKeyValueStore;
    use mockall::mock;

    mock! {
        pub Remote {}

        #[async_trait]
        impl RemoteStore for Remote {
            async fn fetch_favorites(&self, user: &UserId) -> Result<Vec<JokeId>, DomainError>;
            async fn fetch_collections(&self, user: &UserId) -> Result<Vec<JokeCollection>, DomainError>;
            async fn fetch_streak(&self, user: &UserId) -> Result<Option<StreakData>, DomainError>;
            async fn fetch_preferences(&self, user: &UserId) -> Result<Option<UserPreferences>, DomainError>;
            async fn upsert_favorites(&self, user: &UserId, favorites: &[JokeId]) -> Result<(), DomainError>;
            async fn upsert_collections(&self, user: &UserId, collections: &[JokeCollection]) -> Result<(), DomainError>;
            async fn upsert_streak(&self, user: &UserId, streak: &StreakData) -> Result<(), DomainError>;
            async fn upsert_preferences(&self, user: &UserId, preferences: &UserPreferences) -> Result<(), DomainError>;
        }
    }

    fn store() -> Arc<StateStore> {
        Arc::new(StateStore::new(
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(ManualCalendar::new(Utc::now())),
            StateStoreOptions::default(),
        ))
    }

    fn offline() -> DomainError {
        DomainError::Network("offline".to_string())
    }

    #[tokio::test]
    async fn test_sync_to_remote_reports_partial_failure() {
        let mut remote = MockRemote::new();
        remote
            .expect_upsert_favorites()
            .times(1)
            .returning(|_, _| Ok(()));
        remote
            .expect_upsert_collections()
            .times(1)
            .returning(|_, _| Err(offline()));
        remote
            .expect_upsert_streak()
            .times(1)
            .returning(|_, _| Ok(()));
        remote
            .expect_upsert_preferences()
            .times(1)
            .returning(|_, _| Ok(()));

        let service = SyncService::new(store(), Arc::new(remote));
        let report = service.sync_to_remote(&UserId::from("u1")).await;

        assert!(!report.is_complete());
        assert_eq!(report.failed, vec![RemoteField::Collections]);
        assert_eq!(report.succeeded.len(), 3);
        assert!(report.merge.is_none());
    }

    #[tokio::test]
    async fn test_load_from_remote_merges_fetched_fields() {
        let store = store();
        store.toggle_favorite(JokeId::from("a")).await.unwrap();
        store.toggle_favorite(JokeId::from("b")).await.unwrap();

        let mut remote = MockRemote::new();
        remote
            .expect_fetch_favorites()
            .returning(|_| Ok(vec![JokeId::from("b"), JokeId::from("c")]));
        remote
            .expect_fetch_collections()
            .returning(|_| Ok(Vec::new()));
        remote.expect_fetch_streak().returning(|_| {
            Ok(Some(StreakData::restore(
                2,
                5,
                NaiveDate::from_ymd_opt(2024, 1, 1),
                40,
                vec!["streak_3".to_string()],
            )))
        });
        remote
            .expect_fetch_preferences()
            .returning(|_| Err(offline()));

        let service = SyncService::new(store.clone(), Arc::new(remote));
        let report = service.load_from_remote(&UserId::from("u1")).await;

        assert_eq!(report.failed, vec![RemoteField::Preferences]);
        let merge = report.merge.expect("merge report");
        assert_eq!(merge.favorites_added, 1);
        assert!(merge.streak_merged);
        assert!(!merge.preferences_replaced);

        let state = store.snapshot().await;
        assert_eq!(
            state.favorites(),
            &[JokeId::from("a"), JokeId::from("b"), JokeId::from("c")]
        );
        assert_eq!(state.streak().longest_streak(), 5);
        assert!(state.streak().has_badge("streak_3"));
    }

    #[tokio::test]
    async fn test_load_from_remote_all_failed_leaves_state() {
        let store = store();
        store.toggle_favorite(JokeId::from("a")).await.unwrap();
        let before = store.snapshot().await;

        let mut remote = MockRemote::new();
        remote.expect_fetch_favorites().returning(|_| Err(offline()));
        remote.expect_fetch_collections().returning(|_| Err(offline()));
        remote.expect_fetch_streak().returning(|_| Err(offline()));
        remote.expect_fetch_preferences().returning(|_| Err(offline()));

        let service = SyncService::new(store.clone(), Arc::new(remote));
        let report = service.load_from_remote(&UserId::from("u1")).await;

        assert_eq!(report.failed.len(), 4);
        assert_eq!(store.snapshot().await.favorites(), before.favorites());
    }
}
