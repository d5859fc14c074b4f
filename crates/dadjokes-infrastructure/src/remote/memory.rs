use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use dadjokes_domain::collection::JokeCollection;
use dadjokes_domain::preferences::UserPreferences;
use dadjokes_domain::remote::{RemoteField, RemoteStore};
use dadjokes_domain::shared::{DomainError, JokeId, UserId};
use dadjokes_domain::streak::StreakData;

#[derive(Debug, Clone, Default)]
struct UserRecord {
    favorites: Vec<JokeId>,
    collections: Vec<JokeCollection>,
    streak: Option<StreakData>,
    preferences: Option<UserPreferences>,
}

/// Process-local remote store. Used when no backend is configured and in
/// tests, where individual fields can be made to fail.
#[derive(Default)]
pub struct InMemoryRemoteStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
    failing: RwLock<HashSet<RemoteField>>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent call touching `field` fails with a network error.
    pub async fn fail_on(&self, field: RemoteField) {
        self.failing.write().await.insert(field);
    }

    pub async fn recover(&self, field: RemoteField) {
        self.failing.write().await.remove(&field);
    }

    async fn check(&self, field: RemoteField) -> Result<(), DomainError> {
        if self.failing.read().await.contains(&field) {
            return Err(DomainError::Network(format!("{} unavailable", field)));
        }
        Ok(())
    }

    async fn read<T>(
        &self,
        user: &UserId,
        field: RemoteField,
        pick: impl FnOnce(&UserRecord) -> T,
        empty: T,
    ) -> Result<T, DomainError> {
        self.check(field).await?;
        let users = self.users.read().await;
        Ok(users.get(user).map(pick).unwrap_or(empty))
    }

    async fn write(
        &self,
        user: &UserId,
        field: RemoteField,
        apply: impl FnOnce(&mut UserRecord),
    ) -> Result<(), DomainError> {
        self.check(field).await?;
        let mut users = self.users.write().await;
        apply(users.entry(user.clone()).or_default());
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn fetch_favorites(&self, user: &UserId) -> Result<Vec<JokeId>, DomainError> {
        self.read(user, RemoteField::Favorites, |r| r.favorites.clone(), Vec::new())
            .await
    }

    async fn fetch_collections(&self, user: &UserId) -> Result<Vec<JokeCollection>, DomainError> {
        self.read(
            user,
            RemoteField::Collections,
            |r| r.collections.clone(),
            Vec::new(),
        )
        .await
    }

    async fn fetch_streak(&self, user: &UserId) -> Result<Option<StreakData>, DomainError> {
        self.read(user, RemoteField::Streak, |r| r.streak.clone(), None)
            .await
    }

    async fn fetch_preferences(
        &self,
        user: &UserId,
    ) -> Result<Option<UserPreferences>, DomainError> {
        self.read(
            user,
            RemoteField::Preferences,
            |r| r.preferences.clone(),
            None,
        )
        .await
    }

    async fn upsert_favorites(
        &self,
        user: &UserId,
        favorites: &[JokeId],
    ) -> Result<(), DomainError> {
        let favorites = favorites.to_vec();
        self.write(user, RemoteField::Favorites, move |r| r.favorites = favorites)
            .await
    }

    async fn upsert_collections(
        &self,
        user: &UserId,
        collections: &[JokeCollection],
    ) -> Result<(), DomainError> {
        let collections = collections.to_vec();
        self.write(user, RemoteField::Collections, move |r| {
            r.collections = collections
        })
        .await
    }

    async fn upsert_streak(&self, user: &UserId, streak: &StreakData) -> Result<(), DomainError> {
        let streak = streak.clone();
        self.write(user, RemoteField::Streak, move |r| r.streak = Some(streak))
            .await
    }

    async fn upsert_preferences(
        &self,
        user: &UserId,
        preferences: &UserPreferences,
    ) -> Result<(), DomainError> {
        let preferences = preferences.clone();
        self.write(user, RemoteField::Preferences, move |r| {
            r.preferences = Some(preferences)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_is_empty() {
        let store = InMemoryRemoteStore::new();
        let user = UserId::from("nobody");
        assert!(store.fetch_favorites(&user).await.unwrap().is_empty());
        assert!(store.fetch_streak(&user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_field() {
        let store = InMemoryRemoteStore::new();
        let user = UserId::from("u");
        store
            .upsert_favorites(&user, &[JokeId::from("a"), JokeId::from("b")])
            .await
            .unwrap();
        store
            .upsert_favorites(&user, &[JokeId::from("c")])
            .await
            .unwrap();
        assert_eq!(
            store.fetch_favorites(&user).await.unwrap(),
            vec![JokeId::from("c")]
        );
    }

    #[tokio::test]
    async fn test_failure_injection_is_per_field() {
        let store = InMemoryRemoteStore::new();
        let user = UserId::from("u");
        store.fail_on(RemoteField::Streak).await;

        let err = store.fetch_streak(&user).await.unwrap_err();
        assert!(matches!(err, DomainError::Network(_)));
        assert!(store.fetch_favorites(&user).await.is_ok());

        store.recover(RemoteField::Streak).await;
        assert!(store.fetch_streak(&user).await.is_ok());
    }
}
