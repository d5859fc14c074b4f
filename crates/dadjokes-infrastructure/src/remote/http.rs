use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::config::RemoteConfig;
use dadjokes_domain::collection::JokeCollection;
use dadjokes_domain::preferences::UserPreferences;
use dadjokes_domain::remote::{RemoteField, RemoteStore};
use dadjokes_domain::shared::{DomainError, JokeId, UserId};
use dadjokes_domain::streak::StreakData;

/// JSON-over-HTTP remote store.
///
/// Each field lives at `{base}/users/{user_id}/{field}`; GET fetches it and
/// PUT replaces it. A 404 means the user has no record yet.
pub struct HttpRemoteStore {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(
        base_url: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::Infrastructure(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Returns `None` when no base URL is configured.
    pub fn from_config(config: &RemoteConfig) -> anyhow::Result<Option<Self>> {
        let Some(base_url) = config.parsed_base_url()? else {
            return Ok(None);
        };
        let store = Self::new(base_url, config.api_key.clone(), config.timeout())?;
        Ok(Some(store))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, user: &UserId, field: RemoteField) -> Result<Url, DomainError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                DomainError::Infrastructure(format!("Invalid remote base URL: {}", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["users", user.as_str(), field.as_str()]);
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        user: &UserId,
        field: RemoteField,
    ) -> Result<Option<T>, DomainError> {
        let url = self.endpoint(user, field)?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| DomainError::Network(format!("GET {} failed: {}", field, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DomainError::Network(format!(
                "GET {} returned status {}",
                field,
                response.status()
            )));
        }

        let value = response.json::<T>().await.map_err(|e| {
            DomainError::Deserialization(format!("Invalid {} payload: {}", field, e))
        })?;
        Ok(Some(value))
    }

    async fn put_json<T: Serialize + ?Sized + Sync>(
        &self,
        user: &UserId,
        field: RemoteField,
        body: &T,
    ) -> Result<(), DomainError> {
        let url = self.endpoint(user, field)?;
        let response = self
            .authorize(self.client.put(url))
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::Network(format!("PUT {} failed: {}", field, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DomainError::Network(format!(
                "PUT {} returned status {}: {}",
                field, status, text
            )));
        }

        log::debug!("[remote] pushed {} for user {}", field, user);
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_favorites(&self, user: &UserId) -> Result<Vec<JokeId>, DomainError> {
        Ok(self
            .get_json(user, RemoteField::Favorites)
            .await?
            .unwrap_or_default())
    }

    async fn fetch_collections(&self, user: &UserId) -> Result<Vec<JokeCollection>, DomainError> {
        Ok(self
            .get_json(user, RemoteField::Collections)
            .await?
            .unwrap_or_default())
    }

    async fn fetch_streak(&self, user: &UserId) -> Result<Option<StreakData>, DomainError> {
        self.get_json(user, RemoteField::Streak).await
    }

    async fn fetch_preferences(
        &self,
        user: &UserId,
    ) -> Result<Option<UserPreferences>, DomainError> {
        self.get_json(user, RemoteField::Preferences).await
    }

    async fn upsert_favorites(
        &self,
        user: &UserId,
        favorites: &[JokeId],
    ) -> Result<(), DomainError> {
        self.put_json(user, RemoteField::Favorites, favorites).await
    }

    async fn upsert_collections(
        &self,
        user: &UserId,
        collections: &[JokeCollection],
    ) -> Result<(), DomainError> {
        self.put_json(user, RemoteField::Collections, collections)
            .await
    }

    async fn upsert_streak(&self, user: &UserId, streak: &StreakData) -> Result<(), DomainError> {
        self.put_json(user, RemoteField::Streak, streak).await
    }

    async fn upsert_preferences(
        &self,
        user: &UserId,
        preferences: &UserPreferences,
    ) -> Result<(), DomainError> {
        self.put_json(user, RemoteField::Preferences, preferences)
            .await
    }
}
