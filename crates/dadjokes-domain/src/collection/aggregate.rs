use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::shared::{CollectionId, DomainError, JokeId};

pub const DEFAULT_COLLECTION_EMOJI: &str = "📁";
const MAX_NAME_LEN: usize = 60;

/// A named list of joke references. Jokes are referenced by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JokeCollection {
    id: CollectionId,
    name: String,
    emoji: String,
    joke_ids: Vec<JokeId>,
    created_at: DateTime<Utc>,
}

impl JokeCollection {
    pub fn new(name: &str, emoji: &str, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(Self {
            id: CollectionId::new(),
            name: validate_name(name)?,
            emoji: normalize_emoji(emoji),
            joke_ids: Vec::new(),
            created_at: now,
        })
    }

    /// Reconstruct from persistence. Duplicate references are dropped.
    pub fn restore(
        id: CollectionId,
        name: String,
        emoji: String,
        joke_ids: Vec<JokeId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut unique: Vec<JokeId> = Vec::with_capacity(joke_ids.len());
        for joke in joke_ids {
            if !unique.contains(&joke) {
                unique.push(joke);
            }
        }

        Self {
            id,
            name,
            emoji,
            joke_ids: unique,
            created_at,
        }
    }

    pub fn id(&self) -> &CollectionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    pub fn joke_ids(&self) -> &[JokeId] {
        &self.joke_ids
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn contains(&self, joke: &JokeId) -> bool {
        self.joke_ids.contains(joke)
    }

    /// Returns false if the joke was already present.
    pub fn add_ref(&mut self, joke: JokeId) -> bool {
        if self.contains(&joke) {
            return false;
        }
        self.joke_ids.push(joke);
        true
    }

    /// Returns false if the joke was not present.
    pub fn remove_ref(&mut self, joke: &JokeId) -> bool {
        let before = self.joke_ids.len();
        self.joke_ids.retain(|j| j != joke);
        self.joke_ids.len() != before
    }

    pub fn rename(&mut self, name: &str) -> Result<(), DomainError> {
        self.name = validate_name(name)?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "Collection name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "Collection name cannot exceed {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn normalize_emoji(emoji: &str) -> String {
    let emoji = emoji.trim();
    if emoji.is_empty() {
        DEFAULT_COLLECTION_EMOJI.to_string()
    } else {
        emoji.to_string()
    }
}

/// All collections owned by the user, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionBook {
    collections: Vec<JokeCollection>,
}

impl CollectionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(collections: Vec<JokeCollection>) -> Self {
        Self { collections }
    }

    pub fn all(&self) -> &[JokeCollection] {
        &self.collections
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn get(&self, id: &CollectionId) -> Option<&JokeCollection> {
        self.collections.iter().find(|c| c.id() == id)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.collections.iter().any(|c| c.name() == name.trim())
    }

    pub fn create(
        &mut self,
        name: &str,
        emoji: &str,
        now: DateTime<Utc>,
    ) -> Result<CollectionId, DomainError> {
        let collection = JokeCollection::new(name, emoji, now)?;
        let id = collection.id().clone();
        info!("[collection] created id={} name={}", id, collection.name());
        self.collections.push(collection);
        Ok(id)
    }

    /// Append an already-built collection (used by merge-on-login).
    pub fn push(&mut self, collection: JokeCollection) {
        self.collections.push(collection);
    }

    pub fn add_ref(&mut self, id: &CollectionId, joke: JokeId) -> Result<bool, DomainError> {
        Ok(self.get_mut(id)?.add_ref(joke))
    }

    pub fn remove_ref(&mut self, id: &CollectionId, joke: &JokeId) -> Result<bool, DomainError> {
        Ok(self.get_mut(id)?.remove_ref(joke))
    }

    pub fn rename(&mut self, id: &CollectionId, name: &str) -> Result<(), DomainError> {
        self.get_mut(id)?.rename(name)
    }

    /// Removes the collection only; referenced jokes are unaffected.
    pub fn delete(&mut self, id: &CollectionId) -> Result<JokeCollection, DomainError> {
        let index = self
            .collections
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| DomainError::NotFound(format!("Collection {}", id)))?;
        let removed = self.collections.remove(index);
        info!("[collection] deleted id={} name={}", id, removed.name());
        Ok(removed)
    }

    fn get_mut(&mut self, id: &CollectionId) -> Result<&mut JokeCollection, DomainError> {
        self.collections
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| DomainError::NotFound(format!("Collection {}", id)))
    }
}
