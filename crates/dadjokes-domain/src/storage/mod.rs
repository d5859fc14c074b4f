use async_trait::async_trait;

use crate::shared::DomainError;

/// Durable string key-value storage on the device.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Insert or replace the value for `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
}
