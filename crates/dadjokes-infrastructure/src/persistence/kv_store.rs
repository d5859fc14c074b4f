use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sqlx::SqlitePool;
use std::sync::Arc;

use super::ResultExt;
use dadjokes_domain::shared::DomainError;
use dadjokes_domain::storage::KeyValueStore;

pub struct SqliteKeyValueStore {
    pool: Arc<SqlitePool>,
}

impl SqliteKeyValueStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let query = "SELECT value FROM kv_store WHERE key = ?1";

        sqlx::query_scalar::<_, String>(query)
            .bind(key)
            .fetch_optional(&*self.pool)
            .await
            .to_repo_err()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
        "#;

        sqlx::query(query)
            .bind(key)
            .bind(value)
            .bind(Utc::now())
            .execute(&*self.pool)
            .await
            .to_repo_err()?;

        debug!("[kv] set key={} bytes={}", key, value.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&*self.pool)
            .await
            .to_repo_err()?;

        debug!("[kv] delete key={}", key);
        Ok(())
    }
}
