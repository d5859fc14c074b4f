use dadjokes_domain::shared::DomainError;
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

use super::ResultExt;

/// Snapshot writes are serialized by the state store, so a small pool is
/// enough; the extra connections serve concurrent reads.
const MAX_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the on-device database in WAL mode.
    pub async fn new(db_path: &Path) -> Result<Self, DomainError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).infra_context("Failed to create DB directory")?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .infra_context("Failed to open database")?;

        info!("[db] opened {}", db_path.display());
        Ok(Self { pool })
    }

    /// Private in-memory database; a single connection so every query sees
    /// the same data.
    pub async fn in_memory() -> Result<Self, DomainError> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .infra_context("Failed to open in-memory database")?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .infra_context("Failed to run migrations")
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
