#![allow(dead_code)]

use sqlx::SqlitePool;
use std::sync::Arc;

use dadjokes_infrastructure::persistence::Database;

pub async fn setup_in_memory_db() -> Arc<SqlitePool> {
    let db = Database::in_memory().await.expect("open in-memory db");
    db.run_migrations().await.expect("run migrations");
    Arc::new(db.pool().clone())
}
