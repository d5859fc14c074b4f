use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::services::{ReminderService, StateStore, StateStoreOptions, SyncService};
use crate::presentation::state::{Adapters, AppState, Runtime, Services};
use dadjokes_domain::notification::NotificationScheduler;
use dadjokes_domain::remote::RemoteStore;
use dadjokes_domain::storage::KeyValueStore;
use dadjokes_infrastructure::config::AppConfig;
use dadjokes_infrastructure::logging;
use dadjokes_infrastructure::notification::{LogNotificationSender, TokioNotificationScheduler};
use dadjokes_infrastructure::persistence::{Database, SqliteKeyValueStore};
use dadjokes_infrastructure::remote::{HttpRemoteStore, InMemoryRemoteStore};

/// Start file logging, falling back to stderr when the log directory is
/// unusable.
pub fn init_logging(config: &AppConfig) {
    let log_dir = config.log_dir();
    match logging::init_logger(&log_dir, config.log_level) {
        Ok(()) => {
            info!("File logging initialized at: {}", log_dir.display());
        }
        Err(e) => {
            eprintln!("Failed to initialize file logging: {}", e);
            eprintln!("Falling back to console logging only");

            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        tracing_subscriber::EnvFilter::new(config.log_level.as_str())
                    }),
                )
                .with_writer(std::io::stderr)
                .with_target(true)
                .try_init();
        }
    }
}

pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let startup_started_at = Instant::now();
    config.validate()?;

    let calendar = config.calendar()?;

    let db_path = config.db_path();
    info!("Database path: {}", db_path.display());

    let started_at = Instant::now();
    let database = Database::new(&db_path).await?;
    database.run_migrations().await?;
    info!(
        "✓ Database ready ({}ms)",
        started_at.elapsed().as_millis()
    );
    let database = Arc::new(database);
    let pool = Arc::new(database.pool().clone());

    let kv = Arc::new(SqliteKeyValueStore::new(pool)) as Arc<dyn KeyValueStore>;

    let remote = match HttpRemoteStore::from_config(&config.remote)? {
        Some(http) => {
            info!("Remote store: {}", http.base_url());
            Arc::new(http) as Arc<dyn RemoteStore>
        }
        None => {
            info!("Remote store: none configured, using in-memory mirror");
            Arc::new(InMemoryRemoteStore::new()) as Arc<dyn RemoteStore>
        }
    };

    let scheduler = Arc::new(TokioNotificationScheduler::new(
        Arc::new(LogNotificationSender::new()),
        calendar.clone(),
    )) as Arc<dyn NotificationScheduler>;

    let options = StateStoreOptions {
        auto_save: config.auto_save,
        history_limits: config.history_limits(),
        trial_days: config.trial_days,
    };
    let store = Arc::new(StateStore::new(kv.clone(), calendar.clone(), options));
    let sync = Arc::new(SyncService::new(store.clone(), remote.clone()));
    let reminders = Arc::new(ReminderService::new(scheduler.clone(), calendar.clone()));

    info!(
        "✓ App state built ({}ms)",
        startup_started_at.elapsed().as_millis()
    );

    Ok(AppState {
        config,
        runtime: Runtime {
            db: database,
            calendar,
        },
        adapters: Adapters {
            kv,
            remote,
            scheduler,
        },
        services: Services {
            store,
            sync,
            reminders,
        },
    })
}
