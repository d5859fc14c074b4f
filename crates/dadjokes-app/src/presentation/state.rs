use std::sync::Arc;

use crate::application::services::{ReminderService, StateStore, SyncService};
use dadjokes_domain::calendar::Calendar;
use dadjokes_domain::notification::NotificationScheduler;
use dadjokes_domain::remote::RemoteStore;
use dadjokes_domain::storage::KeyValueStore;
use dadjokes_infrastructure::config::AppConfig;
use dadjokes_infrastructure::persistence::Database;

pub struct Runtime {
    pub db: Arc<Database>,
    pub calendar: Arc<dyn Calendar>,
}

pub struct Adapters {
    pub kv: Arc<dyn KeyValueStore>,
    pub remote: Arc<dyn RemoteStore>,
    pub scheduler: Arc<dyn NotificationScheduler>,
}

pub struct Services {
    pub store: Arc<StateStore>,
    pub sync: Arc<SyncService>,
    pub reminders: Arc<ReminderService>,
}

pub struct AppState {
    pub config: AppConfig,
    pub runtime: Runtime,
    pub adapters: Adapters,
    pub services: Services,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        crate::presentation::bootstrap::build_app_state(config).await
    }
}
