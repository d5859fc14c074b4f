mod reminder_service;
mod state_store;
mod sync_service;

pub use reminder_service::ReminderService;
pub use state_store::{Applied, StateStore, StateStoreOptions, STATE_KEY};
pub use sync_service::{SyncReport, SyncService};
