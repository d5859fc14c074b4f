// Domain layer - Pure business logic
// No dependencies on infrastructure or application layers

pub mod achievement;
pub mod calendar;
pub mod collection;
pub mod entitlement;
pub mod history;
pub mod merge;
pub mod notification;
pub mod preferences;
pub mod remote;
pub mod shared;
pub mod state;
pub mod storage;
pub mod streak;

// Re-exports for convenience
pub use shared::{CollectionId, DomainError, JokeId, UserId};
pub use state::UserState;
