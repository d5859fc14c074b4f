mod catalog;
mod progress;

pub use catalog::{definition, AchievementDefinition, Metric, ACHIEVEMENTS};
pub use progress::{AchievementBook, AchievementCounters, AchievementProgress};
