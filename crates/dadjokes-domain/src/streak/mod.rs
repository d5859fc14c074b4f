mod aggregate;
mod value_objects;


pub use aggregate::StreakData;
pub use value_objects::{badge_for, BadgeDefinition, StreakTransition, StreakUpdate, STREAK_BADGES};
