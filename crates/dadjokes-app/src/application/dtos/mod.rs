mod achievement_dto;
mod status_dto;

pub use achievement_dto::AchievementDto;
pub use status_dto::{StatusDto, StreakDto};
