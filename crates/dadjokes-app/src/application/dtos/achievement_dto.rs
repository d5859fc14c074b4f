use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dadjokes_domain::achievement::ACHIEVEMENTS;
use dadjokes_domain::state::UserState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub metric: String,
    pub progress: u32,
    pub target: u32,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl AchievementDto {
    /// The full catalog with this user's progress, in catalog order.
    pub fn list(state: &UserState) -> Vec<Self> {
        ACHIEVEMENTS
            .iter()
            .map(|def| {
                let entry = state.achievements().get(def.id);
                Self {
                    id: def.id.to_string(),
                    title: def.title.to_string(),
                    description: def.description.to_string(),
                    metric: def.metric.as_str().to_string(),
                    progress: entry.map(|e| e.progress()).unwrap_or(0),
                    target: def.target,
                    unlocked_at: entry.and_then(|e| e.unlocked_at()),
                }
            })
            .collect()
    }
}
