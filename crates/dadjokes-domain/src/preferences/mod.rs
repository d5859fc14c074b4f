use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub notifications_enabled: bool,
    pub reminder_time: NaiveTime,
    pub preferred_categories: Vec<String>,
    pub theme: Theme,
    pub haptics_enabled: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            reminder_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            preferred_categories: Vec::new(),
            theme: Theme::System,
            haptics_enabled: true,
        }
    }
}

impl UserPreferences {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self
            .preferred_categories
            .iter()
            .any(|c| c.trim().is_empty())
        {
            return Err(DomainError::InvalidInput(
                "Preferred categories cannot be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Same preferences without blank or padded category names.
    pub fn sanitized(mut self) -> Self {
        self.preferred_categories = self
            .preferred_categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }
}
