use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::DomainError;

pub const DEFAULT_TRIAL_DAYS: u32 = 7;

/// Features gated behind a subscription or trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumFeature {
    Library,
    History,
    Achievements,
    Collections,
    Export,
}

impl PremiumFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumFeature::Library => "library",
            PremiumFeature::History => "history",
            PremiumFeature::Achievements => "achievements",
            PremiumFeature::Collections => "collections",
            PremiumFeature::Export => "export",
        }
    }
}

impl fmt::Display for PremiumFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Free,
    Trial,
    Premium,
}

/// Subscription-derived access. The trial can be started once per account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entitlement {
    premium: bool,
    trial_started_at: Option<DateTime<Utc>>,
    trial_expires_at: Option<DateTime<Utc>>,
}

impl Entitlement {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn premium() -> Self {
        Self {
            premium: true,
            ..Self::default()
        }
    }

    pub fn restore(
        premium: bool,
        trial_started_at: Option<DateTime<Utc>>,
        trial_expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            premium,
            trial_started_at,
            trial_expires_at,
        }
    }

    pub fn is_premium(&self) -> bool {
        self.premium
    }

    pub fn trial_used(&self) -> bool {
        self.trial_started_at.is_some()
    }

    pub fn trial_expires_at(&self) -> Option<DateTime<Utc>> {
        self.trial_expires_at
    }

    pub fn is_trial_active(&self, now: DateTime<Utc>) -> bool {
        self.trial_expires_at.is_some_and(|expires| now < expires)
    }

    pub fn access_level(&self, now: DateTime<Utc>) -> AccessLevel {
        if self.premium {
            AccessLevel::Premium
        } else if self.is_trial_active(now) {
            AccessLevel::Trial
        } else {
            AccessLevel::Free
        }
    }

    pub fn is_entitled(&self, _feature: PremiumFeature, now: DateTime<Utc>) -> bool {
        // Every premium feature is unlocked by either a subscription or a trial.
        self.access_level(now) != AccessLevel::Free
    }

    pub fn require(&self, feature: PremiumFeature, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_entitled(feature, now) {
            Ok(())
        } else {
            Err(DomainError::NotEntitled(feature.to_string()))
        }
    }

    pub fn start_trial(
        &mut self,
        now: DateTime<Utc>,
        days: u32,
    ) -> Result<DateTime<Utc>, DomainError> {
        if self.trial_used() {
            return Err(DomainError::TrialAlreadyUsed(format!(
                "trial started at {}",
                self.trial_started_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default()
            )));
        }
        if days == 0 {
            return Err(DomainError::InvalidInput(
                "Trial length must be at least one day".to_string(),
            ));
        }

        let expires = Duration::try_days(days as i64)
            .and_then(|length| now.checked_add_signed(length))
            .ok_or_else(|| {
                DomainError::InvalidInput(format!("Trial length of {} days is out of range", days))
            })?;
        self.trial_started_at = Some(now);
        self.trial_expires_at = Some(expires);
        info!("[entitlement] trial started, expires at {}", expires);
        Ok(expires)
    }

    pub fn set_premium(&mut self, premium: bool) {
        if self.premium != premium {
            info!("[entitlement] premium changed to {}", premium);
        }
        self.premium = premium;
    }
}
