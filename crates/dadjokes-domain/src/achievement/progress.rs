use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use super::catalog::{AchievementDefinition, Metric, ACHIEVEMENTS};

/// Snapshot of the counters achievements are measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AchievementCounters {
    pub views: u64,
    pub shares: u64,
    pub favorites: u64,
    pub categories: u64,
    pub collections: u64,
    pub streak: u64,
}

impl AchievementCounters {
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Views => self.views,
            Metric::Shares => self.shares,
            Metric::Favorites => self.favorites,
            Metric::Categories => self.categories,
            Metric::Collections => self.collections,
            Metric::Streak => self.streak,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    id: String,
    progress: u32,
    unlocked_at: Option<DateTime<Utc>>,
}

impl AchievementProgress {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            progress: 0,
            unlocked_at: None,
        }
    }

    pub fn restore(id: String, progress: u32, unlocked_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            progress,
            unlocked_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn unlocked_at(&self) -> Option<DateTime<Utc>> {
        self.unlocked_at
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    /// Returns true when this call unlocked the achievement.
    fn update(
        &mut self,
        definition: &AchievementDefinition,
        counter: u64,
        now: DateTime<Utc>,
    ) -> bool {
        if self.unlocked_at.is_some() {
            // Unlocks are permanent.
            self.progress = definition.target;
            return false;
        }

        self.progress = counter.min(definition.target as u64) as u32;
        if self.progress == definition.target {
            self.unlocked_at = Some(now);
            return true;
        }
        false
    }
}

/// Per-user progress over the achievement catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementBook {
    entries: Vec<AchievementProgress>,
}

impl AchievementBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(entries: Vec<AchievementProgress>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AchievementProgress] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&AchievementProgress> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn unlocked_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_unlocked()).count()
    }

    /// Recompute every achievement from `counters`.
    ///
    /// Returns the definitions unlocked by this call, in catalog order.
    pub fn recheck(
        &mut self,
        counters: &AchievementCounters,
        now: DateTime<Utc>,
    ) -> Vec<&'static AchievementDefinition> {
        let mut unlocked = Vec::new();

        for definition in ACHIEVEMENTS {
            let index = match self.entries.iter().position(|e| e.id == definition.id) {
                Some(index) => index,
                None => {
                    self.entries.push(AchievementProgress::new(definition.id));
                    self.entries.len() - 1
                }
            };

            let counter = counters.get(definition.metric);
            if self.entries[index].update(definition, counter, now) {
                info!(
                    "[achievement] unlocked id={} metric={} target={}",
                    definition.id, definition.metric, definition.target
                );
                unlocked.push(definition);
            }
        }

        unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievement::definition;
    use chrono::Duration;

    fn counters() -> AchievementCounters {
        AchievementCounters::default()
    }

    #[test]
    fn test_recheck_tracks_every_definition() {
        let mut book = AchievementBook::new();
        let unlocked = book.recheck(&counters(), Utc::now());

        assert!(unlocked.is_empty());
        assert_eq!(book.entries().len(), ACHIEVEMENTS.len());
        assert!(book.entries().iter().all(|e| e.progress() == 0));
    }

    #[test]
    fn test_progress_clamped_and_unlocked_once() {
        let mut book = AchievementBook::new();
        let first = Utc::now();

        let unlocked = book.recheck(
            &AchievementCounters {
                views: 12,
                ..counters()
            },
            first,
        );
        let ids: Vec<_> = unlocked.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["first_laugh", "warming_up"]);

        let warming_up = book.get("warming_up").unwrap();
        assert_eq!(warming_up.progress(), 10);
        assert_eq!(warming_up.unlocked_at(), Some(first));
        assert_eq!(book.get("joke_enthusiast").unwrap().progress(), 12);

        // A later recheck does not re-stamp
        let later = first + Duration::hours(3);
        let unlocked = book.recheck(
            &AchievementCounters {
                views: 13,
                ..counters()
            },
            later,
        );
        assert!(unlocked.is_empty());
        assert_eq!(book.get("warming_up").unwrap().unlocked_at(), Some(first));
    }

    #[test]
    fn test_unlock_survives_counter_regression() {
        let mut book = AchievementBook::new();
        book.recheck(
            &AchievementCounters {
                favorites: 10,
                ..counters()
            },
            Utc::now(),
        );
        assert!(book.get("collector").unwrap().is_unlocked());

        book.recheck(
            &AchievementCounters {
                favorites: 4,
                ..counters()
            },
            Utc::now(),
        );

        let collector = book.get("collector").unwrap();
        assert!(collector.is_unlocked());
        assert_eq!(collector.progress(), 10);
        // Not-yet-unlocked entries follow the counter down
        assert_eq!(book.get("curator").unwrap().progress(), 4);
    }

    #[test]
    fn test_progress_invariants_hold() {
        let mut book = AchievementBook::new();
        for step in [0u64, 3, 1, 40, 7, 200, 2] {
            book.recheck(
                &AchievementCounters {
                    views: step,
                    shares: step / 2,
                    favorites: step,
                    categories: step % 9,
                    collections: step % 6,
                    streak: step / 3,
                },
                Utc::now(),
            );

            for entry in book.entries() {
                let target = definition(entry.id()).unwrap().target;
                assert!(entry.progress() <= target);
                assert_eq!(entry.is_unlocked(), entry.progress() == target);
            }
        }
    }

    #[test]
    fn test_unlocked_count() {
        let mut book = AchievementBook::new();
        book.recheck(
            &AchievementCounters {
                collections: 1,
                streak: 3,
                ..counters()
            },
            Utc::now(),
        );
        assert_eq!(book.unlocked_count(), 2);
    }
}
