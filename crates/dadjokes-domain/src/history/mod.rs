use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::JokeId;

pub const DEFAULT_HISTORY_LIMIT: usize = 500;
pub const DEFAULT_HISTORY_RETENTION_DAYS: u32 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JokeHistoryEntry {
    pub joke_id: JokeId,
    pub viewed_on: NaiveDate,
    pub viewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub max_entries: usize,
    pub retention_days: u32,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_HISTORY_LIMIT,
            retention_days: DEFAULT_HISTORY_RETENTION_DAYS,
        }
    }
}

/// Viewing log, newest first, at most one entry per joke per day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JokeHistory {
    entries: Vec<JokeHistoryEntry>,
}

impl JokeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(entries: Vec<JokeHistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[JokeHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(
        &mut self,
        joke: JokeId,
        now: DateTime<Utc>,
        today: NaiveDate,
        limits: HistoryLimits,
    ) {
        self.entries
            .retain(|e| !(e.joke_id == joke && e.viewed_on == today));
        self.entries.insert(
            0,
            JokeHistoryEntry {
                joke_id: joke,
                viewed_on: today,
                viewed_at: now,
            },
        );
        self.prune(today, limits);
    }

    /// Drop entries outside the retention window, then cap the length.
    /// A window reaching past the calendar's range keeps every entry.
    pub fn prune(&mut self, today: NaiveDate, limits: HistoryLimits) {
        let window = Duration::try_days(limits.retention_days as i64);
        if let Some(cutoff) = window.and_then(|w| today.checked_sub_signed(w)) {
            self.entries.retain(|e| e.viewed_on > cutoff);
        }
        self.entries.truncate(limits.max_entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
