//! Merge-on-login: fold a remote snapshot into the local state once per
//! session. Each field is merged independently so a partially fetched
//! snapshot still applies whatever arrived.

use log::{info, warn};

use crate::collection::{CollectionBook, JokeCollection};
use crate::preferences::UserPreferences;
use crate::shared::JokeId;
use crate::state::UserState;
use crate::streak::StreakData;

/// Remote mirror of the user's data. `None` means the field was not fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub favorites: Option<Vec<JokeId>>,
    pub collections: Option<Vec<JokeCollection>>,
    pub streak: Option<StreakData>,
    pub preferences: Option<UserPreferences>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub favorites_added: usize,
    pub collections_added: usize,
    pub streak_merged: bool,
    pub preferences_replaced: bool,
}

/// Union, local order first, remote additions appended.
pub fn merge_favorites(local: &[JokeId], remote: &[JokeId]) -> Vec<JokeId> {
    let mut merged = local.to_vec();
    for joke in remote {
        if !merged.contains(joke) {
            merged.push(joke.clone());
        }
    }
    merged
}

/// Append remote collections whose name is not already used locally.
pub fn merge_collections(local: &mut CollectionBook, remote: Vec<JokeCollection>) -> usize {
    let mut added = 0;
    for collection in remote {
        if local.has_name(collection.name()) {
            continue;
        }
        // Remote lists may carry duplicate references.
        local.push(JokeCollection::restore(
            collection.id().clone(),
            collection.name().to_string(),
            collection.emoji().to_string(),
            collection.joke_ids().to_vec(),
            collection.created_at(),
        ));
        added += 1;
    }
    added
}

/// Pairwise max for longest/total, badge union, current streak and last
/// viewed date taken from remote.
pub fn merge_streak(local: &StreakData, remote: &StreakData) -> StreakData {
    if local.current_streak() > remote.current_streak()
        || local.last_viewed_date() > remote.last_viewed_date()
    {
        warn!(
            "[merge] remote streak replaces newer local progress local_current={} local_last={:?} remote_current={} remote_last={:?}",
            local.current_streak(),
            local.last_viewed_date(),
            remote.current_streak(),
            remote.last_viewed_date()
        );
    }

    let mut badges = local.streak_badges().to_vec();
    for badge in remote.streak_badges() {
        if !badges.contains(badge) {
            badges.push(badge.clone());
        }
    }

    StreakData::restore(
        remote.current_streak(),
        local.longest_streak().max(remote.longest_streak()),
        remote.last_viewed_date(),
        local.total_jokes_viewed().max(remote.total_jokes_viewed()),
        badges,
    )
}

pub fn merge_remote(state: &mut UserState, remote: RemoteSnapshot) -> MergeReport {
    let mut report = MergeReport::default();

    if let Some(favorites) = remote.favorites {
        let merged = merge_favorites(state.favorites(), &favorites);
        report.favorites_added = merged.len() - state.favorites().len();
        state.set_favorites(merged);
    }

    if let Some(collections) = remote.collections {
        report.collections_added = merge_collections(state.collections_mut(), collections);
    }

    if let Some(streak) = remote.streak {
        let merged = merge_streak(state.streak(), &streak);
        *state.streak_mut() = merged;
        report.streak_merged = true;
    }

    if let Some(preferences) = remote.preferences {
        state.replace_preferences(preferences);
        report.preferences_replaced = true;
    }

    info!(
        "[merge] favorites_added={} collections_added={} streak_merged={} preferences_replaced={}",
        report.favorites_added,
        report.collections_added,
        report.streak_merged,
        report.preferences_replaced
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Theme;
    use chrono::{NaiveDate, Utc};

    fn joke(id: &str) -> JokeId {
        JokeId::from_string(id)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_favorites_union() {
        let merged = merge_favorites(&[joke("A"), joke("B")], &[joke("B"), joke("C")]);
        assert_eq!(merged, vec![joke("A"), joke("B"), joke("C")]);
    }

    #[test]
    fn test_collections_deduped_by_name() {
        let mut local = CollectionBook::new();
        let local_id = local.create("Puns", "📁", Utc::now()).unwrap();

        let remote = vec![
            JokeCollection::new("Puns", "🎯", Utc::now()).unwrap(),
            JokeCollection::new("Knock knock", "🚪", Utc::now()).unwrap(),
            JokeCollection::new("Knock knock", "🚪", Utc::now()).unwrap(),
        ];

        let added = merge_collections(&mut local, remote);

        assert_eq!(added, 1);
        assert_eq!(local.len(), 2);
        // The local collection keeps its own id and emoji
        assert_eq!(local.get(&local_id).unwrap().emoji(), "📁");
    }

    #[test]
    fn test_remote_collection_duplicate_refs_dropped() {
        let remote: JokeCollection = serde_json::from_str(
            r#"{"id":"c1","name":"Dupes","emoji":"📁","jokeIds":["a","a","b"],"createdAt":"2024-05-01T00:00:00Z"}"#,
        )
        .unwrap();
        let mut local = CollectionBook::new();

        merge_collections(&mut local, vec![remote]);

        assert_eq!(local.all()[0].joke_ids(), &[joke("a"), joke("b")]);
    }

    #[test]
    fn test_streak_merge_rules() {
        let local = StreakData::restore(
            5,
            8,
            Some(day(20)),
            40,
            vec!["streak_3".to_string(), "streak_7".to_string()],
        );
        let remote = StreakData::restore(2, 6, Some(day(18)), 55, vec!["streak_3".to_string()]);

        let merged = merge_streak(&local, &remote);

        assert_eq!(merged.longest_streak(), 8);
        assert_eq!(merged.total_jokes_viewed(), 55);
        assert_eq!(merged.streak_badges(), &["streak_3", "streak_7"]);
        // Remote wins for the in-progress fields
        assert_eq!(merged.current_streak(), 2);
        assert_eq!(merged.last_viewed_date(), Some(day(18)));
    }

    #[test]
    fn test_merge_remote_applies_available_fields_only() {
        let mut state = UserState::new();
        state.toggle_favorite(joke("A"));
        state.toggle_favorite(joke("B"));
        let local_prefs = state.preferences().clone();

        let report = merge_remote(
            &mut state,
            RemoteSnapshot {
                favorites: Some(vec![joke("B"), joke("C")]),
                ..Default::default()
            },
        );

        assert_eq!(report.favorites_added, 1);
        assert!(!report.streak_merged);
        assert!(!report.preferences_replaced);
        assert_eq!(state.favorites(), &[joke("A"), joke("B"), joke("C")]);
        assert_eq!(state.preferences(), &local_prefs);
    }

    #[test]
    fn test_remote_preferences_overwrite_local() {
        let mut state = UserState::new();
        let remote_prefs = UserPreferences {
            theme: Theme::Dark,
            notifications_enabled: false,
            ..Default::default()
        };

        let report = merge_remote(
            &mut state,
            RemoteSnapshot {
                preferences: Some(remote_prefs.clone()),
                ..Default::default()
            },
        );

        assert!(report.preferences_replaced);
        assert_eq!(state.preferences(), &remote_prefs);
    }

    #[test]
    fn test_remote_preferences_win_with_blank_categories_dropped() {
        let mut state = UserState::new();
        let report = merge_remote(
            &mut state,
            RemoteSnapshot {
                preferences: Some(UserPreferences {
                    theme: Theme::Dark,
                    preferred_categories: vec![" ".to_string(), "puns".to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        assert!(report.preferences_replaced);
        assert_eq!(state.preferences().theme, Theme::Dark);
        assert_eq!(state.preferences().preferred_categories, vec!["puns".to_string()]);
    }

    #[test]
    fn test_remote_current_above_both_longest_raises_longest() {
        let local = StreakData::restore(3, 4, Some(day(10)), 20, Vec::new());
        let remote = StreakData::restore(10, 6, Some(day(12)), 30, Vec::new());

        let merged = merge_streak(&local, &remote);

        assert_eq!(merged.current_streak(), 10);
        assert_eq!(merged.longest_streak(), 10);
        assert!(merged.longest_streak() >= merged.current_streak());
    }
}
