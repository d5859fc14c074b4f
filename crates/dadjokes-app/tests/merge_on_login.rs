use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use dadjokes_app::application::services::{StateStore, StateStoreOptions, SyncService};
use dadjokes_domain::calendar::ManualCalendar;
use dadjokes_domain::collection::JokeCollection;
use dadjokes_domain::preferences::{Theme, UserPreferences};
use dadjokes_domain::remote::{RemoteField, RemoteStore};
use dadjokes_domain::shared::{JokeId, UserId};
use dadjokes_domain::streak::StreakData;
use dadjokes_infrastructure::persistence::InMemoryKeyValueStore;
use dadjokes_infrastructure::remote::InMemoryRemoteStore;

fn local_store() -> Arc<StateStore> {
    Arc::new(StateStore::new(
        Arc::new(InMemoryKeyValueStore::new()),
        Arc::new(ManualCalendar::new(Utc::now())),
        StateStoreOptions::default(),
    ))
}

#[tokio::test]
async fn favorites_union_on_login() {
    let user = UserId::from("u1");
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote
        .upsert_favorites(&user, &[JokeId::from("B"), JokeId::from("C")])
        .await
        .unwrap();

    let store = local_store();
    store.toggle_favorite(JokeId::from("A")).await.unwrap();
    store.toggle_favorite(JokeId::from("B")).await.unwrap();

    let sync = SyncService::new(store.clone(), remote);
    let report = sync.load_from_remote(&user).await;

    assert!(report.is_complete());
    assert_eq!(
        store.snapshot().await.favorites(),
        &[JokeId::from("A"), JokeId::from("B"), JokeId::from("C")]
    );
}

#[tokio::test]
async fn collections_dedupe_by_name_and_preferences_overwrite() {
    let user = UserId::from("u1");
    let remote = Arc::new(InMemoryRemoteStore::new());
    let now = Utc::now();
    remote
        .upsert_collections(
            &user,
            &[
                JokeCollection::new("Puns", "", now).unwrap(),
                JokeCollection::new("Knock knock", "🚪", now).unwrap(),
            ],
        )
        .await
        .unwrap();
    let remote_prefs = UserPreferences {
        theme: Theme::Dark,
        ..UserPreferences::default()
    };
    remote.upsert_preferences(&user, &remote_prefs).await.unwrap();

    let store = local_store();
    store.set_premium(true).await.unwrap();
    store.create_collection("Puns", "").await.unwrap();

    let sync = SyncService::new(store.clone(), remote);
    let report = sync.load_from_remote(&user).await;

    let merge = report.merge.expect("merged");
    assert_eq!(merge.collections_added, 1);
    assert!(merge.preferences_replaced);

    let state = store.snapshot().await;
    let names: Vec<&str> = state.collections().all().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Puns", "Knock knock"]);
    assert_eq!(state.preferences().theme, Theme::Dark);
}

#[tokio::test]
async fn remote_streak_wins_current_but_keeps_longest() {
    let user = UserId::from("u1");
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote
        .upsert_streak(
            &user,
            &StreakData::restore(1, 2, NaiveDate::from_ymd_opt(2024, 1, 1), 5, Vec::new()),
        )
        .await
        .unwrap();

    let store = local_store();
    store.record_view(JokeId::from("j1"), None).await.unwrap();

    let sync = SyncService::new(store.clone(), remote);
    sync.load_from_remote(&user).await;

    let streak = store.snapshot().await.streak().clone();
    assert_eq!(streak.current_streak(), 1);
    assert_eq!(streak.last_viewed_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
    assert_eq!(streak.longest_streak(), 2);
    assert_eq!(streak.total_jokes_viewed(), 5);
    assert!(streak.longest_streak() >= streak.current_streak());
}

#[tokio::test]
async fn failed_field_is_skipped_and_others_merge() {
    let user = UserId::from("u1");
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote
        .upsert_favorites(&user, &[JokeId::from("X")])
        .await
        .unwrap();
    remote.fail_on(RemoteField::Collections).await;

    let store = local_store();
    let sync = SyncService::new(store.clone(), remote.clone());
    let report = sync.load_from_remote(&user).await;

    assert_eq!(report.failed, vec![RemoteField::Collections]);
    assert_eq!(store.snapshot().await.favorites(), &[JokeId::from("X")]);
}

#[tokio::test]
async fn sync_round_trip_through_remote() {
    let user = UserId::from("u1");
    let remote = Arc::new(InMemoryRemoteStore::new());

    let device_a = local_store();
    device_a.toggle_favorite(JokeId::from("A")).await.unwrap();
    device_a.record_view(JokeId::from("A"), None).await.unwrap();
    let pushed = SyncService::new(device_a, remote.clone())
        .sync_to_remote(&user)
        .await;
    assert!(pushed.is_complete());

    let device_b = local_store();
    SyncService::new(device_b.clone(), remote)
        .load_from_remote(&user)
        .await;

    let state = device_b.snapshot().await;
    assert_eq!(state.favorites(), &[JokeId::from("A")]);
    assert_eq!(state.streak().total_jokes_viewed(), 1);
}
