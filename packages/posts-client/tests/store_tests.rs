//! Posts cache behaviour against the in-memory backend

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use posts_client::testing::{BackendCall, ManualClock, MockBackend};
use posts_client::{
    BackendApi, ClientError, Clock, FetchOptions, Post, PostPatch, PostsStore, RequestStatus, StoreError,
};

// ============================================================================
// Test Helpers
// ============================================================================

const TOKEN: &str = "test-token";

fn post(id: &str, title: &str, minute: u32) -> Post {
    let at = Utc.with_ymd_and_hms(2025, 5, 30, 10, minute, 0).unwrap();
    Post {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        platform: Some("Twitter".to_string()),
        title: Some(title.to_string()),
        caption: None,
        description: None,
        body: Some("body".to_string()),
        hashtags: vec!["#coffee".to_string()],
        image_prompt: None,
        image_url: None,
        video_url: None,
        status: None,
        scheduled_at: None,
        created_at: at,
        updated_at: at,
    }
}

fn store_with(backend: &MockBackend, clock: &ManualClock) -> PostsStore {
    PostsStore::with_clock(Arc::new(backend.clone()), Arc::new(clock.clone()))
}

/// Let spawned fetches run until the backend has seen `count` list calls
async fn wait_for_list_calls(backend: &MockBackend, count: usize) {
    while backend.list_calls() < count {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Fetch
// ============================================================================

#[tokio::test]
async fn fetch_is_throttled_within_five_minutes() {
    let backend = MockBackend::new().with_post(post("p1", "One", 1));
    let clock = ManualClock::default();
    let store = store_with(&backend, &clock);

    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();
    let second = store.fetch_posts(TOKEN, FetchOptions::default()).await;

    assert!(matches!(second, Err(StoreError::Throttled)));
    assert_eq!(backend.list_calls(), 1);

    clock.advance(Duration::minutes(4));
    assert!(store
        .fetch_posts(TOKEN, FetchOptions::default())
        .await
        .unwrap_err()
        .is_throttled());
    assert_eq!(backend.list_calls(), 1);

    store.fetch_posts(TOKEN, FetchOptions::forced()).await.unwrap();
    assert_eq!(backend.list_calls(), 2);
}

#[tokio::test]
async fn fetch_runs_again_after_window() {
    let backend = MockBackend::new();
    let clock = ManualClock::default();
    let store = store_with(&backend, &clock);

    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();
    clock.advance(Duration::minutes(5));
    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();

    assert_eq!(backend.list_calls(), 2);
    assert_eq!(store.snapshot().last_fetched, Some(clock.now()));
}

#[tokio::test]
async fn throttled_fetch_leaves_state_untouched() {
    let backend = MockBackend::new().with_post(post("p1", "One", 1));
    let clock = ManualClock::default();
    let store = store_with(&backend, &clock);

    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();
    let before = store.snapshot();
    let _ = store.fetch_posts(TOKEN, FetchOptions::default()).await;
    let after = store.snapshot();

    assert_eq!(after.fetch_status, RequestStatus::Fulfilled);
    assert_eq!(after.last_fetched, before.last_fetched);
    assert_eq!(after.ids(), before.ids());
}

#[tokio::test]
async fn fetch_is_throttled_while_one_is_in_flight() {
    let backend = MockBackend::new().with_post(post("p1", "One", 1));
    let store = Arc::new(store_with(&backend, &ManualClock::default()));
    let gate = backend.hold_next_list();

    let in_flight = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_posts(TOKEN, FetchOptions::default()).await }
    });
    wait_for_list_calls(&backend, 1).await;
    assert!(store.snapshot().fetch_status.is_pending());

    let second = store.fetch_posts(TOKEN, FetchOptions::default()).await;
    assert!(matches!(second, Err(StoreError::Throttled)));
    assert_eq!(backend.list_calls(), 1);

    gate.notify_one();
    in_flight.await.unwrap().unwrap();
    assert_eq!(store.ids(), ["p1"]);
    assert_eq!(backend.list_calls(), 1);
}

#[tokio::test]
async fn superseded_fetch_response_is_ignored() {
    let backend = MockBackend::new().with_post(post("p1", "One", 1));
    let clock = ManualClock::default();
    let store = Arc::new(store_with(&backend, &clock));
    let gate = backend.hold_next_list();

    let stale = tokio::spawn({
        let store = store.clone();
        async move { store.fetch_posts(TOKEN, FetchOptions::forced()).await }
    });
    wait_for_list_calls(&backend, 1).await;

    backend.delete_post("p1", TOKEN).await.unwrap();
    clock.advance(Duration::seconds(10));
    store.fetch_posts(TOKEN, FetchOptions::forced()).await.unwrap();
    assert!(store.ids().is_empty());

    gate.notify_one();
    stale.await.unwrap().unwrap();

    let state = store.snapshot();
    assert!(state.is_empty());
    assert_eq!(state.fetch_status, RequestStatus::Fulfilled);
    assert_eq!(state.last_fetched, Some(clock.now()));
    assert_eq!(backend.list_calls(), 2);
}

#[tokio::test]
async fn fetch_failure_records_error_and_keeps_cache() {
    let backend = MockBackend::new().with_post(post("p1", "One", 1));
    let clock = ManualClock::default();
    let store = store_with(&backend, &clock);

    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();
    backend.fail_list(500, "Database unavailable");
    let err = store.fetch_posts(TOKEN, FetchOptions::forced()).await.unwrap_err();

    assert!(matches!(
        err,
        StoreError::Client(ClientError::Api { status: 500, .. })
    ));
    let state = store.snapshot();
    assert_eq!(state.error.as_deref(), Some("Database unavailable"));
    assert_eq!(state.fetch_status, RequestStatus::Rejected);
    assert!(!state.is_loading);
    assert_eq!(state.len(), 1);

    backend.recover();
    store.fetch_posts(TOKEN, FetchOptions::forced()).await.unwrap();
    assert!(store.snapshot().error.is_none());
}

#[tokio::test]
async fn fetch_without_token_is_rejected() {
    let backend = MockBackend::new();
    let store = store_with(&backend, &ManualClock::default());

    let err = store.fetch_posts("", FetchOptions::default()).await.unwrap_err();

    assert!(matches!(
        err,
        StoreError::Client(ClientError::Api { status: 401, .. })
    ));
    assert!(store.snapshot().last_fetched.is_none());
}

#[tokio::test]
async fn posts_are_listed_newest_first() {
    let backend = MockBackend::new()
        .with_post(post("old", "Old", 1))
        .with_post(post("new", "New", 40))
        .with_post(post("mid", "Mid", 20));
    let store = store_with(&backend, &ManualClock::default());

    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();

    assert_eq!(store.ids(), ["new", "mid", "old"]);
    assert_eq!(store.select_all()[0].title.as_deref(), Some("New"));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn update_caches_the_server_record() {
    let mut canonical = post("p1", "Server title", 1);
    canonical.updated_at += Duration::hours(1);
    let backend = MockBackend::new()
        .with_post(post("p1", "One", 1))
        .with_update_response(canonical.clone());
    let store = store_with(&backend, &ManualClock::default());
    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();

    let patch = PostPatch {
        title: Some("Client title".to_string()),
        ..Default::default()
    };
    let returned = store.update_post("p1", &patch, TOKEN).await.unwrap();

    assert_eq!(returned, canonical);
    assert_eq!(store.select_by_id("p1"), Some(canonical));
    assert_eq!(store.snapshot().update_status, RequestStatus::Fulfilled);
    assert_eq!(
        backend.calls().last(),
        Some(&BackendCall::UpdatePost {
            post_id: "p1".to_string(),
            patch,
        })
    );
}

#[tokio::test]
async fn update_inserts_a_post_not_yet_cached() {
    let backend = MockBackend::new().with_post(post("p9", "Nine", 9));
    let store = store_with(&backend, &ManualClock::default());

    let patch = PostPatch {
        body: Some("edited".to_string()),
        ..Default::default()
    };
    store.update_post("p9", &patch, TOKEN).await.unwrap();

    let cached = store.select_by_id("p9").unwrap();
    assert_eq!(cached.body.as_deref(), Some("edited"));
    assert_eq!(store.snapshot().len(), 1);
}

#[tokio::test]
async fn update_failure_keeps_previous_record() {
    let backend = MockBackend::new().with_post(post("p1", "One", 1));
    let store = store_with(&backend, &ManualClock::default());
    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();
    backend.fail_update(403, "Not authorized to update this post");

    let patch = PostPatch {
        title: Some("Nope".to_string()),
        ..Default::default()
    };
    assert!(store.update_post("p1", &patch, TOKEN).await.is_err());

    let state = store.snapshot();
    assert_eq!(state.by_id("p1").unwrap().title.as_deref(), Some("One"));
    assert_eq!(state.error.as_deref(), Some("Not authorized to update this post"));
    assert_eq!(state.update_status, RequestStatus::Rejected);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn delete_removes_post_and_second_delete_is_harmless() {
    let backend = MockBackend::new()
        .with_post(post("p1", "One", 1))
        .with_post(post("p2", "Two", 2));
    let store = store_with(&backend, &ManualClock::default());
    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();

    store.delete_post("p1", TOKEN).await.unwrap();
    assert!(store.select_by_id("p1").is_none());
    assert_eq!(store.snapshot().len(), 1);

    let second = store.delete_post("p1", TOKEN).await;
    assert!(matches!(
        second,
        Err(StoreError::Client(ClientError::Api { status: 404, .. }))
    ));

    let state = store.snapshot();
    assert_eq!(state.ids(), ["p2"]);
    assert!(state.error.is_none());
    assert_eq!(state.delete_status, RequestStatus::Rejected);
}

#[tokio::test]
async fn delete_failure_keeps_post() {
    let backend = MockBackend::new().with_post(post("p1", "One", 1));
    let store = store_with(&backend, &ManualClock::default());
    store.fetch_posts(TOKEN, FetchOptions::default()).await.unwrap();
    backend.fail_delete(500, "Server error");

    assert!(store.delete_post("p1", TOKEN).await.is_err());
    assert!(store.select_by_id("p1").is_some());
    assert!(store.snapshot().error.is_none());
}
