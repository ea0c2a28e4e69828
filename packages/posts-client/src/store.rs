//! Posts cache
//!
//! A normalized map of canonical post records keyed by `_id`, kept in sync
//! with the backend through three request kinds: fetch, update and delete.
//! Each kind moves `Idle → Pending → Fulfilled | Rejected`.
//!
//! Display order (`createdAt` descending) is applied when reading; storage
//! is unordered.
//!
//! The state sits behind a mutex that is never held across an await, so
//! overlapping calls on a shared store see each other's pending state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::BackendApi;
use crate::error::ClientError;
use crate::types::{Post, PostPatch};

/// Non-forced fetches within this window of the last successful one are skipped
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(5 * 60);

// ============================================================================
// Clock
// ============================================================================

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Bypass the freshness throttle
    pub force_refetch: bool,
}

impl FetchOptions {
    pub fn forced() -> Self {
        Self {
            force_refetch: true,
        }
    }
}

/// Cache contents plus request bookkeeping.
///
/// The transition methods mirror the request lifecycle and are the only
/// way entities change.
#[derive(Debug, Clone, Default)]
pub struct PostsState {
    entities: HashMap<String, Post>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Set only by a successful full-list fetch
    pub last_fetched: Option<DateTime<Utc>>,
    pub fetch_status: RequestStatus,
    pub update_status: RequestStatus,
    pub delete_status: RequestStatus,
    /// Bumped by every fetch that starts; only the latest one may settle
    fetch_seq: u64,
}

impl PostsState {
    /// Whether a successful fetch happened within [`FRESHNESS_WINDOW`] of `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.last_fetched {
            // a clock that went backwards counts as fresh
            Some(last) => now
                .signed_duration_since(last)
                .to_std()
                .map_or(true, |age| age < FRESHNESS_WINDOW),
            None => false,
        }
    }

    /// Returns the sequence number of the fetch being started
    pub fn fetch_pending(&mut self) -> u64 {
        self.fetch_seq += 1;
        self.fetch_status = RequestStatus::Pending;
        self.is_loading = true;
        self.error = None;
        self.fetch_seq
    }

    /// Whether `seq` is the most recently started fetch
    pub fn is_latest_fetch(&self, seq: u64) -> bool {
        self.fetch_seq == seq
    }

    /// Full replace: records missing from `posts` disappear
    pub fn fetch_fulfilled(&mut self, posts: Vec<Post>, now: DateTime<Utc>) {
        self.fetch_status = RequestStatus::Fulfilled;
        self.is_loading = false;
        self.entities = posts.into_iter().map(|post| (post.id.clone(), post)).collect();
        self.last_fetched = Some(now);
    }

    pub fn fetch_rejected(&mut self, message: String) {
        self.fetch_status = RequestStatus::Rejected;
        self.is_loading = false;
        self.error = Some(message);
    }

    pub fn update_pending(&mut self) {
        self.update_status = RequestStatus::Pending;
        self.is_loading = true;
        self.error = None;
    }

    /// Upsert the server's canonical record
    pub fn update_fulfilled(&mut self, post: Post) {
        self.update_status = RequestStatus::Fulfilled;
        self.is_loading = false;
        self.entities.insert(post.id.clone(), post);
    }

    pub fn update_rejected(&mut self, message: String) {
        self.update_status = RequestStatus::Rejected;
        self.is_loading = false;
        self.error = Some(message);
    }

    pub fn delete_pending(&mut self) {
        self.delete_status = RequestStatus::Pending;
    }

    /// Removing an id that is not cached is a no-op
    pub fn delete_fulfilled(&mut self, post_id: &str) {
        self.delete_status = RequestStatus::Fulfilled;
        self.entities.remove(post_id);
    }

    /// The entity stays; the error goes back to the caller only
    pub fn delete_rejected(&mut self) {
        self.delete_status = RequestStatus::Rejected;
    }

    /// All posts, newest first
    pub fn all(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.entities.values().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        posts
    }

    pub fn by_id(&self, post_id: &str) -> Option<&Post> {
        self.entities.get(post_id)
    }

    /// Ids in display order
    pub fn ids(&self) -> Vec<String> {
        self.all().into_iter().map(|post| post.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Skipped by the freshness throttle; not a user-facing failure
    #[error("Posts already fetched recently.")]
    Throttled,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl StoreError {
    pub fn is_throttled(&self) -> bool {
        matches!(self, StoreError::Throttled)
    }
}

pub struct PostsStore {
    api: Arc<dyn BackendApi>,
    clock: Arc<dyn Clock>,
    state: Mutex<PostsState>,
}

impl PostsStore {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self::with_clock(api, Arc::new(SystemClock))
    }

    pub fn with_clock(api: Arc<dyn BackendApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            state: Mutex::new(PostsState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PostsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the cache with the backend's list.
    ///
    /// Without `force_refetch`, returns [`StoreError::Throttled`] and makes
    /// no request when the last fetch is still fresh or one is in flight.
    ///
    /// When fetches overlap, only the one started last touches the state; an
    /// earlier response arriving later is dropped.
    pub async fn fetch_posts(&self, token: &str, options: FetchOptions) -> Result<(), StoreError> {
        let seq = {
            let mut state = self.lock();
            if !options.force_refetch
                && (state.is_fresh(self.clock.now()) || state.fetch_status.is_pending())
            {
                debug!("Posts already fetched recently, skipping");
                return Err(StoreError::Throttled);
            }
            state.fetch_pending()
        };

        let result = self.api.list_posts(token).await;

        let mut state = self.lock();
        if !state.is_latest_fetch(seq) {
            debug!(seq, "Superseded posts fetch settled, ignoring");
            return result.map(|_| ()).map_err(StoreError::from);
        }

        match result {
            Ok(posts) => {
                let count = posts.len();
                state.fetch_fulfilled(posts, self.clock.now());
                info!(count, "Posts fetched");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch posts");
                state.fetch_rejected(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Send a partial update and cache the record the backend returns.
    pub async fn update_post(
        &self,
        post_id: &str,
        patch: &PostPatch,
        token: &str,
    ) -> Result<Post, StoreError> {
        self.lock().update_pending();

        match self.api.update_post(post_id, patch, token).await {
            Ok(post) => {
                self.lock().update_fulfilled(post.clone());
                info!(post_id = %post.id, "Post updated");
                Ok(post)
            }
            Err(e) => {
                warn!(error = %e, post_id, "Failed to update post");
                self.lock().update_rejected(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Delete on the backend, then drop the id locally.
    pub async fn delete_post(&self, post_id: &str, token: &str) -> Result<(), StoreError> {
        self.lock().delete_pending();

        match self.api.delete_post(post_id, token).await {
            Ok(()) => {
                self.lock().delete_fulfilled(post_id);
                info!(post_id, "Post deleted");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, post_id, "Failed to delete post");
                self.lock().delete_rejected();
                Err(e.into())
            }
        }
    }

    /// All cached posts, newest first
    pub fn select_all(&self) -> Vec<Post> {
        self.lock().all().into_iter().cloned().collect()
    }

    /// Cached ids, newest first
    pub fn ids(&self) -> Vec<String> {
        self.lock().ids()
    }

    pub fn select_by_id(&self, post_id: &str) -> Option<Post> {
        self.lock().by_id(post_id).cloned()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PostsState {
        self.lock().clone()
    }
}
