// Test doubles - in-memory backend and a hand-driven clock
//
// Shared by unit tests and the integration tests under tests/.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::api::BackendApi;
use crate::error::ClientError;
use crate::store::Clock;
use crate::types::{CreatePostPayload, GeneratedImage, ImagePrompt, Post, PostPatch};

// =============================================================================
// Manual Clock
// =============================================================================

/// Clock that only moves when told to
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// Mock Backend
// =============================================================================

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    ListPosts,
    CreatePosts(Vec<CreatePostPayload>),
    UpdatePost { post_id: String, patch: PostPatch },
    DeletePost(String),
    GenerateContent(String),
    GenerateImages(Vec<ImagePrompt>),
}

#[derive(Default)]
struct Failures {
    list: Option<(u16, String)>,
    update: Option<(u16, String)>,
    delete: Option<(u16, String)>,
    generate: Option<(u16, String)>,
}

/// In-memory stand-in for the backend.
///
/// Created posts get sequential ids (`post-1`, `post-2`, ...) and
/// increasing `createdAt` stamps. Updates apply the patch and bump
/// `updatedAt`. A blank token is answered with 401.
#[derive(Clone, Default)]
pub struct MockBackend {
    posts: Arc<Mutex<Vec<Post>>>,
    next_id: Arc<Mutex<u32>>,
    generated: Arc<Mutex<Vec<Vec<Value>>>>,
    images: Arc<Mutex<Vec<GeneratedImage>>>,
    update_responses: Arc<Mutex<Vec<Post>>>,
    failures: Arc<Mutex<Failures>>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
    list_gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a persisted post
    pub fn with_post(self, post: Post) -> Self {
        self.posts.lock().unwrap().push(post);
        self
    }

    /// Queue a content generator response
    pub fn with_generated(self, drafts: Vec<Value>) -> Self {
        self.generated.lock().unwrap().push(drafts);
        self
    }

    /// Images returned by the image generator, in order
    pub fn with_images(self, images: Vec<Option<&str>>) -> Self {
        *self.images.lock().unwrap() = images
            .into_iter()
            .map(|image| GeneratedImage {
                image: image.map(str::to_string),
            })
            .collect();
        self
    }

    /// Answer the next update with this record instead of applying the patch
    pub fn with_update_response(self, post: Post) -> Self {
        self.update_responses.lock().unwrap().push(post);
        self
    }

    pub fn fail_list(&self, status: u16, message: &str) {
        self.failures.lock().unwrap().list = Some((status, message.to_string()));
    }

    pub fn fail_update(&self, status: u16, message: &str) {
        self.failures.lock().unwrap().update = Some((status, message.to_string()));
    }

    pub fn fail_delete(&self, status: u16, message: &str) {
        self.failures.lock().unwrap().delete = Some((status, message.to_string()));
    }

    pub fn fail_generate(&self, status: u16, message: &str) {
        self.failures.lock().unwrap().generate = Some((status, message.to_string()));
    }

    /// Hold the next `list_posts` call until the returned gate is notified.
    ///
    /// The held call answers with the posts persisted when it started.
    pub fn hold_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Clear all configured failures
    pub fn recover(&self) {
        *self.failures.lock().unwrap() = Failures::default();
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `GET /api/posts` calls
    pub fn list_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, BackendCall::ListPosts))
            .count()
    }

    /// Posts currently persisted
    pub fn persisted(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(
        &self,
        token: &str,
        failure: impl FnOnce(&Failures) -> Option<(u16, String)>,
    ) -> Result<(), ClientError> {
        if token.trim().is_empty() {
            return Err(ClientError::Api {
                status: 401,
                message: "Not authorized, no token".to_string(),
            });
        }
        let failures = self.failures.lock().unwrap();
        match failure(&*failures) {
            Some((status, message)) => Err(ClientError::Api { status, message }),
            None => Ok(()),
        }
    }

    fn stamp(&self) -> (String, DateTime<Utc>) {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let created_at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
            + Duration::seconds(i64::from(*next_id));
        (format!("post-{}", *next_id), created_at)
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn list_posts(&self, token: &str) -> Result<Vec<Post>, ClientError> {
        self.record(BackendCall::ListPosts);
        self.check(token, |f| f.list.clone())?;
        let posts = self.persisted();

        let gate = self.list_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(posts)
    }

    async fn create_posts(
        &self,
        posts: &[CreatePostPayload],
        token: &str,
    ) -> Result<Vec<Post>, ClientError> {
        self.record(BackendCall::CreatePosts(posts.to_vec()));
        self.check(token, |_| None)?;

        let created: Vec<Post> = posts
            .iter()
            .map(|payload| {
                let (id, created_at) = self.stamp();
                let draft = &payload.draft;
                Post {
                    id,
                    user_id: "user-1".to_string(),
                    platform: draft.platform.clone(),
                    title: draft.title.clone(),
                    caption: draft.caption.clone(),
                    description: draft.description.clone(),
                    body: draft.body.clone(),
                    hashtags: draft.hashtags.clone(),
                    image_prompt: draft.image_prompt.clone(),
                    image_url: draft.image_url.clone(),
                    video_url: payload.video_url.clone(),
                    status: Some(crate::types::PostStatus::Draft),
                    scheduled_at: None,
                    created_at,
                    updated_at: created_at,
                }
            })
            .collect();

        self.posts.lock().unwrap().extend(created.iter().cloned());
        Ok(created)
    }

    async fn update_post(
        &self,
        post_id: &str,
        patch: &PostPatch,
        token: &str,
    ) -> Result<Post, ClientError> {
        self.record(BackendCall::UpdatePost {
            post_id: post_id.to_string(),
            patch: patch.clone(),
        });
        self.check(token, |f| f.update.clone())?;

        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|post| post.id == post_id) else {
            return Err(ClientError::Api {
                status: 404,
                message: "Post not found".to_string(),
            });
        };

        let mut overrides = self.update_responses.lock().unwrap();
        if !overrides.is_empty() {
            *post = overrides.remove(0);
            return Ok(post.clone());
        }

        let patch = patch.clone();
        post.platform = patch.platform.or(post.platform.take());
        post.title = patch.title.or(post.title.take());
        post.caption = patch.caption.or(post.caption.take());
        post.description = patch.description.or(post.description.take());
        post.body = patch.body.or(post.body.take());
        if let Some(hashtags) = patch.hashtags {
            post.hashtags = hashtags;
        }
        post.image_url = patch.image_url.or(post.image_url.take());
        post.video_url = patch.video_url.or(post.video_url.take());
        post.status = patch.status.or(post.status);
        post.scheduled_at = patch.scheduled_at.or(post.scheduled_at);
        post.updated_at += Duration::minutes(1);

        Ok(post.clone())
    }

    async fn delete_post(&self, post_id: &str, token: &str) -> Result<(), ClientError> {
        self.record(BackendCall::DeletePost(post_id.to_string()));
        self.check(token, |f| f.delete.clone())?;

        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|post| post.id != post_id);
        if posts.len() == before {
            return Err(ClientError::Api {
                status: 404,
                message: "Post not found".to_string(),
            });
        }
        Ok(())
    }

    async fn generate_content(
        &self,
        topic_text: &str,
        token: &str,
    ) -> Result<Vec<Value>, ClientError> {
        self.record(BackendCall::GenerateContent(topic_text.to_string()));
        self.check(token, |f| f.generate.clone())?;

        let mut generated = self.generated.lock().unwrap();
        Ok(if generated.is_empty() {
            Vec::new()
        } else {
            generated.remove(0)
        })
    }

    async fn generate_images(
        &self,
        prompts: &[ImagePrompt],
        token: &str,
    ) -> Result<Vec<GeneratedImage>, ClientError> {
        self.record(BackendCall::GenerateImages(prompts.to_vec()));
        self.check(token, |_| None)?;
        Ok(self.images.lock().unwrap().clone())
    }
}
