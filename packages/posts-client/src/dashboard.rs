//! Dashboard flows
//!
//! Every step awaits the previous one: generate text, then images, then
//! create, then resync the cache. Any failure ends the flow; the caller
//! shows one generic notification, the logs carry the detail.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::api::BackendApi;
use crate::error::ClientError;
use crate::store::{FetchOptions, PostsStore, StoreError};
use crate::types::{CreatePostPayload, GeneratedDraft, ImagePrompt, Platform, Post, PostPatch};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("You must be signed in to generate content.")]
    NotSignedIn,

    #[error("Missing {0}")]
    Incomplete(&'static str),

    #[error(transparent)]
    Api(#[from] ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// Requests
// ============================================================================

/// AI-generated posts for a topic, category and tone
#[derive(Debug, Clone)]
pub struct TrendingRequest {
    pub topic: String,
    pub category: String,
    pub tone: String,
    /// Also request one image per platform payload
    pub include_image: bool,
}

impl TrendingRequest {
    pub fn new(topic: impl Into<String>, category: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            category: category.into(),
            tone: tone.into(),
            include_image: false,
        }
    }

    pub fn with_image(mut self) -> Self {
        self.include_image = true;
        self
    }

    pub fn topic_text(&self) -> String {
        trending_topic_text(self.topic.trim(), &self.category, &self.tone)
    }

    fn validate(&self) -> Result<(), DashboardError> {
        if self.topic.trim().is_empty() {
            return Err(DashboardError::Incomplete("topic"));
        }
        if self.category.trim().is_empty() {
            return Err(DashboardError::Incomplete("category"));
        }
        if self.tone.trim().is_empty() {
            return Err(DashboardError::Incomplete("tone"));
        }
        Ok(())
    }
}

/// User-written post, published as-is to every platform
#[derive(Debug, Clone, Default)]
pub struct CustomPost {
    pub title: String,
    pub body: String,
    /// Comma-separated, e.g. `#coffee, #morning`
    pub hashtags: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

/// Fields edited in the post modal
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    /// Space-separated; only `#`-prefixed tokens are kept
    pub hashtags: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

// ============================================================================
// Pure steps
// ============================================================================

/// Topic text sent to the content generator
pub fn trending_topic_text(topic: &str, category: &str, tone: &str) -> String {
    format!("{topic} in {category} category. The content should have the following tone: {tone}.")
}

/// Normalize every element of the generator's array
pub fn normalize_drafts(raw: &[Value]) -> Vec<GeneratedDraft> {
    raw.iter().map(GeneratedDraft::normalize).collect()
}

/// One payload per platform per draft, platform-major
pub fn fan_out(drafts: &[GeneratedDraft]) -> Vec<CreatePostPayload> {
    Platform::ALL
        .iter()
        .flat_map(|platform| {
            drafts.iter().map(move |draft| CreatePostPayload {
                draft: GeneratedDraft {
                    platform: Some(platform.to_string()),
                    ..draft.clone()
                },
                video_url: None,
            })
        })
        .collect()
}

/// Image prompt for one platform payload
pub fn image_prompt_for(payload: &CreatePostPayload) -> ImagePrompt {
    ImagePrompt {
        prompt: format!(
            "Generate an image based on: {}. Generated image will be posted on {}.",
            payload.draft.image_prompt.as_deref().unwrap_or("null"),
            payload.platform().unwrap_or("null"),
        ),
    }
}

/// Comma-separated hashtags, trimmed, blanks dropped
pub fn split_hashtags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Space-separated hashtags; tokens not starting with `#` are dropped
pub fn edit_hashtags(text: &str) -> Vec<String> {
    text.split(' ')
        .map(str::trim)
        .filter(|tag| tag.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn custom_payloads(custom: &CustomPost) -> Vec<CreatePostPayload> {
    let title = custom.title.trim();
    let draft = GeneratedDraft {
        title: (!title.is_empty()).then(|| title.to_string()),
        body: Some(custom.body.trim().to_string()),
        hashtags: split_hashtags(&custom.hashtags),
        image_url: custom.image_url.clone(),
        ..Default::default()
    };

    fan_out(&[draft])
        .into_iter()
        .map(|payload| CreatePostPayload {
            video_url: custom.video_url.clone(),
            ..payload
        })
        .collect()
}

// ============================================================================
// Dashboard
// ============================================================================

pub struct Dashboard {
    api: Arc<dyn BackendApi>,
    store: Arc<PostsStore>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn BackendApi>, store: Arc<PostsStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &PostsStore {
        &self.store
    }

    /// Generate drafts for a topic, fan them out to every platform,
    /// optionally attach images, create them and resync the cache.
    ///
    /// Returns the created records.
    pub async fn generate_posts(
        &self,
        request: &TrendingRequest,
        token: &str,
    ) -> Result<Vec<Post>, DashboardError> {
        let result = self.run_generate(request, token).await;
        if let Err(e) = &result {
            error!(error = %e, "Error generating content");
        }
        result
    }

    async fn run_generate(
        &self,
        request: &TrendingRequest,
        token: &str,
    ) -> Result<Vec<Post>, DashboardError> {
        require_token(token)?;
        request.validate()?;

        let raw = self.api.generate_content(&request.topic_text(), token).await?;
        let drafts = normalize_drafts(&raw);
        let mut payloads = fan_out(&drafts);
        info!(drafts = drafts.len(), payloads = payloads.len(), "Drafts generated");

        if request.include_image {
            let prompts: Vec<ImagePrompt> = payloads.iter().map(image_prompt_for).collect();
            let images = self.api.generate_images(&prompts, token).await?;
            for (index, payload) in payloads.iter_mut().enumerate() {
                payload.draft.image_url = images.get(index).and_then(|image| image.image.clone());
            }
        }

        self.create_and_resync(&payloads, token).await
    }

    /// Publish a user-written post to every platform, no model call
    pub async fn create_custom_posts(
        &self,
        custom: &CustomPost,
        token: &str,
    ) -> Result<Vec<Post>, DashboardError> {
        require_token(token)?;
        if custom.body.trim().is_empty() {
            return Err(DashboardError::Incomplete("body"));
        }

        self.create_and_resync(&custom_payloads(custom), token)
            .await
            .map_err(|e| {
                error!(error = %e, "Error creating custom posts");
                e
            })
    }

    /// Apply a modal edit through the store
    pub async fn edit_post(
        &self,
        post: &Post,
        edit: &PostEdit,
        token: &str,
    ) -> Result<Post, DashboardError> {
        require_token(token)?;

        let patch = PostPatch {
            platform: post.platform.clone(),
            title: edit.title.clone(),
            description: edit.description.clone(),
            body: edit.body.clone(),
            hashtags: Some(edit_hashtags(&edit.hashtags)),
            image_url: edit.image_url.clone(),
            video_url: edit.video_url.clone(),
            ..Default::default()
        };

        Ok(self.store.update_post(&post.id, &patch, token).await?)
    }

    /// Delete a post, then refetch so the backend's list is authoritative
    pub async fn delete_and_resync(&self, post_id: &str, token: &str) -> Result<(), DashboardError> {
        require_token(token)?;

        self.store.delete_post(post_id, token).await?;
        self.resync(token).await;
        Ok(())
    }

    async fn create_and_resync(
        &self,
        payloads: &[CreatePostPayload],
        token: &str,
    ) -> Result<Vec<Post>, DashboardError> {
        let created = self.api.create_posts(payloads, token).await?;
        info!(created = created.len(), "Posts created");

        self.resync(token).await;
        Ok(created)
    }

    /// Forced refetch; a failure is left in the store's error state
    async fn resync(&self, token: &str) {
        if let Err(e) = self.store.fetch_posts(token, FetchOptions::forced()).await {
            warn!(error = %e, "Failed to resync posts");
        }
    }
}

fn require_token(token: &str) -> Result<(), DashboardError> {
    if token.trim().is_empty() {
        return Err(DashboardError::NotSignedIn);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic_text() {
        let request = TrendingRequest::new(" latte art ", "food", "casual");
        assert_eq!(
            request.topic_text(),
            "latte art in food category. The content should have the following tone: casual."
        );
    }

    #[test]
    fn test_incomplete_trending_request() {
        assert!(matches!(
            TrendingRequest::new("x", "", "casual").validate(),
            Err(DashboardError::Incomplete("category"))
        ));
        assert!(TrendingRequest::new("x", "food", "casual").validate().is_ok());
    }

    #[test]
    fn test_fan_out_is_platform_major() {
        let drafts = normalize_drafts(&[json!({ "body": "one" }), json!({ "body": "two" })]);
        let payloads = fan_out(&drafts);

        assert_eq!(payloads.len(), 8);
        let order: Vec<(&str, &str)> = payloads
            .iter()
            .map(|p| (p.platform().unwrap(), p.draft.body.as_deref().unwrap()))
            .collect();
        assert_eq!(
            order[..4],
            [("Facebook", "one"), ("Facebook", "two"), ("Instagram", "one"), ("Instagram", "two")]
        );
    }

    #[test]
    fn test_fan_out_overrides_model_platform() {
        let drafts = normalize_drafts(&[json!({ "platform": "Facebook", "title": "t" })]);
        let platforms: Vec<String> = fan_out(&drafts)
            .into_iter()
            .map(|p| p.draft.platform.unwrap())
            .collect();
        assert_eq!(platforms, ["Facebook", "Instagram", "Twitter", "LinkedIn"]);
    }

    #[test]
    fn test_image_prompt() {
        let drafts = normalize_drafts(&[json!({ "imagePrompt": "a red mug" })]);
        let payload = &fan_out(&drafts)[2];

        assert_eq!(
            image_prompt_for(payload).prompt,
            "Generate an image based on: a red mug. Generated image will be posted on Twitter."
        );
    }

    #[test]
    fn test_split_hashtags() {
        assert_eq!(split_hashtags("#a, #b ,, "), ["#a", "#b"]);
        assert!(split_hashtags("").is_empty());
    }

    #[test]
    fn test_edit_hashtags() {
        assert_eq!(edit_hashtags("#a b  #c"), ["#a", "#c"]);
    }

    #[test]
    fn test_custom_payloads() {
        let payloads = custom_payloads(&CustomPost {
            title: "  ".into(),
            body: " Hello ".into(),
            hashtags: "#hi, #there".into(),
            image_url: Some("data:image/png;base64,AAAA".into()),
            video_url: None,
        });

        assert_eq!(payloads.len(), 4);
        assert!(payloads.iter().all(|p| p.draft.title.is_none()));
        assert!(payloads.iter().all(|p| p.draft.body.as_deref() == Some("Hello")));
        assert_eq!(payloads[0].draft.hashtags, ["#hi", "#there"]);
        assert_eq!(payloads[3].platform(), Some("LinkedIn"));
    }
}
