//! Type definitions for the backend REST API
//!
//! Field names follow the backend's camelCase JSON; post identity is `_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Platforms
// ============================================================================

/// Platforms every generated draft is fanned out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Facebook,
    Instagram,
    Twitter,
    LinkedIn,
}

impl Platform {
    /// Fan-out order
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Twitter,
        Platform::LinkedIn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Twitter => "Twitter",
            Platform::LinkedIn => "LinkedIn",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Post Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
}

/// Canonical post record as persisted by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub platform: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    #[serde(default, deserialize_with = "deserialize_hashtags")]
    pub hashtags: Vec<String>,
    pub image_prompt: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub status: Option<PostStatus>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for `PUT /api/posts/:id`; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Generated Drafts
// ============================================================================

const DRAFT_FIELDS: [&str; 8] = [
    "platform",
    "title",
    "caption",
    "description",
    "body",
    "hashtags",
    "imagePrompt",
    "imageUrl",
];

/// One model-generated draft with the full field set.
///
/// Keys the model added beyond the known ones are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDraft {
    pub platform: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    #[serde(default, deserialize_with = "deserialize_hashtags")]
    pub hashtags: Vec<String>,
    pub image_prompt: Option<String>,
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeneratedDraft {
    /// Merge one raw element of the generator's array over the default
    /// template (all fields null, no hashtags).
    ///
    /// Non-string values in text fields read as null, a non-array
    /// `hashtags` reads as empty, and a non-object element yields the bare
    /// template.
    pub fn normalize(raw: &Value) -> Self {
        let Some(object) = raw.as_object() else {
            return Self::default();
        };
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            platform: text("platform"),
            title: text("title"),
            caption: text("caption"),
            description: text("description"),
            body: text("body"),
            hashtags: hashtags_from(object.get("hashtags")),
            image_prompt: text("imagePrompt"),
            image_url: text("imageUrl"),
            extra: object
                .iter()
                .filter(|(key, _)| !DRAFT_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

/// Draft sent to `POST /api/posts`, one per target platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostPayload {
    #[serde(flatten)]
    pub draft: GeneratedDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl CreatePostPayload {
    pub fn platform(&self) -> Option<&str> {
        self.draft.platform.as_deref()
    }
}

// ============================================================================
// Image Generation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePrompt {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    #[serde(default)]
    pub image: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

/// String entries of a hashtags value; anything that is not an array is empty.
pub fn hashtags_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn deserialize_hashtags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(hashtags_from(Some(&value)))
}
