//! Backend REST API access
//!
//! Every call takes the bearer token explicitly; nothing reads ambient
//! credentials.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::types::{CreatePostPayload, GeneratedImage, ImagePrompt, Post, PostPatch};

#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET /api/posts`
    async fn list_posts(&self, token: &str) -> Result<Vec<Post>, ClientError>;

    /// `POST /api/posts` with `{ posts }`; returns the created canonical records
    async fn create_posts(
        &self,
        posts: &[CreatePostPayload],
        token: &str,
    ) -> Result<Vec<Post>, ClientError>;

    /// `PUT /api/posts/:id`
    async fn update_post(
        &self,
        post_id: &str,
        patch: &PostPatch,
        token: &str,
    ) -> Result<Post, ClientError>;

    /// `DELETE /api/posts/:id`
    async fn delete_post(&self, post_id: &str, token: &str) -> Result<(), ClientError>;

    /// `POST /api/content/generator`; the raw draft array
    async fn generate_content(&self, topic_text: &str, token: &str)
        -> Result<Vec<Value>, ClientError>;

    /// `POST /api/image/generator`; one image per prompt, in order
    async fn generate_images(
        &self,
        prompts: &[ImagePrompt],
        token: &str,
    ) -> Result<Vec<GeneratedImage>, ClientError>;
}

#[derive(Serialize)]
struct CreatePostsBody<'a> {
    posts: &'a [CreatePostPayload],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    topic_text: &'a str,
}

/// The create endpoint answers with either a bare list or `{ posts }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedPosts {
    List(Vec<Post>),
    Wrapped { posts: Vec<Post> },
    Other(Value),
}

/// reqwest-backed implementation of [`BackendApi`]
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.backend_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {}", token))
    }

    /// Send and decode a JSON response, mapping non-2xx to [`ClientError::Api`]
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let bytes = self.send(request).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            tracing::warn!(status = %status, message = %message, "Backend request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn list_posts(&self, token: &str) -> Result<Vec<Post>, ClientError> {
        let request = self.authorized(self.client.get(self.url("/api/posts")), token);
        self.send_json(request).await
    }

    async fn create_posts(
        &self,
        posts: &[CreatePostPayload],
        token: &str,
    ) -> Result<Vec<Post>, ClientError> {
        let request = self
            .authorized(self.client.post(self.url("/api/posts")), token)
            .json(&CreatePostsBody { posts });

        let bytes = self.send(request).await?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        Ok(match serde_json::from_slice(&bytes)? {
            CreatedPosts::List(posts) | CreatedPosts::Wrapped { posts } => posts,
            CreatedPosts::Other(_) => Vec::new(),
        })
    }

    async fn update_post(
        &self,
        post_id: &str,
        patch: &PostPatch,
        token: &str,
    ) -> Result<Post, ClientError> {
        let request = self
            .authorized(self.client.put(self.url(&format!("/api/posts/{}", post_id))), token)
            .json(patch);
        self.send_json(request).await
    }

    async fn delete_post(&self, post_id: &str, token: &str) -> Result<(), ClientError> {
        let request = self.authorized(
            self.client.delete(self.url(&format!("/api/posts/{}", post_id))),
            token,
        );
        self.send(request).await.map(|_| ())
    }

    async fn generate_content(
        &self,
        topic_text: &str,
        token: &str,
    ) -> Result<Vec<Value>, ClientError> {
        let request = self
            .authorized(self.client.post(self.url("/api/content/generator")), token)
            .json(&GenerateContentBody { topic_text });
        self.send_json(request).await
    }

    async fn generate_images(
        &self,
        prompts: &[ImagePrompt],
        token: &str,
    ) -> Result<Vec<GeneratedImage>, ClientError> {
        let request = self
            .authorized(self.client.post(self.url("/api/image/generator")), token)
            .json(prompts);
        self.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_urls() {
        let backend = HttpBackend::new("http://localhost:8080/");
        assert_eq!(backend.base_url(), "http://localhost:8080");
        assert_eq!(backend.url("/api/posts"), "http://localhost:8080/api/posts");
    }

    #[test]
    fn test_generate_body_is_camel_case() {
        let body = serde_json::to_value(GenerateContentBody { topic_text: "t" }).unwrap();
        assert_eq!(body, json!({ "topicText": "t" }));
    }

    #[test]
    fn test_created_posts_shapes() {
        let post = json!({
            "_id": "p1",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        });

        let list: CreatedPosts = serde_json::from_value(json!([post.clone()])).unwrap();
        assert!(matches!(list, CreatedPosts::List(ref p) if p.len() == 1));

        let wrapped: CreatedPosts = serde_json::from_value(json!({ "posts": [post] })).unwrap();
        assert!(matches!(wrapped, CreatedPosts::Wrapped { ref posts } if posts.len() == 1));

        let other: CreatedPosts = serde_json::from_value(json!({ "message": "ok" })).unwrap();
        assert!(matches!(other, CreatedPosts::Other(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let backend = HttpBackend::new("http://127.0.0.1:1");
        let err = backend.list_posts("token").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
