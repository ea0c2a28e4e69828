//! Posts cache and dashboard flows
//!
//! Client-side data layer for the content generator dashboard:
//!
//! - [`api`]: typed access to the backend REST endpoints, bearer token
//!   passed explicitly on every call
//! - [`store`]: normalized posts cache with a 5-minute refetch throttle
//! - [`dashboard`]: the multi-step flows (generate, fan out across
//!   platforms, attach images, create, resync)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use posts_client::{ClientConfig, Dashboard, HttpBackend, PostsStore, TrendingRequest};
//!
//! let api = Arc::new(HttpBackend::from_config(&ClientConfig::from_env()?));
//! let store = Arc::new(PostsStore::new(api.clone()));
//! let dashboard = Dashboard::new(api, store.clone());
//!
//! dashboard
//!     .generate_posts(&TrendingRequest::new("latte art", "food", "casual"), &token)
//!     .await?;
//! let posts = store.select_all();
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod store;
pub mod testing;
pub mod types;

pub use api::{BackendApi, HttpBackend};
pub use config::ClientConfig;
pub use dashboard::{CustomPost, Dashboard, DashboardError, PostEdit, TrendingRequest};
pub use error::ClientError;
pub use store::{Clock, FetchOptions, PostsState, PostsStore, RequestStatus, StoreError, SystemClock};
pub use types::*;
