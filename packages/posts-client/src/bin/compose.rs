//! CLI for composing posts against a running backend
//!
//! Drives the same dashboard flows the web UI uses and prints the
//! resulting records as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use posts_client::{
    ClientConfig, CustomPost, Dashboard, FetchOptions, HttpBackend, PostsStore, TrendingRequest,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "compose")]
#[command(about = "Generate and manage social media posts")]
struct Cli {
    /// Bearer token; falls back to POSTS_API_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate drafts for a topic and publish them to every platform
    Generate {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        tone: String,
        #[arg(long)]
        with_images: bool,
    },

    /// Publish a hand-written post to every platform
    Custom {
        #[arg(long)]
        body: String,
        #[arg(long, default_value = "")]
        title: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        hashtags: String,
    },

    /// List posts, newest first
    List,

    /// Delete a post and resync
    Delete {
        #[arg(long)]
        id: String,
    },
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,posts_client=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let token = cli
        .token
        .or_else(|| std::env::var("POSTS_API_TOKEN").ok())
        .unwrap_or_default();

    let api = Arc::new(HttpBackend::from_config(&config));
    let store = Arc::new(PostsStore::new(api.clone()));
    let dashboard = Dashboard::new(api, store.clone());

    match cli.command {
        Commands::Generate {
            topic,
            category,
            tone,
            with_images,
        } => {
            let mut request = TrendingRequest::new(topic, category, tone);
            request.include_image = with_images;
            let created = dashboard
                .generate_posts(&request, &token)
                .await
                .context("Failed to generate content")?;
            output(&created)
        }
        Commands::Custom {
            body,
            title,
            hashtags,
        } => {
            let custom = CustomPost {
                title,
                body,
                hashtags,
                ..Default::default()
            };
            let created = dashboard
                .create_custom_posts(&custom, &token)
                .await
                .context("Failed to create posts")?;
            output(&created)
        }
        Commands::List => {
            store
                .fetch_posts(&token, FetchOptions::default())
                .await
                .context("Failed to fetch posts")?;
            output(&store.select_all())
        }
        Commands::Delete { id } => {
            dashboard
                .delete_and_resync(&id, &token)
                .await
                .context("Failed to delete post")?;
            output(&store.select_all())
        }
    }
}
