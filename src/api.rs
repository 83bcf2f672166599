use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::Chapter;
use crate::format::format_timestamp;

/// Default backend address; override with `--api-url` or the config file
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// A video record as returned by the backend library routes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub subscriber_count: Option<u64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub chapters: Vec<ServerChapter>,
    #[serde(default)]
    pub processed: bool,
}

/// Chapter supplied by the backend from video metadata. Start times are
/// real seconds, so these are authoritative over anything parsed from prose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerChapter {
    pub start_time: f64,
    pub title: String,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ServerChapter {
    /// View form of this chapter; the backend's preformatted timestamp wins
    /// when present.
    pub fn to_chapter(&self) -> Chapter {
        let timestamp = self
            .timestamp
            .clone()
            .unwrap_or_else(|| format_timestamp(self.start_time.max(0.0) as u32));
        Chapter {
            timestamp,
            title: self.title.clone(),
            description: String::new(),
        }
    }
}

/// One generated digest for a video. `digest` is null while generation is
/// still running in the backend's background task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub id: i64,
    pub video_id: i64,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub digest_type: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub youtube_channel_id: Option<String>,
    #[serde(default)]
    pub subscriber_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub youtube_category_id: Option<String>,
}

/// List every video in the library
pub async fn fetch_videos(client: &reqwest::Client, base_url: &str) -> Result<Vec<Video>> {
    let url = format!("{}/api/v1/videos/", base_url.trim_end_matches('/'));
    debug!("GET {url}");
    let videos = client.get(&url).send().await?.error_for_status()?.json().await?;
    Ok(videos)
}

/// Fetch one video by its backend record ID
pub async fn fetch_video(client: &reqwest::Client, base_url: &str, video_id: i64) -> Result<Video> {
    let url = format!("{}/api/v1/videos/{video_id}", base_url.trim_end_matches('/'));
    debug!("GET {url}");
    let video = client.get(&url).send().await?.error_for_status()?.json().await?;
    Ok(video)
}

/// List all digests generated for a video
pub async fn fetch_video_digests(
    client: &reqwest::Client,
    base_url: &str,
    video_id: i64,
) -> Result<Vec<Digest>> {
    let url = format!("{}/api/v1/videos/{video_id}/digests", base_url.trim_end_matches('/'));
    debug!("GET {url}");
    let digests = client.get(&url).send().await?.error_for_status()?.json().await?;
    Ok(digests)
}

/// Register a video with the backend by URL
pub async fn create_video(client: &reqwest::Client, base_url: &str, video_url: &str) -> Result<Video> {
    let url = format!("{}/api/v1/videos/", base_url.trim_end_matches('/'));
    debug!("POST {url} ({video_url})");
    let body = serde_json::json!({ "url": video_url });
    let video = client
        .post(&url)
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(video)
}

/// Ask the backend to generate a new digest for a video. Generation runs in
/// a background task server-side; poll `fetch_video_digests` for the text.
pub async fn create_digest(client: &reqwest::Client, base_url: &str, video_id: i64) -> Result<Digest> {
    let url = format!("{}/api/v1/digests/", base_url.trim_end_matches('/'));
    debug!("POST {url} (video {video_id})");
    let body = serde_json::json!({ "video_id": video_id });
    let digest = client
        .post(&url)
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(digest)
}

pub async fn fetch_channels(client: &reqwest::Client, base_url: &str) -> Result<Vec<Channel>> {
    let url = format!("{}/api/v1/channels/", base_url.trim_end_matches('/'));
    debug!("GET {url}");
    let channels = client.get(&url).send().await?.error_for_status()?.json().await?;
    Ok(channels)
}

pub async fn fetch_categories(client: &reqwest::Client, base_url: &str) -> Result<Vec<Category>> {
    let url = format!("{}/api/v1/categories/", base_url.trim_end_matches('/'));
    debug!("GET {url}");
    let categories = client.get(&url).send().await?.error_for_status()?.json().await?;
    Ok(categories)
}

/// Find a library record by YouTube video ID. The backend has no lookup
/// route keyed on YouTube IDs, so this matches against the listing.
pub fn find_by_youtube_id<'a>(videos: &'a [Video], youtube_id: &str) -> Option<&'a Video> {
    videos.iter().find(|video| {
        video.youtube_id.as_deref() == Some(youtube_id)
            || video.url.as_deref().is_some_and(|url| url.contains(youtube_id))
    })
}

/// Newest digest that actually carries text. The backend returns digests in
/// insertion order, so scanning from the back finds the latest finished one.
pub fn latest_digest(digests: &[Digest]) -> Option<&Digest> {
    digests
        .iter()
        .rev()
        .find(|digest| digest.digest.as_deref().is_some_and(|text| !text.trim().is_empty()))
}

/// Newest digest with text whose id is greater than `newer_than`. Used when
/// polling after a generation request, so earlier finished digests don't
/// satisfy the wait.
pub fn fresh_digest(digests: &[Digest], newer_than: i64) -> Option<&Digest> {
    digests.iter().rev().find(|digest| {
        digest.id > newer_than
            && digest.digest.as_deref().is_some_and(|text| !text.trim().is_empty())
    })
}
