//! YouTube Data API v3 client.
//!
//! Covers the three list endpoints the ranking pipeline needs: search,
//! video details and channel statistics. Batch lookups are split into
//! chunks of [`MAX_BATCH_SIZE`] ids and issued one after another with a
//! fixed courtesy delay in between. Individual items that cannot be used
//! are reported in [`FetchReport::skipped`] instead of failing the call.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use backoff::future::retry_notify;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{Config, Endpoints, RetryPolicy};
use crate::error::{Error, Result};
use crate::format::normalize_duration;

/// Largest page or id batch a single API call accepts
pub const MAX_BATCH_SIZE: usize = 50;

/// Channel id -> subscriber count
pub type ChannelSubscriberMap = HashMap<String, u64>;

/// Thumbnail resolutions served by img.youtube.com
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSize {
    /// 320x180, used for previews
    Medium,
    /// 480x360
    High,
}

impl ThumbnailSize {
    fn file_name(&self) -> &'static str {
        match self {
            ThumbnailSize::Medium => "mqdefault.jpg",
            ThumbnailSize::High => "hqdefault.jpg",
        }
    }
}

/// Canonical watch page for a video
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

pub fn thumbnail_url(video_id: &str, size: ThumbnailSize) -> String {
    format!("https://img.youtube.com/vi/{}/{}", video_id, size.file_name())
}

/// Base video fields as returned by the details endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub channel_id: String,
    pub view_count: u64,
    pub published_at: String,
    pub duration_code: String,
    /// Human-readable duration, or "-" when the code was unreadable
    pub duration: String,
}

/// Why an upstream item was left out of a fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingVideoId,
    DuplicateVideoId,
    MissingChannelId,
    MalformedItem,
    MissingStatistics,
    MalformedStatistics,
    /// Requested by id but absent from the response (deleted, private, unknown)
    NotReturned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub id: Option<String>,
    pub reason: SkipReason,
}

impl SkippedItem {
    fn new(id: Option<String>, reason: SkipReason) -> Self {
        Self { id, reason }
    }
}

/// Items that were fetched successfully plus everything that was dropped
#[derive(Debug, Clone)]
pub struct FetchReport<T> {
    pub items: T,
    pub skipped: Vec<SkippedItem>,
}

impl<T> FetchReport<T> {
    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

/// Shared shape of every list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: SearchItemId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: Option<String>,
    #[serde(default)]
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
    #[serde(default)]
    content_details: VideoContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    channel_id: Option<String>,
    #[serde(default)]
    published_at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<Count>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: Option<String>,
    statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<Count>,
}

/// Counters are documented as decimal strings but plain numbers are accepted too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
}

impl Count {
    fn value(&self) -> Option<u64> {
        match self {
            Count::Number(n) => Some(*n),
            Count::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn item_id(item: &serde_json::Value) -> Option<String> {
    item.get("id").and_then(|v| v.as_str()).map(String::from)
}

fn parse_video_item(item: serde_json::Value) -> std::result::Result<VideoRecord, SkippedItem> {
    let raw_id = item_id(&item);
    let video: VideoItem = serde_json::from_value(item)
        .map_err(|_| SkippedItem::new(raw_id, SkipReason::MalformedItem))?;

    let video_id = match video.id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(SkippedItem::new(None, SkipReason::MissingVideoId)),
    };

    let channel_id = match video.snippet.channel_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(SkippedItem::new(Some(video_id), SkipReason::MissingChannelId)),
    };

    let view_count = match &video.statistics.view_count {
        None => 0,
        Some(count) => count
            .value()
            .ok_or_else(|| SkippedItem::new(Some(video_id.clone()), SkipReason::MalformedStatistics))?,
    };

    let duration = normalize_duration(&video.content_details.duration);

    Ok(VideoRecord {
        video_id,
        title: video.snippet.title,
        channel_title: video.snippet.channel_title,
        channel_id,
        view_count,
        published_at: video.snippet.published_at,
        duration_code: video.content_details.duration,
        duration,
    })
}

fn parse_channel_item(item: serde_json::Value) -> std::result::Result<(String, u64), SkippedItem> {
    let raw_id = item_id(&item);
    let channel: ChannelItem = serde_json::from_value(item)
        .map_err(|_| SkippedItem::new(raw_id, SkipReason::MalformedItem))?;

    let channel_id = match channel.id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(SkippedItem::new(None, SkipReason::MissingChannelId)),
    };

    let Some(count) = channel.statistics.and_then(|s| s.subscriber_count) else {
        return Err(SkippedItem::new(Some(channel_id), SkipReason::MissingStatistics));
    };

    match count.value() {
        Some(subscribers) => Ok((channel_id, subscribers)),
        None => Err(SkippedItem::new(Some(channel_id), SkipReason::MalformedStatistics)),
    }
}

/// Record every requested id the endpoint left out of its response
fn push_not_returned(
    requested: &[String],
    returned: &HashSet<String>,
    skipped: &mut Vec<SkippedItem>,
) {
    for id in requested {
        if !returned.contains(id) {
            skipped.push(SkippedItem::new(Some(id.clone()), SkipReason::NotReturned));
        }
    }
}

fn log_skipped(stage: &str, skipped: &[SkippedItem]) {
    for item in skipped {
        log::debug!("{}: skipped {:?} ({:?})", stage, item.id, item.reason);
    }
    if !skipped.is_empty() {
        log::warn!("{}: skipped {} item(s)", stage, skipped.len());
    }
}

/// YouTube Data API client
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    endpoints: Endpoints,
    courtesy_delay: Duration,
    retry: RetryPolicy,
}

impl YouTubeClient {
    pub fn new(config: &Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::ApiKeyMissing);
        }

        let client = Client::builder()
            .user_agent(concat!("yt-reaction/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoints: config.endpoints.clone(),
            courtesy_delay: config.courtesy_delay,
            retry: config.retry.clone(),
        })
    }

    async fn pause(&self) {
        if !self.courtesy_delay.is_zero() {
            tokio::time::sleep(self.courtesy_delay).await;
        }
    }

    /// Issue one GET and decode the body
    async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                endpoint,
                status,
                body,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET with exponential backoff on rate limiting, server errors and connection failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        retry_notify(
            self.retry.backoff(),
            move || async move {
                self.request_json(endpoint, url, params).await.map_err(|e| {
                    if e.is_transient() {
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            },
            |err: Error, wait: Duration| {
                log::warn!("{} request failed, retrying in {:?}: {}", endpoint, wait, err);
            },
        )
        .await
    }

    /// Collect up to `max_results` distinct video ids for a query, in relevance order
    pub async fn search_video_ids(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<FetchReport<Vec<String>>> {
        let mut ids: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        let mut skipped = Vec::new();
        let mut page_token: Option<String> = None;

        while ids.len() < max_results {
            let mut params = vec![
                ("part", "snippet".to_string()),
                ("q", query.to_string()),
                ("type", "video".to_string()),
                ("order", "relevance".to_string()),
                ("maxResults", MAX_BATCH_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let page: ListResponse = self
                .get_json("search", &self.endpoints.search, &params)
                .await?;

            let before = ids.len();
            for item in page.items {
                match serde_json::from_value::<SearchItem>(item) {
                    Ok(SearchItem {
                        id: SearchItemId { video_id: Some(id) },
                    }) if !id.is_empty() => {
                        if seen.insert(id.clone()) {
                            ids.push(id);
                        } else {
                            skipped.push(SkippedItem::new(Some(id), SkipReason::DuplicateVideoId));
                        }
                    }
                    Ok(_) => skipped.push(SkippedItem::new(None, SkipReason::MissingVideoId)),
                    Err(_) => skipped.push(SkippedItem::new(None, SkipReason::MalformedItem)),
                }
            }

            page_token = page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() || ids.len() >= max_results {
                break;
            }
            // Pages that only repeat earlier results would keep the token chain going forever
            if ids.len() == before {
                log::warn!("search: page added no new videos, stopping at {}", ids.len());
                break;
            }
            self.pause().await;
        }

        ids.truncate(max_results);
        log_skipped("search", &skipped);

        Ok(FetchReport {
            items: ids,
            skipped,
        })
    }

    /// Fetch snippet, statistics and duration for each id, in batches
    pub async fn fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<FetchReport<Vec<VideoRecord>>> {
        let mut records = Vec::with_capacity(video_ids.len());
        let mut skipped = Vec::new();

        for (i, chunk) in video_ids.chunks(MAX_BATCH_SIZE).enumerate() {
            if i > 0 {
                self.pause().await;
            }

            let params = [
                ("part", "snippet,statistics,contentDetails".to_string()),
                ("id", chunk.join(",")),
            ];
            let page: ListResponse = self
                .get_json("videos", &self.endpoints.videos, &params)
                .await?;

            let returned: HashSet<String> = page.items.iter().filter_map(item_id).collect();
            push_not_returned(chunk, &returned, &mut skipped);

            for item in page.items {
                match parse_video_item(item) {
                    Ok(record) => records.push(record),
                    Err(skip) => skipped.push(skip),
                }
            }
        }

        log_skipped("videos", &skipped);

        Ok(FetchReport {
            items: records,
            skipped,
        })
    }

    /// Fetch subscriber counts for each channel id, in batches
    pub async fn fetch_subscriber_counts(
        &self,
        channel_ids: &[String],
    ) -> Result<FetchReport<ChannelSubscriberMap>> {
        let mut subscribers = ChannelSubscriberMap::with_capacity(channel_ids.len());
        let mut skipped = Vec::new();

        for (i, chunk) in channel_ids.chunks(MAX_BATCH_SIZE).enumerate() {
            if i > 0 {
                self.pause().await;
            }

            let params = [("part", "statistics".to_string()), ("id", chunk.join(","))];
            let page: ListResponse = self
                .get_json("channels", &self.endpoints.channels, &params)
                .await?;

            let returned: HashSet<String> = page.items.iter().filter_map(item_id).collect();
            push_not_returned(chunk, &returned, &mut skipped);

            for item in page.items {
                match parse_channel_item(item) {
                    Ok((channel_id, count)) => {
                        subscribers.insert(channel_id, count);
                    }
                    Err(skip) => skipped.push(skip),
                }
            }
        }

        log_skipped("channels", &skipped);

        Ok(FetchReport {
            items: subscribers,
            skipped,
        })
    }
}
