//! Search → details → channels → score → rank.
//!
//! Each run refetches everything; nothing is cached between runs.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{format_grouped, format_magnitude};
use crate::reaction::{reaction_score, ReactionLevel};
use crate::report::DisplayTable;
use crate::youtube::{
    thumbnail_url, watch_url, ChannelSubscriberMap, ThumbnailSize, VideoRecord, YouTubeClient,
};

/// Channels with fewer subscribers are excluded from results entirely
pub const MIN_SUBSCRIBERS: u64 = 100;

/// Longest ranked list a run returns
pub const MAX_RANKED_RESULTS: usize = 100;

/// A video joined with its channel's audience and scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedVideo {
    #[serde(flatten)]
    pub video: VideoRecord,
    pub subscriber_count: u64,
    pub subscriber_count_formatted: String,
    pub view_count_simple: String,
    pub view_count_formatted: String,
    pub reaction_score: f64,
    pub reaction_level: ReactionLevel,
    pub url: String,
    pub thumbnail_url: String,
    /// Smaller image for previews
    pub preview_thumbnail_url: String,
}

impl EnrichedVideo {
    pub fn new(video: VideoRecord, subscriber_count: u64) -> Self {
        let score = reaction_score(video.view_count, subscriber_count);
        let url = watch_url(&video.video_id);
        let preview_thumbnail_url = thumbnail_url(&video.video_id, ThumbnailSize::Medium);
        let thumbnail_url = thumbnail_url(&video.video_id, ThumbnailSize::High);

        Self {
            subscriber_count,
            subscriber_count_formatted: format_grouped(subscriber_count),
            view_count_simple: format_magnitude(video.view_count),
            view_count_formatted: format_grouped(video.view_count),
            reaction_score: score,
            reaction_level: ReactionLevel::classify(score),
            url,
            thumbnail_url,
            preview_thumbnail_url,
            video,
        }
    }
}

/// How many items each stage produced or dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub ids_collected: usize,
    pub search_skipped: usize,
    pub videos_fetched: usize,
    pub videos_skipped: usize,
    pub channels_requested: usize,
    pub channels_skipped: usize,
    pub below_min_subscribers: usize,
    pub admitted: usize,
    pub ranked: usize,
}

/// Everything a successful run hands back to the caller
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub table: DisplayTable,
    /// Same order as `table.rows`, with ids and raw counts kept
    pub records: Vec<EnrichedVideo>,
    pub csv_path: PathBuf,
    pub stats: PipelineStats,
}

/// Distinct channel ids in first-seen order
pub fn distinct_channel_ids(videos: &[VideoRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    videos
        .iter()
        .filter(|v| seen.insert(v.channel_id.as_str()))
        .map(|v| v.channel_id.clone())
        .collect()
}

/// Admit, score and sort videos; returns the ranked list and how many were filtered out.
///
/// Ties keep their input order.
pub fn rank_videos(
    videos: Vec<VideoRecord>,
    subscribers: &ChannelSubscriberMap,
) -> (Vec<EnrichedVideo>, usize) {
    let total = videos.len();

    let mut ranked: Vec<EnrichedVideo> = videos
        .into_iter()
        .filter_map(|video| {
            let count = subscribers.get(&video.channel_id).copied().unwrap_or(0);
            (count >= MIN_SUBSCRIBERS).then(|| EnrichedVideo::new(video, count))
        })
        .collect();

    let rejected = total - ranked.len();

    ranked.sort_by(|a, b| b.reaction_score.total_cmp(&a.reaction_score));
    ranked.truncate(MAX_RANKED_RESULTS);

    (ranked, rejected)
}

pub struct ReactionPipeline {
    client: YouTubeClient,
    output_dir: PathBuf,
}

impl ReactionPipeline {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: YouTubeClient::new(config)?,
            output_dir: config.output_dir.clone(),
        })
    }

    /// Run one search end to end and write the CSV artifact
    pub async fn run(&self, query: &str, max_results: usize) -> Result<SearchOutcome> {
        let mut stats = PipelineStats::default();
        log::info!("Searching for \"{}\" (up to {} videos)", query, max_results);

        let search = self.client.search_video_ids(query, max_results).await?;
        stats.ids_collected = search.items.len();
        stats.search_skipped = search.skipped.len();
        log::info!("Collected {} video id(s)", stats.ids_collected);

        let details = self.client.fetch_video_details(&search.items).await?;
        stats.videos_fetched = details.items.len();
        stats.videos_skipped = details.skipped.len();

        let channel_ids = distinct_channel_ids(&details.items);
        stats.channels_requested = channel_ids.len();
        log::info!("Collected {} channel id(s)", channel_ids.len());
        if channel_ids.is_empty() {
            return Err(Error::NoEligibleChannels);
        }

        let channels = self.client.fetch_subscriber_counts(&channel_ids).await?;
        stats.channels_skipped = channels.skipped.len();

        let (records, rejected) = rank_videos(details.items, &channels.items);
        stats.below_min_subscribers = rejected;
        stats.admitted = stats.videos_fetched - rejected;
        stats.ranked = records.len();

        if records.is_empty() {
            return Err(Error::NoEligibleVideos {
                min_subscribers: MIN_SUBSCRIBERS,
            });
        }
        log::info!(
            "{} video(s) admitted, {} below {} subscribers",
            stats.admitted,
            rejected,
            MIN_SUBSCRIBERS
        );

        let table = DisplayTable::from_records(&records);
        let csv_path = table.write_csv(&self.output_dir, query)?;
        log::info!("Saved {}", csv_path.display());

        Ok(SearchOutcome {
            table,
            records,
            csv_path,
            stats,
        })
    }
}
