use std::path::PathBuf;
use std::time::Duration;

use crate::config::{parse_result_count, Config};
use crate::error::Result;
use crate::pipeline::{EnrichedVideo, ReactionPipeline};

/// Command-line overrides for a search run
pub struct SearchOptions {
    pub count: String,
    pub json: bool,
    pub output_dir: Option<PathBuf>,
    pub delay_ms: Option<u64>,
}

pub async fn run(query: &str, options: SearchOptions) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(dir) = options.output_dir {
        config.output_dir = dir;
    }
    if let Some(ms) = options.delay_ms {
        config.courtesy_delay = Duration::from_millis(ms);
    }

    let max_results = parse_result_count(&options.count);
    eprintln!("Searching YouTube for: {}", query);

    let pipeline = ReactionPipeline::new(&config)?;
    let outcome = pipeline.run(query, max_results).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome.records)?);
        return Ok(());
    }

    println!(
        "Top {} of {} video(s) for '{}' by reaction score:\n",
        outcome.records.len(),
        outcome.stats.admitted,
        query
    );

    for (i, video) in outcome.records.iter().enumerate() {
        print_ranked_video(i + 1, video);
    }

    println!("Saved: {}", outcome.csv_path.display());

    Ok(())
}

fn print_ranked_video(index: usize, video: &EnrichedVideo) {
    println!(
        "{}. {} - {} ({})",
        index, video.video.title, video.video.channel_title, video.video.duration
    );
    println!(
        "   반응도 {:.2} [{}] | 조회수 {} | 구독자 {}",
        video.reaction_score,
        video.reaction_level,
        video.view_count_simple,
        video.subscriber_count_formatted
    );
    println!("   {}", video.url);
    println!("   {}", video.preview_thumbnail_url);
    println!();
}
