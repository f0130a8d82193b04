use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use yt_reaction::commands;
use yt_reaction::commands::search::SearchOptions;
use yt_reaction::config::load_env;

#[derive(Parser)]
#[command(name = "yt-reaction")]
#[command(about = "Rank YouTube search results by views relative to channel subscribers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search YouTube and rank results by reaction score
    Search {
        /// Search query
        query: String,

        /// Number of videos to collect (default: 30)
        #[arg(short = 'n', long, default_value = "30")]
        count: String,

        /// Print full records as JSON instead of the ranked list
        #[arg(short, long)]
        json: bool,

        /// Directory for the CSV file (default: current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Pause between API requests in milliseconds (default: 1000)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Save the YouTube Data API key
    Init {
        /// YouTube Data API key
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load environment variables
    load_env();

    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search {
            query,
            count,
            json,
            output_dir,
            delay_ms,
        } => {
            let options = SearchOptions {
                count,
                json,
                output_dir,
                delay_ms,
            };
            commands::search::run(&query, options).await
        }
        Commands::Init { api_key, force } => commands::init::run(api_key, force),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
