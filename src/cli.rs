// src/cli.rs
// =============================================================================
// Command-line interface, built with clap's derive API.
//
//   channel-harvester channels <SEEDS>... [--depth N] [--checkpoint-every N]
//   channel-harvester videos [CHANNELS]... [--channels-file FILE]
//   channel-harvester collect <SEEDS>... (crawl, then harvest the result)
//
// The API key and base URL may also come from the environment
// (YOUTUBE_API_KEY, YOUTUBE_API_BASE), including a .env file.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "channel-harvester",
    version,
    about = "Discover YouTube channels through their linked channels and harvest recent video metadata",
    long_about = "channel-harvester crawls the 'channels' tab of YouTube channels to find related \
                  channels, then uses the YouTube Data API to collect details of their most recent \
                  videos. A quota error ends the harvest early but keeps everything collected so far."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// HTTP timeout per request, in seconds
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Pause between channel page fetches, in milliseconds
    #[arg(long, global = true, default_value_t = 100)]
    pub delay_ms: u64,

    /// Base URL of the YouTube Data API
    #[arg(long, global = true, env = "YOUTUBE_API_BASE")]
    pub api_base: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover channels linked from the seed channels
    ///
    /// Example: channel-harvester channels UCYO_jab_esuFRV4b17AJtAw --depth 2
    Channels {
        #[command(flatten)]
        crawl: CrawlArgs,

        /// Write the channel ids to this file, one per line
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Harvest recent videos of the given channels
    ///
    /// Example: channel-harvester videos UCYO_jab_esuFRV4b17AJtAw --videos-per-channel 5
    Videos {
        /// Channel ids to harvest
        channels: Vec<String>,

        /// File with one channel id per line (added after the positional ids)
        #[arg(long)]
        channels_file: Option<PathBuf>,

        #[command(flatten)]
        harvest: HarvestArgs,

        /// Write the videos and the report to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Discover channels, then harvest their videos
    Collect {
        #[command(flatten)]
        crawl: CrawlArgs,

        #[command(flatten)]
        harvest: HarvestArgs,

        /// Write the discovered channel ids to this file
        #[arg(long)]
        channels_output: Option<PathBuf>,

        /// Write the videos and the report to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Channel ids to start from
    #[arg(required = true)]
    pub seeds: Vec<String>,

    /// Rounds of linked channels to follow (0 = just the seeds)
    #[arg(long, default_value_t = 1)]
    pub depth: usize,

    /// Write a checkpoint of the results every N pages (0 = never)
    #[arg(long, default_value_t = 0)]
    pub checkpoint_every: usize,

    /// Directory for checkpoint files
    #[arg(long, default_value = "data/channels/checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Cut channel ids from links at this byte offset instead of after "channel/"
    ///
    /// 32 matches links of the form https://www.youtube.com/channel/<id>
    #[arg(long)]
    pub match_offset: Option<usize>,

    /// Read linked channels from a JSON snapshot instead of fetching pages
    #[arg(long)]
    pub links_snapshot: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Most recent videos to collect per channel
    #[arg(long, default_value_t = 1)]
    pub videos_per_channel: u32,

    /// Skip channels with fewer subscribers than this
    #[arg(long, default_value_t = 1000)]
    pub subscriber_floor: u64,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// File holding the API key (used when --api-key is not set)
    #[arg(long)]
    pub api_key_file: Option<PathBuf>,
}
