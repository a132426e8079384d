// src/main.rs
// =============================================================================
// Entry point of the channel-harvester CLI.
//
// What happens here:
// 1. Load .env, set up logging, parse command-line arguments
// 2. Dispatch to the subcommand handler (channels, videos, collect)
// 3. Print and optionally save the results
// 4. Exit with a code: 0 = done, 1 = harvest stopped early, 2 = error
// =============================================================================

mod channel; // src/channel.rs - channel ids and the uploads playlist trick
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - settings and logging
mod crawl; // src/crawl/ - discovering channels
mod harvest; // src/harvest/ - collecting video metadata
mod output; // src/output.rs - tables, JSON, files
#[cfg(test)]
mod test_support; // src/test_support.rs - canned HTTP server for tests

use anyhow::{Context, Result};
use channel::{parse_channel_list, ChannelId};
use clap::Parser;
use cli::{Cli, Commands, CrawlArgs, HarvestArgs};
use config::Config;
use crawl::{
    crawl_channels, ChannelLinkMatcher, ChannelLinksProvider, CheckpointSink, CrawlOptions,
    CrawlOutcome, FileCheckpointSink, HttpLinksProvider, NoCheckpoints, SnapshotLinksProvider,
};
use harvest::{harvest, Harvest, HarvestOptions, YouTubeDataClient};
use std::path::Path;

#[tokio::main]
async fn main() {
    config::load_environment();
    config::init_logger();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = finished
//   Ok(1) = harvest stopped early (quota or upstream failure), partial results
//   Err   = configuration or fatal error
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Channels {
            crawl,
            output: output_path,
            json,
        } => {
            let config = Config::from_args(&cli.global, None)?;
            let outcome = run_crawl(&crawl, &config).await?;

            output::print_crawl(&outcome, json)?;
            if let Some(path) = output_path {
                output::write_channel_list(&path, &outcome.channels)?;
            }
            Ok(0)
        }
        Commands::Videos {
            channels,
            channels_file,
            harvest,
            output: output_path,
            json,
        } => {
            let config = Config::from_args(&cli.global, Some(&harvest))?;
            let mut channel_ids: Vec<ChannelId> = channels.into_iter().map(ChannelId::from).collect();
            if let Some(path) = channels_file {
                channel_ids.extend(read_channel_file(&path)?);
            }

            run_harvest(&channel_ids, &harvest, &config, output_path.as_deref(), json).await
        }
        Commands::Collect {
            crawl,
            harvest,
            channels_output,
            output: output_path,
            json,
        } => {
            let config = Config::from_args(&cli.global, Some(&harvest))?;
            // Bad harvest settings should fail before the (slow) crawl starts
            harvest_options(&harvest).validate()?;
            config.require_api_key()?;

            let outcome = run_crawl(&crawl, &config).await?;
            println!(
                "🔎 Found {} channel(s), {} new",
                outcome.channels.len(),
                outcome.discovered.len()
            );
            if let Some(path) = channels_output {
                output::write_channel_list(&path, &outcome.channels)?;
            }

            run_harvest(&outcome.channels, &harvest, &config, output_path.as_deref(), json).await
        }
    }
}

// Handles the crawl half: picks the link source and checkpoint sink
async fn run_crawl(args: &CrawlArgs, config: &Config) -> Result<CrawlOutcome> {
    let seeds: Vec<ChannelId> = args.seeds.iter().map(|s| ChannelId::from(s.trim())).collect();

    for seed in seeds.iter().filter(|s| !s.is_raw()) {
        tracing::warn!(seed = %seed, "seed does not look like a channel id (UC...)");
    }

    let options = CrawlOptions {
        depth: args.depth,
        checkpoint_every: args.checkpoint_every,
        matcher: match args.match_offset {
            Some(offset) => ChannelLinkMatcher::FixedOffset(offset),
            None => ChannelLinkMatcher::Marker,
        },
        delay: config.delay,
    };

    tracing::info!(seeds = seeds.len(), depth = options.depth, "starting channel crawl");

    let provider: Box<dyn ChannelLinksProvider> = match &args.links_snapshot {
        Some(path) => Box::new(
            SnapshotLinksProvider::from_path(path)
                .with_context(|| format!("Could not load link snapshot {}", path.display()))?,
        ),
        None => Box::new(HttpLinksProvider::new(config.timeout)?),
    };

    let mut sink: Box<dyn CheckpointSink> = if args.checkpoint_every > 0 {
        Box::new(FileCheckpointSink::new(&args.checkpoint_dir))
    } else {
        Box::new(NoCheckpoints)
    };

    let outcome = crawl_channels(provider.as_ref(), sink.as_mut(), &seeds, &options)
        .await
        .context("Channel crawl failed")?;
    Ok(outcome)
}

// Handles the harvest half and turns a partial result into exit code 1
async fn run_harvest(
    channels: &[ChannelId],
    args: &HarvestArgs,
    config: &Config,
    output_path: Option<&Path>,
    json: bool,
) -> Result<i32> {
    let options = harvest_options(args);
    options.validate()?;

    let api = YouTubeDataClient::new(config.require_api_key()?, &config.api_base, config.timeout)?;

    tracing::info!(
        channels = channels.len(),
        videos_per_channel = options.videos_per_channel,
        subscriber_floor = options.subscriber_floor,
        "starting video harvest"
    );

    let result: Harvest = harvest(&api, channels, &options).await?;
    let scraped_at = chrono::Utc::now();

    output::print_harvest(&result, json, scraped_at)?;
    if let Some(path) = output_path {
        output::write_harvest(path, &result, scraped_at)?;
    }

    Ok(if result.is_partial() { 1 } else { 0 })
}

fn harvest_options(args: &HarvestArgs) -> HarvestOptions {
    HarvestOptions {
        videos_per_channel: args.videos_per_channel,
        subscriber_floor: args.subscriber_floor,
    }
}

fn read_channel_file(path: &Path) -> Result<Vec<ChannelId>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read channel file {}", path.display()))?;
    Ok(parse_channel_list(&text))
}
