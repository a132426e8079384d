// src/output.rs
// =============================================================================
// Printing and saving results.
//
// - Tables for people, pretty JSON for scripts (--json)
// - Channel lists are saved as plain text, one id per line
// - Harvests are saved as JSON with the time they were scraped
// =============================================================================

use crate::channel::ChannelId;
use crate::crawl::CrawlOutcome;
use crate::harvest::{Harvest, HarvestReport, StopReason, VideoRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

// What ends up in a harvest JSON file
#[derive(Debug, Serialize)]
pub struct HarvestExport<'a> {
    pub scraped_at: DateTime<Utc>,
    pub videos: &'a [VideoRecord],
    pub report: &'a HarvestReport,
}

impl<'a> HarvestExport<'a> {
    pub fn new(harvest: &'a Harvest, scraped_at: DateTime<Utc>) -> Self {
        HarvestExport {
            scraped_at,
            videos: &harvest.videos,
            report: &harvest.report,
        }
    }
}

#[derive(Debug, Serialize)]
struct CrawlExport<'a> {
    channels: &'a [ChannelId],
    discovered: &'a [ChannelId],
    pages_fetched: usize,
}

pub fn print_crawl(outcome: &CrawlOutcome, json: bool) -> Result<()> {
    if json {
        let export = CrawlExport {
            channels: &outcome.channels,
            discovered: &outcome.discovered,
            pages_fetched: outcome.pages_fetched,
        };
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    println!("{:<30} {:<10}", "CHANNEL", "SOURCE");
    println!("{}", "=".repeat(41));
    for channel in &outcome.channels {
        let source = if outcome.discovered.contains(channel) {
            "found"
        } else {
            "seed"
        };
        println!("{:<30} {:<10}", channel, source);
    }

    println!();
    println!("📊 Summary:");
    println!("   🌱 Seeds: {}", outcome.channels.len() - outcome.discovered.len());
    println!("   🔎 Discovered: {}", outcome.discovered.len());
    println!("   📄 Pages fetched: {}", outcome.pages_fetched);
    println!("   🔗 Targets seen: {}", outcome.visited.len());
    if outcome.checkpoints_written > 0 {
        println!("   💾 Checkpoints: {}", outcome.checkpoints_written);
    }
    Ok(())
}

pub fn print_harvest(harvest: &Harvest, json: bool, scraped_at: DateTime<Utc>) -> Result<()> {
    if json {
        let export = HarvestExport::new(harvest, scraped_at);
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    println!(
        "{:<14} {:<26} {:>12} {:>12} {:>9} {:<40}",
        "VIDEO", "CHANNEL", "VIEWS", "SUBSCRIBERS", "RATIO", "TITLE"
    );
    println!("{}", "=".repeat(118));
    for video in &harvest.videos {
        println!(
            "{:<14} {:<26} {:>12} {:>12} {:>9.3} {:<40}",
            video.id,
            video.channel_id,
            video.view_count,
            video.channel_subscribers,
            video.view_to_sub,
            truncate(&video.title, 40)
        );
    }
    println!();

    print_report(&harvest.report);
    Ok(())
}

fn print_report(report: &HarvestReport) {
    print_channel_list("❓ Channels that do not exist:", &report.not_found);
    print_channel_list("🙈 Channels hiding their subscriber count:", &report.subscribers_hidden);
    print_channel_list("📭 Channels without videos:", &report.no_videos);

    if !report.insufficient.is_empty() {
        println!("📉 Channels with fewer videos than requested:");
        for (channel, found) in &report.insufficient {
            println!("   {} ({} found)", channel, found);
        }
    }

    if !report.incomplete_videos.is_empty() {
        println!("⚠️  Videos skipped for missing fields:");
        for video in &report.incomplete_videos {
            println!("   {} ({}: missing {})", video.video_id, video.channel_id, video.missing);
        }
    }

    println!("📊 Summary:");
    println!("   ✅ Channels processed: {}", report.channels_processed);
    match &report.stop {
        Some(StopReason::QuotaExceeded { channel }) => {
            println!("   ⛔ Stopped at {}: API quota exceeded, results are partial", channel)
        }
        Some(StopReason::Upstream { channel, message }) => {
            println!("   ⛔ Stopped at {}: {}", channel, message)
        }
        None => {}
    }
}

fn print_channel_list(title: &str, channels: &[ChannelId]) {
    if channels.is_empty() {
        return;
    }
    println!("{}", title);
    for channel in channels {
        println!("   {}", channel);
    }
}

// Shortens text to `max` characters for table cells
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

pub fn write_channel_list(path: &Path, channels: &[ChannelId]) -> Result<()> {
    create_parent(path)?;
    let body: Vec<&str> = channels.iter().map(|c| c.as_str()).collect();
    fs::write(path, body.join("\n"))
        .with_context(|| format!("Could not write channel list to {}", path.display()))?;
    tracing::info!(path = %path.display(), channels = channels.len(), "channel list saved");
    Ok(())
}

pub fn write_harvest(path: &Path, harvest: &Harvest, scraped_at: DateTime<Utc>) -> Result<()> {
    create_parent(path)?;
    let export = HarvestExport::new(harvest, scraped_at);
    let json = serde_json::to_string_pretty(&export)?;
    fs::write(path, json)
        .with_context(|| format!("Could not write harvest to {}", path.display()))?;
    tracing::info!(path = %path.display(), videos = harvest.videos.len(), "harvest saved");
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create directory {}", parent.display()))?;
        }
    }
    Ok(())
}
