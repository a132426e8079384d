// src/harvest/harvester.rs
// =============================================================================
// Walks a list of channels and collects their most recent videos.
//
// Per channel, in order:
// 1. Channel statistics. Unknown channel -> reported, next channel
// 2. Subscriber count hidden -> reported, next channel
// 3. Below the subscriber floor -> skipped silently
// 4. Uploads playlist ("UC..." -> "UU..."), at most N entries
// 5. Playlist missing or empty -> reported, next channel
// 6. Details for each entry. A video with missing fields is skipped alone
// 7. Fewer than N entries -> reported as insufficient
//
// A quota signal (or an upstream failure) on any call ends the run. What was
// collected for fully handled channels is returned as a normal result. The
// channel that was interrupted contributes nothing.
// =============================================================================

use super::api::{ApiOutcome, VideoApi};
use super::record::VideoRecord;
use super::{ApiError, HarvestError};
use crate::channel::ChannelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestOptions {
    /// Most recent uploads to fetch per channel (>= 1)
    pub videos_per_channel: u32,
    /// Channels with fewer subscribers are skipped (>= 1)
    pub subscriber_floor: u64,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        HarvestOptions {
            videos_per_channel: 1,
            subscriber_floor: 1000,
        }
    }
}

impl HarvestOptions {
    /// Rejects a floor or a per-channel count below 1.
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.subscriber_floor < 1 {
            return Err(HarvestError::InvalidArgument(
                "subscriber floor should not be smaller than 1".to_string(),
            ));
        }
        if self.videos_per_channel < 1 {
            return Err(HarvestError::InvalidArgument(
                "videos per channel should not be smaller than 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Why a harvest ended before the last channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The API said the request budget is used up
    QuotaExceeded { channel: ChannelId },
    /// Transport failure or unexpected HTTP status
    Upstream { channel: ChannelId, message: String },
}

/// A video that was listed but whose details were incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteVideo {
    pub channel_id: ChannelId,
    pub video_id: String,
    pub missing: String,
}

/// Everything the harvest noticed besides the videos themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarvestReport {
    pub not_found: Vec<ChannelId>,
    pub subscribers_hidden: Vec<ChannelId>,
    pub no_videos: Vec<ChannelId>,
    /// Channels with fewer uploads than requested, and how many they had
    pub insufficient: BTreeMap<ChannelId, usize>,
    pub incomplete_videos: Vec<IncompleteVideo>,
    /// Channels fully handled, including skipped ones
    pub channels_processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopReason>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Harvest {
    pub videos: Vec<VideoRecord>,
    pub report: HarvestReport,
}

impl Harvest {
    /// True when the run stopped before the last channel.
    pub fn is_partial(&self) -> bool {
        self.report.stop.is_some()
    }
}

// How one channel ended
enum ChannelOutcome {
    NotFound,
    SubscribersHidden,
    BelowFloor(u64),
    NoVideos,
    Harvested {
        entries: usize,
        videos: Vec<VideoRecord>,
        incomplete: Vec<IncompleteVideo>,
    },
}

// Collects videos for each channel, in the order given
//
// Parameters:
//   api: the YouTube Data API (or a stand-in)
//   channels: channel ids to visit
//   options: videos per channel and subscriber floor
//
// Returns: the videos and the report. Err only for invalid options, checked
// before any API call.
pub async fn harvest<A>(
    api: &A,
    channels: &[ChannelId],
    options: &HarvestOptions,
) -> Result<Harvest, HarvestError>
where
    A: VideoApi + ?Sized,
{
    options.validate()?;

    let mut result = Harvest::default();

    for channel in channels {
        let outcome = match harvest_channel(api, channel, options).await {
            Ok(outcome) => outcome,
            Err(stop) => {
                match &stop {
                    StopReason::QuotaExceeded { .. } => tracing::warn!(
                        channel = %channel,
                        videos = result.videos.len(),
                        "YouTube API quota exceeded, returning partial results"
                    ),
                    StopReason::Upstream { message, .. } => tracing::error!(
                        channel = %channel,
                        error = %message,
                        videos = result.videos.len(),
                        "YouTube API request failed, returning partial results"
                    ),
                }
                result.report.stop = Some(stop);
                break;
            }
        };

        let report = &mut result.report;
        match outcome {
            ChannelOutcome::NotFound => {
                tracing::info!(channel = %channel, "channel does not exist");
                report.not_found.push(channel.clone());
            }
            ChannelOutcome::SubscribersHidden => {
                tracing::info!(channel = %channel, "subscriber count hidden");
                report.subscribers_hidden.push(channel.clone());
            }
            ChannelOutcome::BelowFloor(subscribers) => {
                tracing::debug!(channel = %channel, subscribers, "below subscriber floor");
            }
            ChannelOutcome::NoVideos => {
                tracing::info!(channel = %channel, "channel has no videos");
                report.no_videos.push(channel.clone());
            }
            ChannelOutcome::Harvested {
                entries,
                videos,
                incomplete,
            } => {
                tracing::info!(channel = %channel, videos = videos.len(), "channel harvested");
                if entries < options.videos_per_channel as usize {
                    report.insufficient.insert(channel.clone(), entries);
                }
                report.incomplete_videos.extend(incomplete);
                result.videos.extend(videos);
            }
        }
        result.report.channels_processed += 1;
    }

    tracing::info!(
        videos = result.videos.len(),
        channels = result.report.channels_processed,
        "harvest finished"
    );

    Ok(result)
}

// Runs steps 1-7 for a single channel. Err means "stop the whole run".
async fn harvest_channel<A>(
    api: &A,
    channel: &ChannelId,
    options: &HarvestOptions,
) -> Result<ChannelOutcome, StopReason>
where
    A: VideoApi + ?Sized,
{
    let statistics = match settle(api.channel_statistics(channel).await, channel)? {
        ApiOutcome::Found(statistics) => statistics,
        _ => return Ok(ChannelOutcome::NotFound),
    };

    let Some(subscribers) = statistics.subscriber_count else {
        return Ok(ChannelOutcome::SubscribersHidden);
    };

    if subscribers < options.subscriber_floor {
        return Ok(ChannelOutcome::BelowFloor(subscribers));
    }

    let playlist_id = channel.uploads_playlist_id();
    let mut items = match settle(
        api.playlist_items(&playlist_id, options.videos_per_channel).await,
        channel,
    )? {
        ApiOutcome::Found(items) if !items.is_empty() => items,
        _ => return Ok(ChannelOutcome::NoVideos),
    };
    items.truncate(options.videos_per_channel as usize);

    let mut videos = Vec::with_capacity(items.len());
    let mut incomplete = Vec::new();

    for item in &items {
        match settle(api.video_details(&item.video_id).await, channel)? {
            ApiOutcome::Found(details) => {
                videos.push(VideoRecord::from_details(details, channel, subscribers));
            }
            ApiOutcome::PartiallyMissing(missing) => {
                tracing::debug!(video = %item.video_id, missing = %missing, "skipping incomplete video");
                incomplete.push(IncompleteVideo {
                    channel_id: channel.clone(),
                    video_id: item.video_id.clone(),
                    missing,
                });
            }
            _ => {
                incomplete.push(IncompleteVideo {
                    channel_id: channel.clone(),
                    video_id: item.video_id.clone(),
                    missing: "video".to_string(),
                });
            }
        }
    }

    Ok(ChannelOutcome::Harvested {
        entries: items.len(),
        videos,
        incomplete,
    })
}

// Turns the run-ending answers (quota, upstream failure) into a StopReason
// and passes everything else through
fn settle<T>(
    response: Result<ApiOutcome<T>, ApiError>,
    channel: &ChannelId,
) -> Result<ApiOutcome<T>, StopReason> {
    match response {
        Ok(ApiOutcome::QuotaExceeded) => Err(StopReason::QuotaExceeded {
            channel: channel.clone(),
        }),
        Ok(outcome) => Ok(outcome),
        Err(e) => Err(StopReason::Upstream {
            channel: channel.clone(),
            message: e.to_string(),
        }),
    }
}
