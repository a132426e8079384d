// src/harvest/mod.rs
// =============================================================================
// This module collects video metadata for a list of channels.
//
// Submodules:
// - api: the VideoApi trait and what its calls can answer
// - youtube: VideoApi over the YouTube Data API v3 (reqwest)
// - record: the per-video row we produce
// - harvester: the per-channel loop, soft failures and the quota stop
// =============================================================================

mod api;
mod harvester;
mod record;
mod youtube;

pub use api::{ApiOutcome, ChannelStatistics, PlaylistItem, VideoApi, VideoDetails};
pub use harvester::{harvest, Harvest, HarvestOptions, HarvestReport, IncompleteVideo, StopReason};
pub use record::VideoRecord;
pub use youtube::{YouTubeDataClient, DEFAULT_API_BASE};

use thiserror::Error;

// Failures of a single API call that are not part of the normal answers
// (found / not found / quota / incomplete).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("YouTube API returned HTTP {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
}

// Errors returned by harvest() itself. Everything upstream is reported
// inside the Harvest instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HarvestError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
