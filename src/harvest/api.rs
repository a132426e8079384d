// src/harvest/api.rs
// =============================================================================
// The three YouTube Data API calls the harvester needs, as a trait.
//
// Every call answers with an ApiOutcome instead of signalling "not found" or
// "quota exceeded" through errors, so the harvester can match on it.
// Err(ApiError) is reserved for transport failures and unexpected statuses.
// =============================================================================

use super::ApiError;
use crate::channel::ChannelId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Answer of a single API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Found(T),
    /// The resource does not exist
    NotFound,
    /// Request budget used up, stop asking
    QuotaExceeded,
    /// The resource exists but a required field is missing (field path inside)
    PartiallyMissing(String),
}

impl<T> ApiOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Found(value) => ApiOutcome::Found(f(value)),
            ApiOutcome::NotFound => ApiOutcome::NotFound,
            ApiOutcome::QuotaExceeded => ApiOutcome::QuotaExceeded,
            ApiOutcome::PartiallyMissing(field) => ApiOutcome::PartiallyMissing(field),
        }
    }

    /// Like map, but the Found payload may itself turn into another outcome.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> ApiOutcome<U>) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Found(value) => f(value),
            ApiOutcome::NotFound => ApiOutcome::NotFound,
            ApiOutcome::QuotaExceeded => ApiOutcome::QuotaExceeded,
            ApiOutcome::PartiallyMissing(field) => ApiOutcome::PartiallyMissing(field),
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, ApiOutcome::QuotaExceeded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatistics {
    /// None when the channel hides its subscriber count
    pub subscriber_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub video_id: String,
}

/// Video fields as returned by the videos endpoint.
///
/// The required ones (id, title, view count, duration, publish time) are
/// plain values; a response missing any of them never becomes a VideoDetails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub view_count: u64,
    pub like_count: Option<u64>,
    pub dislike_count: Option<u64>,
    pub comment_count: Option<u64>,
    /// ISO-8601 duration, e.g. "PT4M13S"
    pub duration: String,
    pub description: String,
    pub dimension: Option<String>,
    pub definition: Option<String>,
    pub caption: Option<bool>,
    pub published_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub category_id: Option<String>,
    pub thumbnail_url: Option<String>,
    pub localizations: BTreeSet<String>,
    pub topic_categories: Vec<String>,
    pub default_language: Option<String>,
}

#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Statistics of one channel. NotFound when the id matches nothing.
    async fn channel_statistics(
        &self,
        channel: &ChannelId,
    ) -> Result<ApiOutcome<ChannelStatistics>, ApiError>;

    /// Up to `limit` entries of a playlist, in playlist order.
    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<ApiOutcome<Vec<PlaylistItem>>, ApiError>;

    async fn video_details(&self, video_id: &str) -> Result<ApiOutcome<VideoDetails>, ApiError>;
}
