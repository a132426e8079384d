// src/harvest/record.rs
// =============================================================================
// One output row per harvested video.
//
// A VideoRecord is the API's VideoDetails plus what we know about the
// channel at harvest time: its id, its subscriber count, and the
// view-to-subscriber ratio derived from them.
// =============================================================================

use super::api::VideoDetails;
use crate::channel::ChannelId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub channel_id: ChannelId,
    pub title: String,
    pub view_count: u64,
    pub channel_subscribers: u64,
    /// view_count / channel_subscribers
    pub view_to_sub: f64,
    pub like_count: Option<u64>,
    pub dislike_count: Option<u64>,
    pub comment_count: Option<u64>,
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

impl VideoRecord {
    // Builds the row for a video of `channel`
    //
    // `subscribers` must be at least 1. The harvester only gets here for
    // channels at or above the subscriber floor, and HarvestOptions::validate
    // keeps that floor >= 1.
    pub fn from_details(details: VideoDetails, channel: &ChannelId, subscribers: u64) -> Self {
        debug_assert!(subscribers > 0, "view-to-sub ratio needs a subscriber count");

        VideoRecord {
            view_to_sub: details.view_count as f64 / subscribers as f64,
            id: details.id,
            channel_id: channel.clone(),
            title: details.title,
            view_count: details.view_count,
            channel_subscribers: subscribers,
            like_count: details.like_count,
            dislike_count: details.dislike_count,
            comment_count: details.comment_count,
            duration: details.duration,
            description: details.description,
            dimension: details.dimension,
            definition: details.definition,
            caption: details.caption,
            published_at: details.published_at,
            tags: details.tags,
            category_id: details.category_id,
            thumbnail_url: details.thumbnail_url,
            localizations: details.localizations,
            topic_categories: details.topic_categories,
            default_language: details.default_language,
        }
    }
}
