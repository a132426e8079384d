// src/harvest/youtube.rs
// =============================================================================
// VideoApi backed by the YouTube Data API v3.
//
// Endpoints used (each costs 1 quota unit per request):
// - channels?part=statistics            -> subscriber count
// - playlistItems?part=snippet          -> video ids of the uploads playlist
// - videos?part=snippet,statistics,...  -> the video row itself
//
// Error mapping:
// - 429, or 403 with a quota/rate-limit reason -> QuotaExceeded
// - 404                                        -> NotFound
// - anything else non-2xx                      -> ApiError::Status
// =============================================================================

use super::api::{ApiOutcome, ChannelStatistics, PlaylistItem, VideoApi, VideoDetails};
use super::ApiError;
use crate::channel::ChannelId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

// playlistItems refuses maxResults above 50
const MAX_PAGE_SIZE: u32 = 50;

const VIDEO_PARTS: &str = "id,snippet,statistics,contentDetails,topicDetails,localizations";

// 403 reasons that mean "come back later"
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "rateLimitExceeded",
    "dailyLimitExceeded",
    "userRateLimitExceeded",
];

const API_KEY_HEADER: &str = "X-Goog-Api-Key";

const QUOTA_MESSAGE_PREFIX: &str = "The request cannot be completed because you have exceeded your";

pub struct YouTubeDataClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeDataClient {
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(YouTubeDataClient {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    // GETs an endpoint and returns the JSON body, or how the call failed
    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<ApiOutcome<Value>, ApiError> {
        // The key travels in a header so it never shows up in request URLs,
        // and therefore never in error messages or saved reports
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(params)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await
            .map_err(|e| ApiError::Http(e.without_url()))?;

        let status = response.status();
        if status.is_success() {
            let body: Value = response
                .json()
                .await
                .map_err(|e| ApiError::Http(e.without_url()))?;
            return Ok(ApiOutcome::Found(body));
        }

        let body = response.text().await.unwrap_or_default();
        let outcome = classify_failure(status, &body);
        if matches!(&outcome, Ok(o) if o.is_quota_exceeded()) {
            tracing::warn!(endpoint, status = status.as_u16(), "YouTube API quota exceeded");
        }
        outcome
    }
}

#[async_trait]
impl VideoApi for YouTubeDataClient {
    async fn channel_statistics(
        &self,
        channel: &ChannelId,
    ) -> Result<ApiOutcome<ChannelStatistics>, ApiError> {
        let params = [("part", "statistics".to_string()), ("id", channel.to_string())];
        let outcome = self.get("channels", &params).await?;
        Ok(outcome.and_then(|body| parse_channel_statistics(&body)))
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<ApiOutcome<Vec<PlaylistItem>>, ApiError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let remaining = limit.saturating_sub(items.len() as u32);
            if remaining == 0 {
                break;
            }

            let mut params = vec![
                ("part", "snippet".to_string()),
                ("playlistId", playlist_id.to_string()),
                ("maxResults", remaining.min(MAX_PAGE_SIZE).to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let body = match self.get("playlistItems", &params).await? {
                ApiOutcome::Found(body) => body,
                // A later page vanishing still leaves us with what we have
                ApiOutcome::NotFound if !items.is_empty() => break,
                other => return Ok(other.map(|_| Vec::new())),
            };

            let (page_items, next) = parse_playlist_page(&body);
            items.extend(page_items);

            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        items.truncate(limit as usize);
        Ok(ApiOutcome::Found(items))
    }

    async fn video_details(&self, video_id: &str) -> Result<ApiOutcome<VideoDetails>, ApiError> {
        let params = [
            ("part", VIDEO_PARTS.to_string()),
            ("id", video_id.to_string()),
            ("maxResults", "1".to_string()),
        ];

        let outcome = self.get("videos", &params).await?;
        Ok(outcome.and_then(|body| {
            match body["items"].as_array().and_then(|items| items.first()) {
                Some(item) => match parse_video_details(item) {
                    Ok(details) => ApiOutcome::Found(details),
                    Err(field) => ApiOutcome::PartiallyMissing(field.to_string()),
                },
                None => ApiOutcome::NotFound,
            }
        }))
    }
}

// Decides what a non-2xx response means
//
// Body shape on errors:
//   { "error": { "code": 403, "message": "...", "errors": [{ "reason": "quotaExceeded" }] } }
pub fn classify_failure<T>(status: StatusCode, body: &str) -> Result<ApiOutcome<T>, ApiError> {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let error = &parsed["error"];
    let message = error["message"].as_str().unwrap_or("").to_string();

    match status {
        StatusCode::TOO_MANY_REQUESTS => Ok(ApiOutcome::QuotaExceeded),
        StatusCode::NOT_FOUND => Ok(ApiOutcome::NotFound),
        StatusCode::FORBIDDEN => {
            let quota_reason = error["errors"]
                .as_array()
                .map(|errors| {
                    errors.iter().any(|e| {
                        e["reason"]
                            .as_str()
                            .map(|reason| QUOTA_REASONS.contains(&reason))
                            .unwrap_or(false)
                    })
                })
                .unwrap_or(false);

            if quota_reason || message.starts_with(QUOTA_MESSAGE_PREFIX) {
                Ok(ApiOutcome::QuotaExceeded)
            } else {
                Err(ApiError::Status { status, message })
            }
        }
        _ => {
            let message = if message.is_empty() {
                body.chars().take(200).collect()
            } else {
                message
            };
            Err(ApiError::Status { status, message })
        }
    }
}

// channels?part=statistics answer -> subscriber count
//
// An unknown id comes back as 200 with no items (totalResults = 0).
pub fn parse_channel_statistics(body: &Value) -> ApiOutcome<ChannelStatistics> {
    let total = body["pageInfo"]["totalResults"].as_u64().unwrap_or(0);
    let item = match body["items"].as_array().and_then(|items| items.first()) {
        Some(item) if total > 0 || body["pageInfo"].is_null() => item,
        _ => return ApiOutcome::NotFound,
    };

    let statistics = &item["statistics"];
    let hidden = statistics["hiddenSubscriberCount"].as_bool().unwrap_or(false);
    let subscriber_count = if hidden {
        None
    } else {
        count(&statistics["subscriberCount"])
    };

    ApiOutcome::Found(ChannelStatistics { subscriber_count })
}

// playlistItems page -> (video ids, next page token)
pub fn parse_playlist_page(body: &Value) -> (Vec<PlaylistItem>, Option<String>) {
    let items = body["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    item["snippet"]["resourceId"]["videoId"]
                        .as_str()
                        .or_else(|| item["contentDetails"]["videoId"].as_str())
                        .map(|id| PlaylistItem {
                            video_id: id.to_string(),
                        })
                })
                .collect()
        })
        .unwrap_or_default();

    let next = body["nextPageToken"]
        .as_str()
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string());

    (items, next)
}

// One element of videos.items -> VideoDetails
// Err carries the path of the first missing required field.
pub fn parse_video_details(item: &Value) -> Result<VideoDetails, &'static str> {
    let snippet = &item["snippet"];
    let statistics = &item["statistics"];
    let content = &item["contentDetails"];

    let id = item["id"].as_str().ok_or("id")?.to_string();
    let title = snippet["title"].as_str().ok_or("snippet.title")?.to_string();
    let view_count = count(&statistics["viewCount"]).ok_or("statistics.viewCount")?;
    let duration = content["duration"]
        .as_str()
        .ok_or("contentDetails.duration")?
        .to_string();
    let published_at = snippet["publishedAt"]
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or("snippet.publishedAt")?;

    let thumbnails = &snippet["thumbnails"];
    let thumbnail_url = ["high", "medium", "default"]
        .iter()
        .find_map(|size| thumbnails[*size]["url"].as_str())
        .map(|url| url.to_string());

    Ok(VideoDetails {
        id,
        title,
        view_count,
        like_count: count(&statistics["likeCount"]),
        dislike_count: count(&statistics["dislikeCount"]),
        comment_count: count(&statistics["commentCount"]),
        duration,
        description: snippet["description"].as_str().unwrap_or("").to_string(),
        dimension: text(&content["dimension"]),
        definition: text(&content["definition"]),
        caption: match &content["caption"] {
            Value::Bool(flag) => Some(*flag),
            Value::String(flag) => flag.parse().ok(),
            _ => None,
        },
        published_at,
        tags: strings(&snippet["tags"]),
        category_id: text(&snippet["categoryId"]),
        thumbnail_url,
        localizations: item["localizations"]
            .as_object()
            .map(|langs| langs.keys().cloned().collect())
            .unwrap_or_default(),
        topic_categories: strings(&item["topicDetails"]["topicCategories"]),
        default_language: text(&snippet["defaultLanguage"]),
    })
}

// Counts come back as strings ("12345"), stubs sometimes use numbers
fn count(value: &Value) -> Option<u64> {
    match value {
        Value::String(raw) => raw.parse().ok(),
        other => other.as_u64(),
    }
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(|s| s.to_string())
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
