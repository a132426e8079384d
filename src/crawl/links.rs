// src/crawl/links.rs
// =============================================================================
// Where linked channels come from.
//
// The crawl only needs one question answered: "which links does this
// channel's 'channels' page show?". Two answers are provided:
// - HttpLinksProvider: downloads the page and pulls links out of the HTML
// - SnapshotLinksProvider: looks them up in a JSON file saved earlier
//
// A crawl target is either a bare channel id (the seeds) or a raw link found
// on an earlier page. Both are turned into the URL of the channels page.
// =============================================================================

use super::CrawlError;
use crate::channel::ChannelId;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

// Links on the "channels" tab live in elements with this id
const CHANNEL_INFO_SELECTOR: &str = "#channel-info[href]";
// Any other anchor pointing at a channel page
const CHANNEL_ANCHOR_SELECTOR: &str = "a[href*='/channel/']";
// Channel paths inside the page's embedded JSON ("url":"/channel/UC...")
const EMBEDDED_CHANNEL_PATH: &str = "\"/channel/UC";

const YOUTUBE_ORIGIN: &str = "https://www.youtube.com";

/// Lists the raw links on a channel's "related channels" page.
#[async_trait]
pub trait ChannelLinksProvider: Send + Sync {
    async fn links_for(&self, target: &str) -> Result<Vec<String>, CrawlError>;
}

/// Fetches channel pages over HTTP and extracts their links.
///
/// YouTube renders the `#channel-info` anchors in the browser, so the HTML
/// served to a plain HTTP client usually has none. The same links are also
/// present as `/channel/UC...` paths in the `ytInitialData` JSON embedded in
/// the page, and those are picked up as well.
pub struct HttpLinksProvider {
    client: Client,
}

impl HttpLinksProvider {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpLinksProvider { client })
    }
}

#[async_trait]
impl ChannelLinksProvider for HttpLinksProvider {
    async fn links_for(&self, target: &str) -> Result<Vec<String>, CrawlError> {
        let page_url = channels_page_url(target);

        let Some(html) = fetch_page(&self.client, &page_url).await? else {
            tracing::warn!(url = %page_url, "channel page not found, no links");
            return Ok(Vec::new());
        };

        let links = extract_channel_links(&html, &page_url);
        tracing::debug!(url = %page_url, links = links.len(), "fetched channel page");
        Ok(links)
    }
}

// Fetches a page and returns its HTML.
// A 404 means "no such page" and yields None. Any other failure is an error.
async fn fetch_page(client: &Client, url: &str) -> Result<Option<String>, CrawlError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| CrawlError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status,
        });
    }

    let html = response.text().await.map_err(|source| CrawlError::Fetch {
        url: url.to_string(),
        source,
    })?;
    Ok(Some(html))
}

// Builds the URL of the "channels" tab for a crawl target
//
// Examples:
//   "UC123"                                  -> https://www.youtube.com/channel/UC123/channels
//   "https://www.youtube.com/channel/UC123/" -> https://www.youtube.com/channel/UC123/channels
//   "/c/SomeName"                            -> https://www.youtube.com/c/SomeName/channels
pub fn channels_page_url(target: &str) -> String {
    let base = if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else if target.starts_with('/') {
        format!("{}{}", YOUTUBE_ORIGIN, target)
    } else {
        ChannelId::from(target).url()
    };

    format!("{}/channels", base.trim_end_matches('/'))
}

// Extracts the links to other channels from a channels page
//
// Links keep the order they appear in, duplicates removed. Relative hrefs
// are resolved against the page URL.
pub fn extract_channel_links(html: &str, page_url: &str) -> Vec<String> {
    let mut links = Vec::new();

    let document = Html::parse_document(html);

    let base = match Url::parse(page_url) {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(url = %page_url, "invalid page url, cannot resolve links");
            return links;
        }
    };

    for raw_selector in [CHANNEL_INFO_SELECTOR, CHANNEL_ANCHOR_SELECTOR] {
        let Ok(selector) = Selector::parse(raw_selector) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_url(&base, href) {
                    if !links.contains(&absolute) {
                        links.push(absolute);
                    }
                }
            }
        }
    }

    for path in embedded_channel_paths(html) {
        if let Some(absolute) = resolve_url(&base, path) {
            if !links.contains(&absolute) {
                links.push(absolute);
            }
        }
    }

    links
}

// Pulls quoted "/channel/UC..." strings out of the raw page text
fn embedded_channel_paths(html: &str) -> Vec<&str> {
    html.match_indices(EMBEDDED_CHANNEL_PATH)
        .filter_map(|(start, _)| {
            let rest = &html[start + 1..];
            rest.find('"').map(|end| &rest[..end])
        })
        .collect()
}

// Resolves a possibly-relative href to an absolute URL
// javascript:, mailto: and anchors are dropped.
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    if href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("javascript:") {
        return None;
    }

    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.join(href).ok().map(|url| url.to_string()),
    }
}

/// Serves links from a saved `{ "target": ["link", ...] }` JSON object.
/// Targets missing from the snapshot have no links.
#[derive(Debug, Default, Clone)]
pub struct SnapshotLinksProvider {
    pages: HashMap<String, Vec<String>>,
}

impl SnapshotLinksProvider {
    pub fn from_json(json: &str) -> Result<Self, CrawlError> {
        let pages: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(SnapshotLinksProvider { pages })
    }

    pub fn from_path(path: &Path) -> Result<Self, CrawlError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[async_trait]
impl ChannelLinksProvider for SnapshotLinksProvider {
    async fn links_for(&self, target: &str) -> Result<Vec<String>, CrawlError> {
        Ok(self.pages.get(target).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CannedServer;

    #[test]
    fn test_channels_page_url_from_id() {
        assert_eq!(
            channels_page_url("UC123"),
            "https://www.youtube.com/channel/UC123/channels"
        );
    }

    #[test]
    fn test_channels_page_url_from_link() {
        assert_eq!(
            channels_page_url("https://www.youtube.com/channel/UC123/"),
            "https://www.youtube.com/channel/UC123/channels"
        );
        assert_eq!(
            channels_page_url("/c/SomeName"),
            "https://www.youtube.com/c/SomeName/channels"
        );
    }

    #[test]
    fn test_extract_channel_info_links() {
        let html = r#"
            <a id="channel-info" href="/channel/UCaaa">A</a>
            <a id="channel-info" href="https://www.youtube.com/c/named">B</a>
            <a href="/watch?v=xyz">Video</a>
        "#;
        let links = extract_channel_links(html, "https://www.youtube.com/channel/UCroot/channels");
        assert_eq!(
            links,
            vec![
                "https://www.youtube.com/channel/UCaaa".to_string(),
                "https://www.youtube.com/c/named".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_dedups_and_skips_javascript() {
        let html = r#"
            <a href="/channel/UCbbb">B</a>
            <a href="/channel/UCbbb">B again</a>
            <a href="javascript:void('/channel/UCccc')">nope</a>
        "#;
        let links = extract_channel_links(html, "https://www.youtube.com/channel/UCroot/channels");
        assert_eq!(links, vec!["https://www.youtube.com/channel/UCbbb".to_string()]);
    }

    #[test]
    fn test_extract_embedded_initial_data_links() {
        let html = r#"
            <html><body>
            <script>var ytInitialData = {"items":[
                {"navigationEndpoint":{"url":"/channel/UCddd"}},
                {"navigationEndpoint":{"url":"/channel/UCeee/videos"}},
                {"navigationEndpoint":{"url":"/watch?v=abc"}}
            ]};</script>
            </body></html>
        "#;
        let links = extract_channel_links(html, "https://www.youtube.com/channel/UCroot/channels");
        assert_eq!(
            links,
            vec![
                "https://www.youtube.com/channel/UCddd".to_string(),
                "https://www.youtube.com/channel/UCeee/videos".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_http_provider_reads_page() {
        let server = CannedServer::start(|_| {
            (200, r#"<a id="channel-info" href="/channel/UCaaa">A</a>"#.to_string())
        })
        .await;
        let provider = HttpLinksProvider::new(Duration::from_secs(5)).unwrap();
        let target = format!("{}/channel/UCroot", server.base_url);

        let links = provider.links_for(&target).await.unwrap();

        assert_eq!(links, vec![format!("{}/channel/UCaaa", server.base_url)]);
        assert_eq!(server.targets(), vec!["/channel/UCroot/channels".to_string()]);
    }

    #[tokio::test]
    async fn test_http_provider_missing_page_has_no_links() {
        let server = CannedServer::start(|_| (404, "not here".to_string())).await;
        let provider = HttpLinksProvider::new(Duration::from_secs(5)).unwrap();

        let links = provider
            .links_for(&format!("{}/channel/UCgone", server.base_url))
            .await
            .unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_http_provider_server_error_fails() {
        let server = CannedServer::start(|_| (500, "boom".to_string())).await;
        let provider = HttpLinksProvider::new(Duration::from_secs(5)).unwrap();

        let result = provider
            .links_for(&format!("{}/channel/UCroot", server.base_url))
            .await;
        match result {
            Err(CrawlError::Status { status, .. }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_snapshot_provider() {
        let provider = SnapshotLinksProvider::from_json(
            r#"{ "UCroot": ["https://www.youtube.com/channel/UCaaa"] }"#,
        )
        .unwrap();

        let links = provider.links_for("UCroot").await.unwrap();
        assert_eq!(links, vec!["https://www.youtube.com/channel/UCaaa".to_string()]);
        assert!(provider.links_for("UCunknown").await.unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_rejects_bad_json() {
        assert!(SnapshotLinksProvider::from_json("[1, 2]").is_err());
    }
}
