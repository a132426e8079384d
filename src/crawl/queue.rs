// src/crawl/queue.rs
// =============================================================================
// Breadth-first discovery of channels.
//
// How it works:
// 1. The seeds form the first frontier and are marked visited
// 2. Each round fetches the links of every target in the frontier, once
// 3. Unvisited links are marked visited and queued for the next round
// 4. Links that point at a channel add that channel id to the results
// 5. After `depth` rounds whatever is left in the frontier is dropped
//
// Two sets keep the crawl honest:
// - visited: every raw target ever queued (seeds included), never shrinks
// - known ids: seeds plus results, so the same channel reached through a
//   differently spelled link is not fetched twice
// =============================================================================

use super::{ChannelLinkMatcher, ChannelLinksProvider, CheckpointSink, CrawlError};
use crate::channel::ChannelId;
use std::collections::HashSet;
use std::time::Duration;

/// Knobs for a single crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Number of rounds. 0 returns the seeds untouched.
    pub depth: usize,
    /// Write a checkpoint every N fetched pages (0 = never)
    pub checkpoint_every: usize,
    pub matcher: ChannelLinkMatcher,
    /// Pause between page fetches
    pub delay: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        CrawlOptions {
            depth: 1,
            checkpoint_every: 0,
            matcher: ChannelLinkMatcher::default(),
            delay: Duration::ZERO,
        }
    }
}

/// What a crawl found.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Seeds first, then discoveries in the order they were found
    pub channels: Vec<ChannelId>,
    /// Only the newly discovered channels
    pub discovered: Vec<ChannelId>,
    /// Every raw target that was queued, seeds included
    pub visited: HashSet<String>,
    pub pages_fetched: usize,
    pub checkpoints_written: usize,
}

// Crawls outward from the seed channels
//
// Parameters:
//   provider: answers "which links are on this channel's page?"
//   sink: receives checkpoint snapshots
//   seeds: channel ids to start from
//   options: depth, checkpoint cadence, link matcher, politeness delay
//
// Returns: the seeds plus every channel discovered, or the first provider error
pub async fn crawl_channels<P, S>(
    provider: &P,
    sink: &mut S,
    seeds: &[ChannelId],
    options: &CrawlOptions,
) -> Result<CrawlOutcome, CrawlError>
where
    P: ChannelLinksProvider + ?Sized,
    S: CheckpointSink + ?Sized,
{
    let mut outcome = CrawlOutcome::default();
    let mut known_ids: HashSet<String> = HashSet::new();
    let mut frontier: Vec<String> = Vec::new();

    for seed in seeds {
        if known_ids.insert(seed.as_str().to_string()) {
            outcome.channels.push(seed.clone());
            outcome.visited.insert(seed.as_str().to_string());
            frontier.push(seed.as_str().to_string());
        }
    }

    // Pages fetched since the last checkpoint
    let mut since_checkpoint = 0;

    for round in 0..options.depth {
        tracing::info!(round, targets = frontier.len(), "crawl round started");
        let mut next_frontier = Vec::new();

        for target in frontier.drain(..) {
            // Already there for seeds and queued links, a no-op in practice
            outcome.visited.insert(target.clone());

            if outcome.pages_fetched > 0 && !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }

            let links = provider.links_for(&target).await?;
            outcome.pages_fetched += 1;

            for link in links {
                if outcome.visited.contains(&link) {
                    continue;
                }

                let channel_id = options.matcher.extract(&link);
                if let Some(id) = &channel_id {
                    if known_ids.contains(id) {
                        continue;
                    }
                }

                outcome.visited.insert(link.clone());

                if let Some(id) = channel_id {
                    known_ids.insert(id.clone());
                    let id = ChannelId::from(id);
                    tracing::debug!(channel = %id, from = %target, "discovered channel");
                    outcome.channels.push(id.clone());
                    outcome.discovered.push(id);
                }

                next_frontier.push(link);
            }

            since_checkpoint += 1;
            if options.checkpoint_every > 0 && since_checkpoint == options.checkpoint_every {
                since_checkpoint = 0;
                let snapshot: Vec<String> =
                    outcome.channels.iter().map(|c| c.to_string()).collect();
                sink.write(&snapshot);
                outcome.checkpoints_written += 1;
            }
        }

        frontier = next_frontier;
    }

    tracing::info!(
        channels = outcome.channels.len(),
        discovered = outcome.discovered.len(),
        pages = outcome.pages_fetched,
        unexplored = frontier.len(),
        "crawl finished"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Serves fixed links and remembers every target it was asked about
    struct StubLinks {
        pages: HashMap<String, Vec<String>>,
        calls: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl StubLinks {
        fn new(pages: &[(&str, &[&str])]) -> Self {
            StubLinks {
                pages: pages
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChannelLinksProvider for StubLinks {
        async fn links_for(&self, target: &str) -> Result<Vec<String>, CrawlError> {
            self.calls.lock().unwrap().push(target.to_string());
            if self.fail_on.as_deref() == Some(target) {
                return Err(CrawlError::Snapshot(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "provider down",
                )));
            }
            Ok(self.pages.get(target).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        snapshots: Vec<Vec<String>>,
    }

    impl CheckpointSink for RecordingSink {
        fn write(&mut self, snapshot: &[String]) {
            self.snapshots.push(snapshot.to_vec());
        }
    }

    fn ids(raw: &[&str]) -> Vec<ChannelId> {
        raw.iter().map(|s| ChannelId::from(*s)).collect()
    }

    fn options(depth: usize) -> CrawlOptions {
        CrawlOptions {
            depth,
            ..CrawlOptions::default()
        }
    }

    #[tokio::test]
    async fn test_depth_zero_returns_seeds() {
        let provider = StubLinks::new(&[("UCabc", &["https://x/channel/UC123"])]);
        let mut sink = RecordingSink::default();

        let outcome = crawl_channels(&provider, &mut sink, &ids(&["UCabc", "UCdef"]), &options(0))
            .await
            .unwrap();

        assert_eq!(outcome.channels, ids(&["UCabc", "UCdef"]));
        assert!(outcome.discovered.is_empty());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_round_scenario() {
        let provider = StubLinks::new(&[(
            "UCabc",
            &["https://x/channel/UC123", "not-a-channel-link"],
        )]);
        let mut sink = RecordingSink::default();

        let outcome = crawl_channels(&provider, &mut sink, &ids(&["UCabc"]), &options(1))
            .await
            .unwrap();

        assert_eq!(outcome.channels, ids(&["UCabc", "UC123"]));
        assert_eq!(outcome.discovered, ids(&["UC123"]));
        assert!(outcome.visited.contains("UCabc"));
        assert!(outcome.visited.contains("https://x/channel/UC123"));
        assert!(outcome.visited.contains("not-a-channel-link"));
        // Links found in the last round are never expanded
        assert_eq!(provider.calls(), vec!["UCabc".to_string()]);
    }

    #[tokio::test]
    async fn test_second_round_expands_all_links() {
        let provider = StubLinks::new(&[
            ("UCabc", &["https://x/channel/UC1", "https://x/c/named"]),
            ("https://x/channel/UC1", &["https://x/channel/UC2"]),
            ("https://x/c/named", &["https://x/channel/UC3"]),
        ]);
        let mut sink = RecordingSink::default();

        let outcome = crawl_channels(&provider, &mut sink, &ids(&["UCabc"]), &options(2))
            .await
            .unwrap();

        assert_eq!(outcome.channels, ids(&["UCabc", "UC1", "UC2", "UC3"]));
        // Non-channel links are still crawled, they just never become results
        assert_eq!(
            provider.calls(),
            vec![
                "UCabc".to_string(),
                "https://x/channel/UC1".to_string(),
                "https://x/c/named".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_target_is_fetched_twice() {
        // A cycle: both channels link to each other and to themselves
        let provider = StubLinks::new(&[
            ("UCa", &["https://x/channel/UCb", "https://x/channel/UCa"]),
            ("https://x/channel/UCb", &["https://x/channel/UCa", "https://x/channel/UCb"]),
        ]);
        let mut sink = RecordingSink::default();

        let outcome = crawl_channels(&provider, &mut sink, &ids(&["UCa"]), &options(5))
            .await
            .unwrap();

        let calls = provider.calls();
        let distinct: HashSet<_> = calls.iter().collect();
        assert_eq!(calls.len(), distinct.len());
        assert_eq!(calls.len(), outcome.pages_fetched);
        assert_eq!(outcome.channels, ids(&["UCa", "UCb"]));
    }

    #[tokio::test]
    async fn test_second_spelling_of_known_channel_is_skipped() {
        let provider = StubLinks::new(&[
            ("UCa", &["https://x/channel/UC1", "/channel/UC1/videos", "/channel/UCa/about"]),
            ("https://x/channel/UC1", &[]),
        ]);
        let mut sink = RecordingSink::default();

        let outcome = crawl_channels(&provider, &mut sink, &ids(&["UCa"]), &options(2))
            .await
            .unwrap();

        assert_eq!(outcome.channels, ids(&["UCa", "UC1"]));
        // Only the first spelling is visited and expanded
        assert!(!outcome.visited.contains("/channel/UC1/videos"));
        assert!(!outcome.visited.contains("/channel/UCa/about"));
        assert_eq!(
            provider.calls(),
            vec!["UCa".to_string(), "https://x/channel/UC1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_seeds_never_rediscovered() {
        let provider = StubLinks::new(&[
            ("UCa", &["https://x/channel/UCb"]),
            ("UCb", &["https://x/channel/UCa", "https://x/channel/UCc"]),
        ]);
        let mut sink = RecordingSink::default();

        let outcome = crawl_channels(&provider, &mut sink, &ids(&["UCa", "UCb"]), &options(3))
            .await
            .unwrap();

        assert_eq!(outcome.discovered, ids(&["UCc"]));
        assert_eq!(outcome.channels, ids(&["UCa", "UCb", "UCc"]));
    }

    #[tokio::test]
    async fn test_duplicate_seeds_collapse() {
        let provider = StubLinks::new(&[]);
        let mut sink = RecordingSink::default();

        let outcome = crawl_channels(&provider, &mut sink, &ids(&["UCa", "UCa"]), &options(1))
            .await
            .unwrap();

        assert_eq!(outcome.channels, ids(&["UCa"]));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_checkpoint_cadence_spans_rounds() {
        let provider = StubLinks::new(&[
            ("UCa", &["https://x/channel/UC1", "https://x/channel/UC2"]),
            ("https://x/channel/UC1", &["https://x/channel/UC3"]),
            ("https://x/channel/UC2", &["https://x/channel/UC4"]),
        ]);
        let mut sink = RecordingSink::default();
        let opts = CrawlOptions {
            depth: 3,
            checkpoint_every: 2,
            ..CrawlOptions::default()
        };

        let outcome = crawl_channels(&provider, &mut sink, &ids(&["UCa"]), &opts)
            .await
            .unwrap();

        // 5 pages: UCa, UC1, UC2, UC3, UC4 -> checkpoints after the 2nd and 4th
        assert_eq!(outcome.pages_fetched, 5);
        assert_eq!(outcome.checkpoints_written, 2);
        assert_eq!(sink.snapshots.len(), 2);
        assert_eq!(sink.snapshots[0], vec!["UCa", "UC1", "UC2", "UC3"]);
        assert_eq!(sink.snapshots[1].len(), 5);
    }

    #[tokio::test]
    async fn test_checkpoints_off_by_default() {
        let provider = StubLinks::new(&[("UCa", &["https://x/channel/UC1"])]);
        let mut sink = RecordingSink::default();

        crawl_channels(&provider, &mut sink, &ids(&["UCa"]), &options(2))
            .await
            .unwrap();

        assert!(sink.snapshots.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_crawl() {
        let mut provider = StubLinks::new(&[("UCa", &["https://x/channel/UC1"])]);
        provider.fail_on = Some("https://x/channel/UC1".to_string());
        let mut sink = RecordingSink::default();

        let result = crawl_channels(&provider, &mut sink, &ids(&["UCa"]), &options(2)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fixed_offset_matcher() {
        let provider = StubLinks::new(&[(
            "UCa",
            &["https://www.youtube.com/channel/UCwww", "https://x/channel/UCshort"],
        )]);
        let mut sink = RecordingSink::default();
        let opts = CrawlOptions {
            depth: 1,
            matcher: ChannelLinkMatcher::FixedOffset(32),
            ..CrawlOptions::default()
        };

        let outcome = crawl_channels(&provider, &mut sink, &ids(&["UCa"]), &opts)
            .await
            .unwrap();

        // The short link matches the marker but its slice is out of range
        assert_eq!(outcome.channels, ids(&["UCa", "UCwww"]));
        assert!(outcome.visited.contains("https://x/channel/UCshort"));
    }
}
