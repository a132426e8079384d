// src/crawl/mod.rs
// =============================================================================
// This module discovers YouTube channels by following "linked channels".
//
// Features:
// - Breadth-first crawl starting from seed channel ids
// - Fixed number of rounds (depth), every target fetched at most once
// - Pluggable link source (live HTTP pages or a saved snapshot)
// - Optional checkpoints of the result list every N fetched pages
//
// Submodules:
// - queue: the crawl loop itself
// - links: where linked channels come from
// - matcher: pulling a channel id out of a raw link
// - checkpoint: where partial results go while the crawl runs
// =============================================================================

mod checkpoint;
mod links;
mod matcher;
mod queue;

pub use checkpoint::{CheckpointSink, FileCheckpointSink, NoCheckpoints};
pub use links::{ChannelLinksProvider, HttpLinksProvider, SnapshotLinksProvider};
pub use matcher::ChannelLinkMatcher;
pub use queue::{crawl_channels, CrawlOptions, CrawlOutcome};

use thiserror::Error;

// Anything that stops a crawl. There is no partial result: a failing link
// source aborts the whole run.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("Could not read link snapshot: {0}")]
    Snapshot(#[from] std::io::Error),
    #[error("Invalid link snapshot: {0}")]
    SnapshotFormat(#[from] serde_json::Error),
}
