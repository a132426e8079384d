// src/config.rs
// =============================================================================
// Runtime configuration and logging setup.
//
// Settings come from command-line flags first, then environment variables
// (a .env file in the working directory is loaded before parsing), then
// defaults.
// =============================================================================

use crate::cli::{GlobalArgs, HarvestArgs};
use crate::harvest::DEFAULT_API_BASE;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Value shipped in the sample key file
pub const API_KEY_PLACEHOLDER: &str = "Insert your API key here";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
    pub delay: Duration,
}

impl Config {
    pub fn from_args(global: &GlobalArgs, harvest: Option<&HarvestArgs>) -> Result<Self> {
        let api_key = match harvest {
            Some(args) => resolve_api_key(args)?,
            None => None,
        };

        Ok(Config {
            api_key,
            api_base: global
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(global.timeout_secs),
            delay: Duration::from_millis(global.delay_ms),
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!("No YouTube API key: pass --api-key, --api-key-file or set YOUTUBE_API_KEY")
        })
    }
}

// --api-key / YOUTUBE_API_KEY wins over --api-key-file
fn resolve_api_key(args: &HarvestArgs) -> Result<Option<String>> {
    if let Some(key) = args.api_key.as_deref().and_then(clean_key) {
        return Ok(Some(key));
    }

    match &args.api_key_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read API key file {}", path.display()))?;
            Ok(clean_key(&raw))
        }
        None => Ok(None),
    }
}

// Blank keys and the placeholder count as no key
fn clean_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    if key.is_empty() || key == API_KEY_PLACEHOLDER {
        None
    } else {
        Some(key.to_string())
    }
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

// Logs go to stderr so stdout stays clean for --json output.
// Level comes from RUST_LOG, "info" by default.
pub fn init_logger() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
