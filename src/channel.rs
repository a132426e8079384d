// src/channel.rs
// =============================================================================
// Channel identifiers.
//
// YouTube channel ids start with "UC". Every channel also has an implicit
// "uploads" playlist holding all of its public videos, and its id is the
// channel id with the second character swapped for 'U' ("UC..." -> "UU...").
// That lets us list a channel's uploads without an extra API call.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

// Prefix shared by every raw channel id
pub const CHANNEL_ID_PREFIX: &str = "UC";

// Base URL of a channel page on youtube.com
pub const CHANNEL_URL_BASE: &str = "https://www.youtube.com/channel/";

/// A channel identifier, kept as the opaque string YouTube hands out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        ChannelId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id carries the usual "UC" prefix.
    pub fn is_raw(&self) -> bool {
        self.0.starts_with(CHANNEL_ID_PREFIX)
    }

    /// Id of the auto-generated playlist with all of this channel's uploads.
    ///
    /// Pure string transform: first character, then 'U', then everything
    /// after the second character. A one-character id just gains the 'U'.
    /// "UCYO_jab_esuFRV4b17AJtAw" -> "UUYO_jab_esuFRV4b17AJtAw"
    pub fn uploads_playlist_id(&self) -> String {
        let mut chars = self.0.chars();
        let Some(first) = chars.next() else {
            // Empty id, nothing to substitute
            return String::new();
        };
        chars.next();

        let mut playlist = String::with_capacity(self.0.len() + 1);
        playlist.push(first);
        playlist.push('U');
        playlist.push_str(chars.as_str());
        playlist
    }

    /// URL of the channel's page on youtube.com
    pub fn url(&self) -> String {
        format!("{}{}", CHANNEL_URL_BASE, self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        ChannelId::new(id)
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        ChannelId::new(id)
    }
}

impl AsRef<str> for ChannelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Reads a channel list: one id per line, blank lines and '#' comments ignored
pub fn parse_channel_list(text: &str) -> Vec<ChannelId> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ChannelId::from)
        .collect()
}
