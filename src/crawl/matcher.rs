// src/crawl/matcher.rs
// =============================================================================
// Turns a raw link found on a channel page into a channel id.
//
// The test is a plain substring check: any link containing "channel/UC" counts as
// a channel link. Two ways of cutting the id out of it are supported:
// - Marker: the id starts at "UC" and runs to the next '/', '?', '#' or space
// - FixedOffset(n): everything from byte n onwards. With n = 32 this cuts
//   the id out of "https://www.youtube.com/channel/<id>" links, and it
//   produces garbage for links shaped any other way.
// =============================================================================

// Substring that marks a link as a channel link
const CHANNEL_MARKER: &str = "channel/UC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelLinkMatcher {
    /// Cut the id out right after "channel/"
    #[default]
    Marker,
    /// Slice the link from a fixed byte offset
    FixedOffset(usize),
}

impl ChannelLinkMatcher {
    /// Extracts the channel id from a link, or None for non-channel links.
    pub fn extract(&self, link: &str) -> Option<String> {
        let marker_at = link.find(CHANNEL_MARKER)?;

        let id = match *self {
            ChannelLinkMatcher::Marker => {
                let rest = &link[marker_at + "channel/".len()..];
                let end = rest
                    .find(|c: char| c == '/' || c == '?' || c == '#' || c.is_whitespace())
                    .unwrap_or(rest.len());
                &rest[..end]
            }
            // get() returns None when the offset is past the end or not on a
            // char boundary
            ChannelLinkMatcher::FixedOffset(offset) => link.get(offset..)?,
        };

        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}
