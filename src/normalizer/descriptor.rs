//! Canonical video descriptor returned to callers.
//!
//! Every optional field is skipped on serialization when `None`, so a
//! minimal descriptor carries no statistics or author keys at all rather
//! than zeroes.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::platform::Platform;

/// Kind of content behind a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// A playable video
    Video,
    /// A gallery of still images (no play URL)
    ImagePost,
}

/// One playable URL with its quality metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayUrl {
    pub url: String,
    /// Upstream quality label, or `default` for the default play address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

/// Uploader details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Engagement counters, passed through as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plays: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collects: Option<u64>,
}

/// Background music.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MusicInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_url: Option<String>,
}

/// Normalized, platform-agnostic description of one piece of content.
///
/// Constructed only by [`crate::normalizer::project`] and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoDescriptor {
    pub id: String,
    pub platform: Platform,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Representative play URL; always the first entry of `play_urls`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_url: Option<String>,
    /// Play URLs ordered by quality, best first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_urls: Option<Vec<PlayUrl>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    /// Creation time in unix seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicInfo>,
    pub is_minimal: bool,
    /// Selected upstream fields passed through verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Map<String, Value>>,
}

impl VideoDescriptor {
    /// Returns true if `self` is a field-subset of `full`: every field
    /// populated here is populated with an equal value in `full`.
    #[must_use]
    pub fn is_subset_of(&self, full: &VideoDescriptor) -> bool {
        fn covered<T: PartialEq>(part: Option<&T>, whole: Option<&T>) -> bool {
            part.is_none() || part == whole
        }

        self.id == full.id
            && self.platform == full.platform
            && self.title == full.title
            && covered(self.cover_url.as_ref(), full.cover_url.as_ref())
            && covered(self.play_url.as_ref(), full.play_url.as_ref())
            && covered(self.play_urls.as_ref(), full.play_urls.as_ref())
            && covered(self.author.as_ref(), full.author.as_ref())
            && covered(self.statistics.as_ref(), full.statistics.as_ref())
            && covered(self.content_type.as_ref(), full.content_type.as_ref())
            && covered(self.image_urls.as_ref(), full.image_urls.as_ref())
            && covered(self.hashtags.as_ref(), full.hashtags.as_ref())
            && covered(self.created_at.as_ref(), full.created_at.as_ref())
            && covered(self.music.as_ref(), full.music.as_ref())
            && covered(self.raw.as_ref(), full.raw.as_ref())
    }
}
