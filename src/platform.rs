//! Closed set of content platforms the gateway knows about.
//!
//! Adding a platform means adding a variant here, a matching rule in
//! [`crate::classifier`], and (eventually) an adapter in [`crate::adapter`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// A short-video content platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Douyin (mainland China short video).
    Douyin,
    /// `TikTok` (international short video).
    TikTok,
    /// Bilibili (recognised by the classifier, no adapter yet).
    Bilibili,
}

impl Platform {
    /// Every known platform, in declaration order.
    pub const ALL: [Platform; 3] = [Platform::Douyin, Platform::TikTok, Platform::Bilibili];

    /// Returns the stable lowercase label (`"douyin"`, `"tiktok"`, `"bilibili"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Douyin => "douyin",
            Self::TikTok => "tiktok",
            Self::Bilibili => "bilibili",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = GatewayError;

    /// Parses a service name as sent by administrative callers.
    ///
    /// Matching is case-insensitive and tolerates a client suffix such as
    /// `douyin_web` or `tiktok_app`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let base = normalized
            .split_once('_')
            .map_or(normalized.as_str(), |(head, _)| head);

        match base {
            "douyin" => Ok(Self::Douyin),
            "tiktok" => Ok(Self::TikTok),
            "bilibili" => Ok(Self::Bilibili),
            _ => Err(GatewayError::unsupported_service(value.trim())),
        }
    }
}
