//! `TikTok` adapter - fetches content records from the app feed API.
//!
//! The feed endpoint returns a list seeded by the requested id; the entry
//! whose `aweme_id` matches is the record. When the content is gone the
//! feed silently returns other videos, so a mismatch means not found.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::COOKIE;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::auth::Credential;
use crate::classifier::ResolvedIdentifier;
use crate::error::{BuildError, GatewayError};
use crate::http_client::{HttpTimeouts, RedirectMode, build_http_client};
use crate::normalizer::AWEME_LAYOUT;
use crate::platform::Platform;
use crate::user_agent;

use super::utils::{classify_status, cookie_header, transport_error};
use super::{PlatformAdapter, RawPlatformData};

/// Production `TikTok` app API base URL.
pub const TIKTOK_API_BASE: &str = "https://api22-normal-c-alisg.tiktokv.com";

const FEED_PATH: &str = "/aweme/v1/feed/";

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    #[serde(default)]
    status_code: i64,
    status_msg: Option<String>,
    #[serde(default)]
    aweme_list: Option<Vec<Value>>,
}

/// Resolves `TikTok` content ids through the app feed API.
pub struct TikTokAdapter {
    client: Client,
    feed_url: Url,
}

impl TikTokAdapter {
    /// Creates an adapter against the production API.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if HTTP client construction fails.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, BuildError> {
        Self::with_base_url(TIKTOK_API_BASE, timeouts)
    }

    /// Creates an adapter with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if `base_url` is not an absolute URL or HTTP
    /// client construction fails.
    #[tracing::instrument(skip(timeouts))]
    pub fn with_base_url(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, BuildError> {
        let feed_url = Url::parse(&format!("{}{FEED_PATH}", base_url.trim_end_matches('/')))
            .map_err(|e| BuildError::invalid_base_url(Platform::TikTok, base_url, &e.to_string()))?;
        let client = build_http_client(
            "tiktok-app",
            user_agent::app_user_agent(),
            timeouts,
            RedirectMode::None,
        )
        .map_err(|e| BuildError::http_client("tiktok-app", e))?;

        Ok(Self { client, feed_url })
    }

    fn request_url(&self, token: &str) -> Url {
        let mut url = self.feed_url.clone();
        url.query_pairs_mut().append_pair("aweme_id", token);
        url
    }
}

impl std::fmt::Debug for TikTokAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TikTokAdapter")
            .field("feed_url", &self.feed_url.as_str())
            .finish_non_exhaustive()
    }
}

fn entry_id(entry: &Value) -> Option<String> {
    match entry.get("aweme_id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[async_trait]
impl PlatformAdapter for TikTokAdapter {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    fn name(&self) -> &'static str {
        "tiktok-app"
    }

    #[tracing::instrument(
        skip(self, id, credential),
        fields(adapter = "tiktok-app", token = %id.token(), authenticated = credential.is_some())
    )]
    async fn fetch(
        &self,
        id: &ResolvedIdentifier,
        credential: Option<&Credential>,
    ) -> Result<RawPlatformData, GatewayError> {
        let platform = Platform::TikTok;
        let token = id.token();

        let mut request = self.client.get(self.request_url(token));
        if let Some(cookie) = cookie_header(credential)? {
            request = request.header(COOKIE, cookie);
        }

        debug!("Calling TikTok feed API");
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(platform, &e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "TikTok feed API error");
            return Err(classify_status(platform, token, status, response.headers()));
        }

        let envelope: FeedEnvelope = response.json().await.map_err(|e| {
            GatewayError::upstream(platform, &format!("unexpected feed API response format: {e}"))
        })?;

        if envelope.status_code != 0 {
            let message = envelope.status_msg.unwrap_or_default();
            return Err(GatewayError::upstream(
                platform,
                &format!("feed API status_code {}: {message}", envelope.status_code),
            ));
        }

        let entries = envelope.aweme_list.unwrap_or_default();
        let returned = entries.len();
        let Some(record) = entries
            .into_iter()
            .find(|entry| entry_id(entry).as_deref() == Some(token))
        else {
            return Err(GatewayError::not_found(
                platform,
                token,
                &format!("feed returned {returned} item(s), none matching the requested id"),
            ));
        };

        info!(returned, "Fetched TikTok content record");
        Ok(RawPlatformData::new(platform, &AWEME_LAYOUT, record))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_url_carries_id() {
        let adapter =
            TikTokAdapter::with_base_url("http://127.0.0.1:9", HttpTimeouts::default()).unwrap();
        let url = adapter.request_url("6718335390845095173");
        assert_eq!(url.path(), "/aweme/v1/feed/");
        assert_eq!(url.query(), Some("aweme_id=6718335390845095173"));
    }

    #[test]
    fn test_entry_id_accepts_string_and_number() {
        assert_eq!(entry_id(&json!({"aweme_id": "12"})).as_deref(), Some("12"));
        assert_eq!(entry_id(&json!({"aweme_id": 12})).as_deref(), Some("12"));
        assert_eq!(entry_id(&json!({"desc": "x"})), None);
    }

    #[test]
    fn test_adapter_identity() {
        let adapter = TikTokAdapter::new(HttpTimeouts::default()).unwrap();
        assert_eq!(adapter.platform(), Platform::TikTok);
        assert_eq!(adapter.name(), "tiktok-app");
    }
}
