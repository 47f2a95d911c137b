//! Douyin adapter - fetches content records from the Douyin web detail API.
//!
//! The web API answers `200` with an empty body when it rejects the session
//! (missing or stale `ttwid`/`sessionid` cookies), so an empty body is read
//! as an authentication failure rather than a parse error.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{COOKIE, REFERER};
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

/// Production Douyin web API base URL.
pub const DOUYIN_API_BASE: &str = "https://www.douyin.com";

const DETAIL_PATH: &str = "/aweme/v1/web/aweme/detail/";
const DOUYIN_REFERER: &str = "https://www.douyin.com/";
/// Web client app id expected by the detail endpoint.
const WEB_AID: &str = "6383";

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    #[serde(default)]
    status_code: i64,
    status_msg: Option<String>,
    aweme_detail: Option<Value>,
    filter_detail: Option<FilterDetail>,
}

#[derive(Debug, Deserialize)]
struct FilterDetail {
    filter_reason: Option<String>,
    detail_msg: Option<String>,
}

/// Resolves Douyin content ids through the web detail API.
pub struct DouyinAdapter {
    client: Client,
    detail_url: Url,
}

impl DouyinAdapter {
    /// Creates an adapter against the production API.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if HTTP client construction fails.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, BuildError> {
        Self::with_base_url(DOUYIN_API_BASE, timeouts)
    }

    /// Creates an adapter with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if `base_url` is not an absolute URL or HTTP
    /// client construction fails.
    #[tracing::instrument(skip(timeouts))]
    pub fn with_base_url(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, BuildError> {
        let detail_url = Url::parse(&format!("{}{DETAIL_PATH}", base_url.trim_end_matches('/')))
            .map_err(|e| BuildError::invalid_base_url(Platform::Douyin, base_url, &e.to_string()))?;
        let client = build_http_client(
            "douyin-web",
            user_agent::browser_user_agent(),
            timeouts,
            RedirectMode::None,
        )
        .map_err(|e| BuildError::http_client("douyin-web", e))?;

        Ok(Self { client, detail_url })
    }

    fn request_url(&self, token: &str) -> Url {
        let mut url = self.detail_url.clone();
        url.query_pairs_mut()
            .append_pair("aweme_id", token)
            .append_pair("aid", WEB_AID)
            .append_pair("device_platform", "webapp");
        url
    }
}

impl std::fmt::Debug for DouyinAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DouyinAdapter")
            .field("detail_url", &self.detail_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PlatformAdapter for DouyinAdapter {
    fn platform(&self) -> Platform {
        Platform::Douyin
    }

    fn name(&self) -> &'static str {
        "douyin-web"
    }

    #[tracing::instrument(
        skip(self, id, credential),
        fields(adapter = "douyin-web", token = %id.token(), authenticated = credential.is_some())
    )]
    async fn fetch(
        &self,
        id: &ResolvedIdentifier,
        credential: Option<&Credential>,
    ) -> Result<RawPlatformData, GatewayError> {
        let platform = Platform::Douyin;
        let token = id.token();

        let mut request = self
            .client
            .get(self.request_url(token))
            .header(REFERER, DOUYIN_REFERER);
        if let Some(cookie) = cookie_header(credential)? {
            request = request.header(COOKIE, cookie);
        }

        debug!("Calling Douyin detail API");
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(platform, &e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Douyin detail API error");
            return Err(classify_status(platform, token, status, response.headers()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(platform, &e))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(GatewayError::auth_required(
                platform,
                "detail API returned an empty body; the session cookie is missing or expired",
            ));
        }

        let envelope: DetailEnvelope = serde_json::from_slice(&body).map_err(|e| {
            GatewayError::upstream(platform, &format!("unexpected detail API response format: {e}"))
        })?;

        if envelope.status_code != 0 {
            let message = envelope.status_msg.unwrap_or_default();
            return Err(GatewayError::upstream(
                platform,
                &format!("detail API status_code {}: {message}", envelope.status_code),
            ));
        }

        let Some(detail) = envelope.aweme_detail else {
            let reason = envelope
                .filter_detail
                .and_then(|filter| filter.detail_msg.or(filter.filter_reason))
                .unwrap_or_else(|| "content removed, private, or never existed".to_string());
            return Err(GatewayError::not_found(platform, token, &reason));
        };

        info!(bytes = body.len(), "Fetched Douyin content record");
        Ok(RawPlatformData::new(platform, &AWEME_LAYOUT, detail))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_carries_web_params() {
        let adapter =
            DouyinAdapter::with_base_url("http://127.0.0.1:9/", HttpTimeouts::default()).unwrap();
        let url = adapter.request_url("7372484719365098803");
        assert_eq!(url.path(), "/aweme/v1/web/aweme/detail/");
        let query = url.query().unwrap();
        assert!(query.contains("aweme_id=7372484719365098803"));
        assert!(query.contains("aid=6383"));
        assert!(query.contains("device_platform=webapp"));
    }

    #[test]
    fn test_invalid_base_url_is_build_error() {
        let err = DouyinAdapter::with_base_url("not a url", HttpTimeouts::default()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_adapter_identity() {
        let adapter = DouyinAdapter::new(HttpTimeouts::default()).unwrap();
        assert_eq!(adapter.platform(), Platform::Douyin);
        assert_eq!(adapter.name(), "douyin-web");
    }
}
