//! Short-link redirect probing.
//!
//! Short links (`v.douyin.com/…`, `vm.tiktok.com/…`, `b23.tv/…`) carry no
//! content token; the canonical URL is only known after following the
//! redirect chain. This is the classifier's single network operation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::error::GatewayError;
use crate::http_client::{HttpTimeouts, RedirectMode, build_http_client};
use crate::user_agent;

/// Total attempts for one probe: the first try plus exactly one retry.
pub const PROBE_ATTEMPTS: u32 = 2;

/// A single failed probe attempt.
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct ProbeFailure {
    /// Why the attempt failed
    pub reason: String,
}

impl ProbeFailure {
    /// Creates a probe failure with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Follows a short link to its final URL.
///
/// Implementations perform one attempt per call; retry and timeout policy
/// live in [`probe_with_retry`].
#[async_trait]
pub trait RedirectProbe: Send + Sync {
    /// Returns the URL the redirect chain starting at `url` ends on.
    async fn resolve_redirect(&self, url: &Url) -> Result<Url, ProbeFailure>;
}

/// Redirect probe backed by a redirect-following HTTP client.
pub struct HttpRedirectProbe {
    client: Client,
}

impl HttpRedirectProbe {
    /// Creates a probe with the given client timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if client construction fails.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(
                "redirect-probe",
                user_agent::browser_user_agent(),
                timeouts,
                RedirectMode::Follow,
            )?,
        })
    }
}

impl std::fmt::Debug for HttpRedirectProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRedirectProbe").finish_non_exhaustive()
    }
}

#[async_trait]
impl RedirectProbe for HttpRedirectProbe {
    #[tracing::instrument(skip(self), fields(url = %url))]
    async fn resolve_redirect(&self, url: &Url) -> Result<Url, ProbeFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProbeFailure::new(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ProbeFailure::new(format!("short-link host returned {status}")));
        }

        let final_url = response.url().clone();
        debug!(from = %url, to = %final_url, status = status.as_u16(), "Short link resolved");
        Ok(final_url)
    }
}

/// Runs `probe` with a per-attempt timeout and exactly one retry.
///
/// # Errors
///
/// Returns [`GatewayError::ResolutionNetworkError`] carrying the last failure
/// once both attempts have failed or timed out.
pub async fn probe_with_retry(
    probe: &dyn RedirectProbe,
    url: &Url,
    attempt_timeout: Duration,
) -> Result<Url, GatewayError> {
    let mut last_reason = String::new();

    for attempt in 1..=PROBE_ATTEMPTS {
        let outcome = tokio::time::timeout(attempt_timeout, probe.resolve_redirect(url)).await;
        match outcome {
            Ok(Ok(target)) => return Ok(target),
            Ok(Err(failure)) => last_reason = failure.reason,
            Err(_) => {
                last_reason = format!("timed out after {}ms", attempt_timeout.as_millis());
            }
        }

        if attempt < PROBE_ATTEMPTS {
            warn!(
                url = %url,
                attempt,
                reason = %last_reason,
                "Short-link probe failed, retrying once"
            );
        }
    }

    Err(GatewayError::resolution_network(
        url.as_str(),
        PROBE_ATTEMPTS,
        &last_reason,
    ))
}
