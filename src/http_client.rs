//! Shared HTTP client construction policy.
//!
//! Every adapter and the redirect probe builds its client here.

use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::debug;

/// Maximum redirect hops followed by clients that follow redirects at all.
pub(crate) const MAX_REDIRECTS: usize = 10;

/// Timeout pair applied to every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout.
    pub connect: Duration,
    /// Whole-request timeout (connect + send + body).
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

/// Redirect handling for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RedirectMode {
    /// Follow up to [`MAX_REDIRECTS`] hops (short-link probing).
    Follow,
    /// Never follow; API responses are inspected as returned.
    None,
}

/// Builds an HTTP client using shared project policy.
///
/// `component` is used only for logging.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when client construction fails.
pub(crate) fn build_http_client(
    component: &str,
    user_agent: impl Into<String>,
    timeouts: HttpTimeouts,
    redirect: RedirectMode,
) -> Result<Client, reqwest::Error> {
    let policy = match redirect {
        RedirectMode::Follow => Policy::limited(MAX_REDIRECTS),
        RedirectMode::None => Policy::none(),
    };
    debug!(
        component,
        connect_ms = timeouts.connect.as_millis(),
        request_ms = timeouts.request.as_millis(),
        ?redirect,
        "Building HTTP client"
    );

    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .user_agent(user_agent.into())
        .redirect(policy)
        .gzip(true)
        .build()
}
