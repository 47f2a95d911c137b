//! Shared helpers for adapters: status mapping, Retry-After parsing, cookie headers.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use tracing::{debug, instrument, warn};

use crate::auth::Credential;
use crate::error::GatewayError;
use crate::platform::Platform;

/// Maximum honoured Retry-After delay.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// Maps a non-success upstream HTTP status to an error kind.
///
/// - 404/410: content gone
/// - 429: throttled (Retry-After parsed when present)
/// - 401/403/407: credential missing or rejected
/// - anything else: upstream failure
#[must_use]
pub fn classify_status(
    platform: Platform,
    token: &str,
    status: StatusCode,
    headers: &HeaderMap,
) -> GatewayError {
    match status.as_u16() {
        404 | 410 => GatewayError::not_found(platform, token, &format!("upstream returned HTTP {status}")),
        429 => {
            let retry_after = headers
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_retry_after);
            GatewayError::rate_limited(platform, retry_after)
        }
        401 | 403 | 407 => GatewayError::auth_required(
            platform,
            &format!("upstream rejected the request with HTTP {status}"),
        ),
        _ => GatewayError::upstream(platform, &format!("upstream returned HTTP {status}")),
    }
}

/// Parses a Retry-After header value (integer seconds or HTTP-date).
///
/// Delays are capped at [`MAX_RETRY_AFTER`]; negative values, dates in the
/// past, and unparseable values yield `None`.
#[must_use]
#[instrument]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        let Ok(seconds) = u64::try_from(seconds) else {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        };
        return Some(cap_retry_after(Duration::from_secs(seconds)));
    }

    if let Ok(datetime) = httpdate::parse_http_date(header_value) {
        return match datetime.duration_since(std::time::SystemTime::now()) {
            Ok(delay) => Some(cap_retry_after(delay)),
            Err(_) => {
                debug!(value = header_value, "Retry-After date is in the past");
                Some(Duration::ZERO)
            }
        };
    }

    debug!(value = header_value, "unparseable Retry-After value");
    None
}

fn cap_retry_after(delay: Duration) -> Duration {
    if delay > MAX_RETRY_AFTER {
        warn!(
            delay_secs = delay.as_secs(),
            max_secs = MAX_RETRY_AFTER.as_secs(),
            "Retry-After exceeds maximum, capping at 1 hour"
        );
        MAX_RETRY_AFTER
    } else {
        delay
    }
}

/// Builds a Cookie header from a credential snapshot.
///
/// Returns `Ok(None)` for a missing or empty credential.
///
/// # Errors
///
/// Returns `AuthRequired` when the stored value cannot be sent as a header
/// (control characters), so the request never goes out unauthenticated.
pub(crate) fn cookie_header(
    credential: Option<&Credential>,
) -> Result<Option<HeaderValue>, GatewayError> {
    let Some(credential) = credential.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    match HeaderValue::from_str(credential.value()) {
        Ok(mut value) => {
            value.set_sensitive(true);
            Ok(Some(value))
        }
        Err(_) => {
            warn!(
                platform = %credential.platform(),
                value_len = credential.value().len(),
                "Stored credential is not a valid header value"
            );
            Err(GatewayError::auth_required(
                credential.platform(),
                "stored credential is not a valid Cookie header value",
            ))
        }
    }
}

/// Maps a transport-level reqwest failure to an upstream error.
pub(crate) fn transport_error(platform: Platform, error: &reqwest::Error) -> GatewayError {
    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("cannot connect to upstream: {error}")
    } else {
        format!("request failed: {error}")
    };
    GatewayError::upstream(platform, &reason)
}
