//! Error taxonomy for gateway operations.
//!
//! Every failure a caller can observe from [`crate::HybridGateway`] is one of
//! these variants. Kinds are never collapsed or re-wrapped on the way out, so
//! the transport layer can map each one to its own status code. Messages
//! follow the What/Why/Fix pattern used across the project.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::platform::Platform;

/// Errors that can occur while resolving a share input or updating credentials.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// No platform rule accepts the input
    #[error("unrecognized input '{input}': {reason}\n  Suggestion: {suggestion}")]
    UnrecognizedInput {
        /// The input (or extracted URL) that no rule accepted
        input: String,
        /// Why classification failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// More than one platform rule matched with equal precedence (rule defect)
    #[error(
        "ambiguous input '{input}': rules for {platforms} matched with equal precedence\n  Suggestion: This is a classifier rule bug; please report it with the input"
    )]
    AmbiguousInput {
        /// The input that matched several rules
        input: String,
        /// Comma-separated labels of the competing platforms
        platforms: String,
    },

    /// The service is unknown, or has no registered adapter
    #[error("unsupported service '{service}'\n  Suggestion: {suggestion}")]
    UnsupportedService {
        /// Service label as supplied or classified
        service: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// Content was removed, made private, or never existed
    #[error("content '{token}' not found on {platform}: {reason}")]
    NotFound {
        /// Platform queried
        platform: Platform,
        /// Content token queried
        token: String,
        /// Upstream-provided reason, if any
        reason: String,
    },

    /// Platform is throttling requests
    #[error("rate limited by {platform}{}\n  Suggestion: Wait before retrying", RetryAfterDisplay(.retry_after))]
    RateLimited {
        /// Platform that throttled the request
        platform: Platform,
        /// Server-provided retry hint, when known
        retry_after: Option<Duration>,
    },

    /// Credential missing, invalid, or expired
    #[error("authentication required for {platform}: {message}\n  Suggestion: {suggestion}")]
    AuthRequired {
        /// Platform requiring authentication
        platform: Platform,
        /// Human-readable auth requirement message
        message: String,
        /// How to provide authentication
        suggestion: String,
    },

    /// Transport or parse failure unrelated to content state
    #[error("upstream error from {platform}: {reason}")]
    UpstreamError {
        /// Platform whose upstream failed
        platform: Platform,
        /// Why the upstream call failed
        reason: String,
    },

    /// Short-link redirect resolution failed after its single retry
    #[error(
        "could not resolve short link '{url}' after {attempts} attempt(s): {reason}\n  Suggestion: Check network connectivity or paste the full share URL"
    )]
    ResolutionNetworkError {
        /// Short link being resolved
        url: String,
        /// Attempts made (including the retry)
        attempts: u32,
        /// Last failure reason
        reason: String,
    },

    /// Adapter returned data missing fields its layout promised (adapter bug)
    #[error("malformed upstream data from {platform}: {reason}")]
    MalformedUpstreamData {
        /// Platform whose data was malformed
        platform: Platform,
        /// Which field was missing or invalid
        reason: String,
    },

    /// Adapter exists as a placeholder only
    #[error("resolution for {platform} is not implemented yet")]
    NotImplemented {
        /// Platform with a placeholder adapter
        platform: Platform,
    },
}

/// Fieldless discriminant of [`GatewayError`] for status-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnrecognizedInput,
    AmbiguousInput,
    UnsupportedService,
    NotFound,
    RateLimited,
    AuthRequired,
    UpstreamError,
    ResolutionNetworkError,
    MalformedUpstreamData,
    NotImplemented,
}

impl ErrorKind {
    /// Returns the stable snake_case label for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnrecognizedInput => "unrecognized_input",
            Self::AmbiguousInput => "ambiguous_input",
            Self::UnsupportedService => "unsupported_service",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::AuthRequired => "auth_required",
            Self::UpstreamError => "upstream_error",
            Self::ResolutionNetworkError => "resolution_network_error",
            Self::MalformedUpstreamData => "malformed_upstream_data",
            Self::NotImplemented => "not_implemented",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct RetryAfterDisplay<'a>(&'a Option<Duration>);

impl fmt::Display for RetryAfterDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(delay) => write!(f, " (retry after {}s)", delay.as_secs()),
            None => Ok(()),
        }
    }
}

impl GatewayError {
    /// Creates an `UnrecognizedInput` error.
    #[must_use]
    pub fn unrecognized(input: &str, reason: &str) -> Self {
        Self::UnrecognizedInput {
            input: input.to_string(),
            reason: reason.to_string(),
            suggestion: "Paste a Douyin, TikTok, or Bilibili share link or share text".to_string(),
        }
    }

    /// Creates an `AmbiguousInput` error listing the competing platforms.
    #[must_use]
    pub fn ambiguous(input: &str, platforms: &[Platform]) -> Self {
        let labels: Vec<&str> = platforms.iter().map(|p| p.as_str()).collect();
        Self::AmbiguousInput {
            input: input.to_string(),
            platforms: labels.join(", "),
        }
    }

    /// Creates an `UnsupportedService` error.
    #[must_use]
    pub fn unsupported_service(service: &str) -> Self {
        Self::UnsupportedService {
            service: service.to_string(),
            suggestion: "Supported services: douyin, tiktok, bilibili".to_string(),
        }
    }

    /// Creates an `UnsupportedService` error for a known platform with no adapter.
    #[must_use]
    pub fn no_adapter(platform: Platform) -> Self {
        Self::UnsupportedService {
            service: platform.as_str().to_string(),
            suggestion: format!("No adapter is registered for {platform}; it is recognised but cannot be resolved yet"),
        }
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(platform: Platform, token: &str, reason: &str) -> Self {
        Self::NotFound {
            platform,
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `RateLimited` error.
    #[must_use]
    pub fn rate_limited(platform: Platform, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            platform,
            retry_after,
        }
    }

    /// Creates an `AuthRequired` error.
    #[must_use]
    pub fn auth_required(platform: Platform, message: &str) -> Self {
        Self::AuthRequired {
            platform,
            message: message.to_string(),
            suggestion: format!("Update the {platform} cookie and retry"),
        }
    }

    /// Creates an `UpstreamError`.
    #[must_use]
    pub fn upstream(platform: Platform, reason: &str) -> Self {
        Self::UpstreamError {
            platform,
            reason: reason.to_string(),
        }
    }

    /// Creates a `ResolutionNetworkError`.
    #[must_use]
    pub fn resolution_network(url: &str, attempts: u32, reason: &str) -> Self {
        Self::ResolutionNetworkError {
            url: url.to_string(),
            attempts,
            reason: reason.to_string(),
        }
    }

    /// Creates a `MalformedUpstreamData` error.
    #[must_use]
    pub fn malformed(platform: Platform, reason: &str) -> Self {
        Self::MalformedUpstreamData {
            platform,
            reason: reason.to_string(),
        }
    }

    /// Creates a `NotImplemented` error.
    #[must_use]
    pub fn not_implemented(platform: Platform) -> Self {
        Self::NotImplemented { platform }
    }

    /// Returns the fieldless kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnrecognizedInput { .. } => ErrorKind::UnrecognizedInput,
            Self::AmbiguousInput { .. } => ErrorKind::AmbiguousInput,
            Self::UnsupportedService { .. } => ErrorKind::UnsupportedService,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::AuthRequired { .. } => ErrorKind::AuthRequired,
            Self::UpstreamError { .. } => ErrorKind::UpstreamError,
            Self::ResolutionNetworkError { .. } => ErrorKind::ResolutionNetworkError,
            Self::MalformedUpstreamData { .. } => ErrorKind::MalformedUpstreamData,
            Self::NotImplemented { .. } => ErrorKind::NotImplemented,
        }
    }

    /// Returns the retry hint carried by `RateLimited`, if any.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns true if a caller-side retry may succeed without changing input or credentials.
    ///
    /// The gateway never acts on this itself.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited | ErrorKind::UpstreamError | ErrorKind::ResolutionNetworkError
        )
    }
}

/// Errors raised while assembling a gateway from settings.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An HTTP client could not be constructed
    #[error("failed to build HTTP client for {component}: {source}")]
    HttpClient {
        /// Component the client was for (adapter name or probe)
        component: String,
        /// Underlying client builder error
        #[source]
        source: reqwest::Error,
    },

    /// A configured API base URL is not a valid absolute URL
    #[error("invalid API base URL '{value}' for {platform}: {reason}")]
    InvalidBaseUrl {
        /// Platform whose base URL is invalid
        platform: Platform,
        /// Configured value
        value: String,
        /// Parser message
        reason: String,
    },
}

impl BuildError {
    /// Creates an `HttpClient` build error.
    #[must_use]
    pub fn http_client(component: &str, source: reqwest::Error) -> Self {
        Self::HttpClient {
            component: component.to_string(),
            source,
        }
    }

    /// Creates an `InvalidBaseUrl` build error.
    #[must_use]
    pub fn invalid_base_url(platform: Platform, value: &str, reason: &str) -> Self {
        Self::InvalidBaseUrl {
            platform,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
