//! Platform classification of share inputs.
//!
//! Turns a raw share input (URL, share text wrapping a URL, or a bare
//! token) into a [`ResolvedIdentifier`]: the platform plus the content token
//! its adapter needs.
//!
//! # Architecture
//!
//! - [`MatchRule`] - Data-only matching rule contributed by one platform
//! - [`Classifier`] - Walks registered rules; resolves short links via a [`RedirectProbe`]
//! - [`Candidate`] - Result of the synchronous detection step
//!
//! Classification is split in two so the gateway can reject platforms with
//! no adapter before any network I/O happens:
//!
//! 1. [`Classifier::detect`] - synchronous pattern matching, picks the platform
//! 2. [`Classifier::finish`] - probes short links (one retry), extracts the token
//!
//! # Precedence
//!
//! The most specific domain match wins (`v.douyin.com` beats `douyin.com`).
//! Equal specificity between rules of different platforms is a rule defect
//! and surfaces as [`GatewayError::AmbiguousInput`].

mod redirect;
mod rules;
mod url;

pub use self::redirect::{
    HttpRedirectProbe, PROBE_ATTEMPTS, ProbeFailure, RedirectProbe, probe_with_retry,
};
pub use self::rules::{
    MatchRule, bilibili_rule, canonical_host, default_rules, douyin_rule, tiktok_rule,
};
pub use self::url::{MAX_URL_LENGTH, UrlCandidate, extract_first_url};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ::url::Url;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::GatewayError;
use crate::platform::Platform;

/// Platform-specific content key produced by classification.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedIdentifier {
    platform: Platform,
    token: String,
}

impl ResolvedIdentifier {
    /// Creates an identifier.
    #[must_use]
    pub fn new(platform: Platform, token: impl Into<String>) -> Self {
        Self {
            platform,
            token: token.into(),
        }
    }

    /// Returns the platform.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Returns the content token (video id, BV id, ...).
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for ResolvedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.token)
    }
}

/// Outcome of [`Classifier::detect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Token already known; no network needed.
    Resolved(ResolvedIdentifier),
    /// Short link that must be redirect-resolved first.
    ShortLink {
        /// Platform owning the short link
        platform: Platform,
        /// The short link itself
        url: Url,
    },
}

impl Candidate {
    /// Returns the platform this candidate belongs to.
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            Self::Resolved(id) => id.platform(),
            Self::ShortLink { platform, .. } => *platform,
        }
    }
}

/// Classifies share inputs against registered platform rules.
pub struct Classifier {
    rules: Vec<MatchRule>,
    probe: Arc<dyn RedirectProbe>,
    probe_timeout: Duration,
}

impl Classifier {
    /// Creates a classifier with the default rule set.
    #[must_use]
    pub fn new(probe: Arc<dyn RedirectProbe>, probe_timeout: Duration) -> Self {
        Self::with_rules(default_rules(), probe, probe_timeout)
    }

    /// Creates a classifier with an explicit rule set, evaluated in the given order.
    #[must_use]
    pub fn with_rules(
        rules: Vec<MatchRule>,
        probe: Arc<dyn RedirectProbe>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            rules,
            probe,
            probe_timeout,
        }
    }

    /// Returns the platforms that have a matching rule, in registration order.
    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = Vec::new();
        for rule in &self.rules {
            if !platforms.contains(&rule.platform()) {
                platforms.push(rule.platform());
            }
        }
        platforms
    }

    /// Classifies `input` end to end, probing short links if needed.
    ///
    /// # Errors
    ///
    /// See [`Classifier::detect`] and [`Classifier::finish`].
    #[tracing::instrument(skip(self, input), fields(input_len = input.len()))]
    pub async fn classify(&self, input: &str) -> Result<ResolvedIdentifier, GatewayError> {
        let candidate = self.detect(input)?;
        self.finish(candidate).await
    }

    /// Synchronously picks the platform for `input`.
    ///
    /// # Errors
    ///
    /// Returns `UnrecognizedInput` when no rule accepts the input (including
    /// empty input and URLs on a known domain without a token), and
    /// `AmbiguousInput` when rules for different platforms tie.
    pub fn detect(&self, input: &str) -> Result<Candidate, GatewayError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::unrecognized(input, "input is empty"));
        }

        match extract_first_url(trimmed) {
            UrlCandidate::Valid(url) => self.detect_url(url),
            UrlCandidate::Invalid { raw, reason } => Err(GatewayError::unrecognized(&raw, &reason)),
            UrlCandidate::Absent => self.detect_raw_token(trimmed),
        }
    }

    /// Completes a candidate into an identifier, probing short links.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionNetworkError` when the probe fails twice, and
    /// `UnrecognizedInput` when the redirect target leaves the platform or
    /// carries no token.
    pub async fn finish(&self, candidate: Candidate) -> Result<ResolvedIdentifier, GatewayError> {
        let (platform, short_url) = match candidate {
            Candidate::Resolved(id) => return Ok(id),
            Candidate::ShortLink { platform, url } => (platform, url),
        };

        let target = probe_with_retry(self.probe.as_ref(), &short_url, self.probe_timeout).await?;
        let Some(host) = target.host_str() else {
            return Err(GatewayError::unrecognized(
                target.as_str(),
                "short link redirected to a URL without host",
            ));
        };

        let token = self
            .rules
            .iter()
            .filter(|rule| rule.platform() == platform && rule.host_specificity(host).is_some())
            .find_map(|rule| rule.extract_token(&target));

        match token {
            Some(token) => {
                debug!(platform = %platform, token = %token, target = %target, "Short link classified");
                Ok(ResolvedIdentifier::new(platform, token))
            }
            None => Err(GatewayError::unrecognized(
                target.as_str(),
                &format!("short link did not lead to a {platform} content URL"),
            )),
        }
    }

    fn detect_url(&self, url: Url) -> Result<Candidate, GatewayError> {
        let host = url.host_str().unwrap_or_default().to_string();
        let rule = self.select_rule(&host, url.as_str())?;

        if let Some(token) = rule.extract_token(&url) {
            debug!(platform = %rule.platform(), token = %token, "Matched content URL");
            return Ok(Candidate::Resolved(ResolvedIdentifier::new(rule.platform(), token)));
        }

        if rule.is_short_link(&url) {
            debug!(platform = %rule.platform(), url = %url, "Matched short link");
            return Ok(Candidate::ShortLink {
                platform: rule.platform(),
                url,
            });
        }

        Err(GatewayError::unrecognized(
            url.as_str(),
            &format!("{} URL does not point at a single video", rule.platform()),
        ))
    }

    fn select_rule(&self, host: &str, input: &str) -> Result<&MatchRule, GatewayError> {
        let scored: Vec<(&MatchRule, usize)> = self
            .rules
            .iter()
            .filter_map(|rule| rule.host_specificity(host).map(|score| (rule, score)))
            .collect();

        let Some(best) = scored.iter().map(|(_, score)| *score).max() else {
            return Err(GatewayError::unrecognized(
                input,
                &format!("host '{host}' does not belong to a supported platform"),
            ));
        };

        let top: Vec<&MatchRule> = scored
            .into_iter()
            .filter(|(_, score)| *score == best)
            .map(|(rule, _)| rule)
            .collect();

        single_platform(&top, input)?;
        // first in registration order
        Ok(top[0])
    }

    fn detect_raw_token(&self, input: &str) -> Result<Candidate, GatewayError> {
        let matches: Vec<(Platform, String)> = self
            .rules
            .iter()
            .filter_map(|rule| rule.match_raw_token(input).map(|token| (rule.platform(), token)))
            .collect();

        let Some((platform, token)) = matches.first().cloned() else {
            return Err(GatewayError::unrecognized(input, "no URL or share token found"));
        };

        let platforms: Vec<Platform> = matches.iter().map(|(p, _)| *p).collect();
        if platforms.iter().any(|p| *p != platform) {
            return Err(ambiguity(input, platforms));
        }

        debug!(platform = %platform, token = %token, "Matched raw share token");
        Ok(Candidate::Resolved(ResolvedIdentifier::new(platform, token)))
    }
}

fn single_platform(rules: &[&MatchRule], input: &str) -> Result<(), GatewayError> {
    let platforms: Vec<Platform> = rules.iter().map(|rule| rule.platform()).collect();
    match platforms.first() {
        Some(first) if platforms.iter().any(|p| p != first) => Err(ambiguity(input, platforms)),
        _ => Ok(()),
    }
}

/// Builds `AmbiguousInput` for rules that tie across platforms.
fn ambiguity(input: &str, mut platforms: Vec<Platform>) -> GatewayError {
    platforms.sort();
    platforms.dedup();
    error!(
        input = %input,
        platforms = ?platforms,
        "Classifier rules overlap with equal precedence; this is a rule defect"
    );
    GatewayError::ambiguous(input, &platforms)
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("platforms", &self.platforms())
            .field("probe_timeout", &self.probe_timeout)
            .finish_non_exhaustive()
    }
}
