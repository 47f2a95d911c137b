//! URL extraction and validation from share text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};
use url::Url;

/// Maximum URL length to accept (standard browser limit).
pub const MAX_URL_LENGTH: usize = 2000;

/// Regex pattern for finding URLs in share text.
///
/// Share text from mobile apps often glues CJK text directly onto the link
/// ("...L4FJNR3/复制此链接"), so the character class is limited to ASCII URL
/// characters instead of "anything but whitespace".
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:https?)://[A-Za-z0-9\-._~:/?#@!$&*+,;=%()\[\]]+").expect("URL regex is valid") // Static pattern, safe to panic
});

/// Outcome of looking for a URL in share text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlCandidate {
    /// No `http(s)://` candidate present
    Absent,
    /// A candidate was found and validated
    Valid(Url),
    /// A candidate was found but failed validation
    Invalid {
        /// The cleaned candidate
        raw: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Finds the first URL candidate in `input` and validates it.
///
/// Only the first candidate is considered: share text carries exactly one
/// link, and anything after it is promotional filler.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
#[must_use]
pub fn extract_first_url(input: &str) -> UrlCandidate {
    let Some(url_match) = URL_PATTERN.find(input) else {
        return UrlCandidate::Absent;
    };

    let cleaned = clean_url_trailing(url_match.as_str());
    trace!(url = %cleaned, "found URL candidate");

    match validate_url(cleaned) {
        Ok(url) => {
            debug!(url = %url, "URL validated");
            UrlCandidate::Valid(url)
        }
        Err(reason) => {
            debug!(url = %cleaned, reason = %reason, "URL validation failed");
            UrlCandidate::Invalid {
                raw: cleaned.to_string(),
                reason,
            }
        }
    }
}

/// Cleans trailing punctuation that often gets captured with URLs.
fn clean_url_trailing(url: &str) -> &str {
    let mut result = url;

    while let Some(last) = result.chars().last() {
        match last {
            '.' | ',' | ';' | ':' | '!' | '?' => {
                result = &result[..result.len() - 1];
            }
            // Closing parens/brackets are kept only when balanced inside the URL
            ')' | ']' => {
                let open = if last == ')' { '(' } else { '[' };
                let open_count = result.chars().filter(|&c| c == open).count();
                let close_count = result.chars().filter(|&c| c == last).count();
                if close_count > open_count {
                    result = &result[..result.len() - 1];
                } else {
                    break;
                }
            }
            _ => break,
        }
    }

    result
}

/// Validates a URL string.
///
/// # Validation rules:
/// - Must not exceed `MAX_URL_LENGTH` (2000 chars)
/// - Must be parseable by the `url` crate
/// - Must use http or https scheme
/// - Must have a host
fn validate_url(raw: &str) -> Result<Url, String> {
    if raw.len() > MAX_URL_LENGTH {
        return Err(format!(
            "URL too long ({} chars, max {MAX_URL_LENGTH})",
            raw.len()
        ));
    }

    let parsed = Url::parse(raw).map_err(|e| e.to_string())?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(format!("scheme '{scheme}' is not supported")),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err("URL has no host".to_string());
    }

    Ok(parsed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid(input: &str) -> Url {
        match extract_first_url(input) {
            UrlCandidate::Valid(url) => url,
            other => panic!("expected valid URL from {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_bare_short_link() {
        let url = valid("https://v.douyin.com/L4FJNR3/");
        assert_eq!(url.as_str(), "https://v.douyin.com/L4FJNR3/");
    }

    #[test]
    fn test_extract_from_douyin_share_text() {
        let text = "7.43 pdu:/ 复制打开抖音，看看【某某的作品】 https://v.douyin.com/L4FJNR3/ 复制此链接";
        assert_eq!(valid(text).host_str(), Some("v.douyin.com"));
    }

    #[test]
    fn test_extract_stops_at_glued_cjk_text() {
        let url = valid("看看 https://v.douyin.com/L4FJNR3/复制此链接");
        assert_eq!(url.path(), "/L4FJNR3/");
    }

    #[test]
    fn test_extract_strips_sentence_punctuation() {
        let url = valid("watch this: https://www.tiktok.com/@user/video/7123456789012345678.");
        assert_eq!(url.path(), "/@user/video/7123456789012345678");
    }

    #[test]
    fn test_extract_keeps_balanced_parens() {
        let url = valid("(see https://example.com/a_(b))");
        assert_eq!(url.path(), "/a_(b)");
    }

    #[test]
    fn test_extract_takes_first_of_several() {
        let url = valid("https://b23.tv/abc and https://v.douyin.com/xyz/");
        assert_eq!(url.host_str(), Some("b23.tv"));
    }

    #[test]
    fn test_extract_absent_for_plain_text() {
        assert_eq!(extract_first_url("not a url"), UrlCandidate::Absent);
        assert_eq!(extract_first_url(""), UrlCandidate::Absent);
    }

    #[test]
    fn test_extract_rejects_overlong_url() {
        let long = format!("https://v.douyin.com/{}", "a".repeat(2500));
        match extract_first_url(&long) {
            UrlCandidate::Invalid { reason, .. } => assert!(reason.contains("too long")),
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_uppercase_scheme() {
        let url = valid("看看 HTTPS://WWW.TIKTOK.COM/@u/video/6718335390845095173");
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("www.tiktok.com"));
        assert_eq!(url.path(), "/@u/video/6718335390845095173");

        assert_eq!(valid("Http://b23.tv/abc").scheme(), "http");
    }

    #[test]
    fn test_validate_url_rejects_non_web_scheme() {
        let err = validate_url("ftp://files.example.com/a.mp4").unwrap_err();
        assert!(err.contains("ftp"));
    }
}
