//! Per-platform matching rules.
//!
//! A rule is pure data: the domains a platform owns, which hosts or paths are
//! short links needing a redirect probe, and where the content token sits in
//! a canonical URL. The classifier never branches on a platform; it only
//! walks registered rules.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::platform::Platform;

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static DOUYIN_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^/(?:share/)?(?:video|note|slides)/(\d+)"));

static TIKTOK_USER_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^/@[^/]+/(?:video|photo)/(\d+)"));
static TIKTOK_SHORT_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^/(?:v|embed/v2|embed)/(\d+)"));

static BILIBILI_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^/video/(BV[0-9A-Za-z]{10}|[aA][vV]\d+)"));
static BILIBILI_RAW_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^BV1[0-9A-Za-z]{9}$"));

/// Matching rule contributed by one platform.
#[derive(Debug, Clone)]
pub struct MatchRule {
    platform: Platform,
    domains: &'static [&'static str],
    short_hosts: &'static [&'static str],
    short_path_prefixes: &'static [&'static str],
    path_patterns: Vec<&'static Regex>,
    query_keys: &'static [&'static str],
    raw_token: Option<&'static Regex>,
}

impl MatchRule {
    /// Creates a rule for `platform` owning `domains` (and their subdomains).
    #[must_use]
    pub fn new(platform: Platform, domains: &'static [&'static str]) -> Self {
        Self {
            platform,
            domains,
            short_hosts: &[],
            short_path_prefixes: &[],
            path_patterns: Vec::new(),
            query_keys: &[],
            raw_token: None,
        }
    }

    /// Hosts on which every URL is a short link.
    #[must_use]
    pub fn short_hosts(mut self, hosts: &'static [&'static str]) -> Self {
        self.short_hosts = hosts;
        self
    }

    /// Path prefixes on the platform's own domains that denote short links.
    #[must_use]
    pub fn short_path_prefixes(mut self, prefixes: &'static [&'static str]) -> Self {
        self.short_path_prefixes = prefixes;
        self
    }

    /// Adds a path regex whose first capture group is the content token.
    #[must_use]
    pub fn path_pattern(mut self, pattern: &'static Regex) -> Self {
        self.path_patterns.push(pattern);
        self
    }

    /// Query keys whose all-digit value is the content token.
    #[must_use]
    pub fn query_keys(mut self, keys: &'static [&'static str]) -> Self {
        self.query_keys = keys;
        self
    }

    /// Pattern a bare (URL-less) input must match in full to be a token.
    #[must_use]
    pub fn raw_token(mut self, pattern: &'static Regex) -> Self {
        self.raw_token = Some(pattern);
        self
    }

    /// Returns the platform this rule classifies to.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Returns how specifically `host` matches this rule, or `None`.
    ///
    /// Specificity is the label count of the longest matching domain suffix,
    /// so `v.douyin.com` (3) outranks `douyin.com` (2).
    #[must_use]
    pub fn host_specificity(&self, host: &str) -> Option<usize> {
        let host = canonical_host(host);
        self.domains
            .iter()
            .chain(self.short_hosts.iter())
            .filter(|domain| host_in_domain(&host, domain))
            .map(|domain| domain.split('.').count())
            .max()
    }

    /// Returns true if `url` is a short link that must be redirect-resolved.
    #[must_use]
    pub fn is_short_link(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = canonical_host(host);
        if self.short_hosts.iter().any(|short| host == *short) {
            return true;
        }
        self.domains.iter().any(|domain| host_in_domain(&host, domain))
            && self
                .short_path_prefixes
                .iter()
                .any(|prefix| url.path().starts_with(prefix))
    }

    /// Extracts the content token from a canonical URL.
    #[must_use]
    pub fn extract_token(&self, url: &Url) -> Option<String> {
        let path = url.path();
        for pattern in &self.path_patterns {
            if let Some(token) = pattern
                .captures(path)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
            {
                return Some(token);
            }
        }

        url.query_pairs().find_map(|(key, value)| {
            (self.query_keys.contains(&&*key)
                && !value.is_empty()
                && value.chars().all(|c| c.is_ascii_digit()))
            .then(|| value.into_owned())
        })
    }

    /// Finds a share token among the whitespace-separated words of `input`.
    ///
    /// Surrounding punctuation is stripped from each word before matching;
    /// the first matching word wins.
    #[must_use]
    pub fn match_raw_token(&self, input: &str) -> Option<String> {
        let pattern = self.raw_token?;
        input
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
            .find(|word| pattern.is_match(word))
            .map(str::to_string)
    }
}

/// Normalizes a host string: trim, strip leading "www.", trailing '.', and lowercase.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    host.trim()
        .trim_start_matches("www.")
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

fn host_in_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Douyin: web, share-page, and `v.douyin.com` short links.
#[must_use]
pub fn douyin_rule() -> MatchRule {
    MatchRule::new(Platform::Douyin, &["douyin.com", "iesdouyin.com"])
        .short_hosts(&["v.douyin.com"])
        .path_pattern(&DOUYIN_PATH_RE)
        .query_keys(&["modal_id", "vid"])
}

/// `TikTok`: `@user/video` pages, embed/`v` forms, and `vm`/`vt`/`t/` short links.
#[must_use]
pub fn tiktok_rule() -> MatchRule {
    MatchRule::new(Platform::TikTok, &["tiktok.com"])
        .short_hosts(&["vm.tiktok.com", "vt.tiktok.com"])
        .short_path_prefixes(&["/t/"])
        .path_pattern(&TIKTOK_USER_PATH_RE)
        .path_pattern(&TIKTOK_SHORT_PATH_RE)
}

/// Bilibili: `/video/BV…`/`av…` pages, `b23.tv` short links, bare BV ids.
#[must_use]
pub fn bilibili_rule() -> MatchRule {
    MatchRule::new(Platform::Bilibili, &["bilibili.com"])
        .short_hosts(&["b23.tv"])
        .path_pattern(&BILIBILI_PATH_RE)
        .raw_token(&BILIBILI_RAW_RE)
}

/// Default rules in registration order.
#[must_use]
pub fn default_rules() -> Vec<MatchRule> {
    vec![douyin_rule(), tiktok_rule(), bilibili_rule()]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn test_canonical_host_trim_www_and_trailing_dot_lowercase() {
        assert_eq!(canonical_host("  www.Douyin.COM.  "), "douyin.com");
        assert_eq!(canonical_host("v.douyin.com"), "v.douyin.com");
    }

    #[test]
    fn test_host_in_domain_requires_label_boundary() {
        assert!(host_in_domain("douyin.com", "douyin.com"));
        assert!(host_in_domain("m.douyin.com", "douyin.com"));
        assert!(!host_in_domain("notdouyin.com", "douyin.com"));
    }

    #[test]
    fn test_short_host_outranks_parent_domain() {
        let rule = douyin_rule();
        assert_eq!(rule.host_specificity("v.douyin.com"), Some(3));
        assert_eq!(rule.host_specificity("www.douyin.com"), Some(2));
        assert_eq!(rule.host_specificity("tiktok.com"), None);
    }

    #[test]
    fn test_douyin_tokens_from_path_and_query() {
        let rule = douyin_rule();
        assert_eq!(
            rule.extract_token(&url("https://www.douyin.com/video/7372484719365098803")),
            Some("7372484719365098803".to_string())
        );
        assert_eq!(
            rule.extract_token(&url(
                "https://www.iesdouyin.com/share/video/7372484719365098803/?region=CN"
            )),
            Some("7372484719365098803".to_string())
        );
        assert_eq!(
            rule.extract_token(&url(
                "https://www.douyin.com/discover?modal_id=7372484719365098803"
            )),
            Some("7372484719365098803".to_string())
        );
        assert_eq!(rule.extract_token(&url("https://www.douyin.com/user/abc")), None);
    }

    #[test]
    fn test_tiktok_short_link_forms() {
        let rule = tiktok_rule();
        assert!(rule.is_short_link(&url("https://vm.tiktok.com/ZMabc123/")));
        assert!(rule.is_short_link(&url("https://www.tiktok.com/t/ZT8abc/")));
        assert!(!rule.is_short_link(&url("https://www.tiktok.com/@user/video/1")));
    }

    #[test]
    fn test_tiktok_tokens() {
        let rule = tiktok_rule();
        assert_eq!(
            rule.extract_token(&url(
                "https://www.tiktok.com/@scout2015/video/6718335390845095173?lang=en"
            )),
            Some("6718335390845095173".to_string())
        );
        assert_eq!(
            rule.extract_token(&url("https://www.tiktok.com/embed/v2/6718335390845095173")),
            Some("6718335390845095173".to_string())
        );
    }

    #[test]
    fn test_bilibili_tokens_and_raw_bv() {
        let rule = bilibili_rule();
        assert_eq!(
            rule.extract_token(&url("https://www.bilibili.com/video/BV1GJ411x7h7/")),
            Some("BV1GJ411x7h7".to_string())
        );
        assert_eq!(
            rule.extract_token(&url("https://www.bilibili.com/video/av170001")),
            Some("av170001".to_string())
        );
        assert_eq!(
            rule.match_raw_token("  BV1GJ411x7h7 "),
            Some("BV1GJ411x7h7".to_string())
        );
        assert_eq!(
            rule.match_raw_token("BV1GJ411x7h7 extra"),
            Some("BV1GJ411x7h7".to_string())
        );
        assert_eq!(rule.match_raw_token("BV1GJ411x7h7extra"), None);
        assert_eq!(rule.match_raw_token("no token here"), None);
    }

    #[test]
    fn test_bilibili_raw_bv_inside_share_text() {
        let rule = bilibili_rule();
        assert_eq!(
            rule.match_raw_token("看这个 BV1GJ411x7h7"),
            Some("BV1GJ411x7h7".to_string())
        );
        assert_eq!(
            rule.match_raw_token("【必看】(BV1GJ411x7h7)，太好笑了"),
            Some("BV1GJ411x7h7".to_string())
        );
        assert!(rule.is_short_link(&url("https://b23.tv/abc123")));
    }

    #[test]
    fn test_rules_without_raw_pattern_reject_bare_tokens() {
        assert_eq!(douyin_rule().match_raw_token("7372484719365098803"), None);
        assert_eq!(tiktok_rule().match_raw_token("7372484719365098803"), None);
    }
}
