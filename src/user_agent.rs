//! Shared User-Agent strings for platform HTTP clients.
//!
//! Short-video platforms serve empty or captcha pages to non-browser agents.

/// Desktop browser User-Agent for web endpoints and short-link probes.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Mobile app User-Agent for app-style feed endpoints.
const APP_USER_AGENT: &str = "com.zhiliaoapp.musically/2023501030 (Linux; U; Android 14; en_US; Pixel 8; Build/UQ1A.240205.002; Cronet/TTNetVersion:5f9640e3 2023-10-24 QuicVersion:c8ee2312 2023-08-23)";

/// Default User-Agent for browser-facing requests.
#[must_use]
pub(crate) fn browser_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

/// Default User-Agent for app API requests.
#[must_use]
pub(crate) fn app_user_agent() -> String {
    APP_USER_AGENT.to_string()
}
