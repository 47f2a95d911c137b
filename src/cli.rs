//! CLI argument definitions using clap derive macros.

use std::fmt;

use clap::Parser;

use vidshare_core::Platform;

/// Resolve a share link or content id into a normalized video descriptor.
///
/// Accepts a raw URL, a short link, pasted share text containing a URL, or a
/// bare platform id. The descriptor is printed to stdout as JSON.
#[derive(Parser, Debug)]
#[command(name = "vidshare")]
#[command(author, version, about)]
pub struct Args {
    /// Share text, URL, or content id (read from stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Emit only id, platform, title, cover and play URL
    #[arg(short, long)]
    pub minimal: bool,

    /// Cookie for a platform as SERVICE=VALUE (repeatable)
    #[arg(long = "cookie", value_name = "SERVICE=VALUE", value_parser = parse_cookie_arg)]
    pub cookies: Vec<CookieArg>,

    /// Adapter fetch timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub fetch_timeout: Option<u64>,
}

impl Args {
    /// Joins positional input into one string, as if pasted.
    #[must_use]
    pub fn input_text(&self) -> Option<String> {
        if self.input.is_empty() {
            None
        } else {
            Some(self.input.join(" "))
        }
    }
}

/// A `--cookie` value, parsed into its platform and raw cookie string.
#[derive(Clone, PartialEq, Eq)]
pub struct CookieArg {
    pub platform: Platform,
    pub value: String,
}

impl fmt::Debug for CookieArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieArg")
            .field("platform", &self.platform)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

fn parse_cookie_arg(raw: &str) -> Result<CookieArg, String> {
    let Some((service, value)) = raw.split_once('=') else {
        return Err("expected SERVICE=VALUE, e.g. douyin=sessionid=abc".to_string());
    };
    let platform: Platform = service.trim().parse().map_err(|e| format!("{e}"))?;
    Ok(CookieArg {
        platform,
        value: value.to_string(),
    })
}
