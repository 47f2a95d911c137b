//! Application configuration loading for CLI defaults.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use vidshare_core::{GatewaySettings, Platform};

/// A cookie configured for one platform.
///
/// The value is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct CookieSetting {
    pub platform: Platform,
    pub value: String,
}

impl fmt::Debug for CookieSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieSetting")
            .field("platform", &self.platform)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// TOML-backed file configuration for gateway defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Per-attempt short-link probe timeout in seconds.
    pub probe_timeout_secs: Option<u64>,
    /// Adapter fetch timeout in seconds.
    pub fetch_timeout_secs: Option<u64>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Override for the Douyin API base URL.
    pub douyin_api_base: Option<String>,
    /// Override for the `TikTok` API base URL.
    pub tiktok_api_base: Option<String>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// Cookies seeded into the credential store at startup, in file order.
    pub cookies: Vec<CookieSetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("probe_timeout_secs", self.probe_timeout_secs)?;
        validate_timeout_secs("fetch_timeout_secs", self.fetch_timeout_secs)?;
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_api_base("douyin_api_base", self.douyin_api_base.as_deref())?;
        validate_api_base("tiktok_api_base", self.tiktok_api_base.as_deref())?;
        Ok(())
    }

    /// Applies file values on top of `settings`.
    pub fn apply_to(&self, settings: &mut GatewaySettings) {
        if let Some(secs) = self.probe_timeout_secs {
            settings.probe_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.fetch_timeout_secs {
            settings.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.connect_timeout_secs {
            settings.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(base) = &self.douyin_api_base {
            settings.douyin_api_base.clone_from(base);
        }
        if let Some(base) = &self.tiktok_api_base {
            settings.tiktok_api_base.clone_from(base);
        }
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

fn validate_api_base(field: &str, value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        bail!("Invalid config value for `{field}`: '{value}'. Expected an http(s) URL");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Returns the tracing level this setting maps to.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/vidshare/config.toml`
/// 2. `$HOME/.config/vidshare/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("vidshare")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("vidshare")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Loads and validates the config file at `path`.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "probe_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `probe_timeout_secs` value on line {line_number}")
                })?;
                cfg.probe_timeout_secs = Some(parsed);
            }
            "fetch_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `fetch_timeout_secs` value on line {line_number}")
                })?;
                cfg.fetch_timeout_secs = Some(parsed);
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_number}")
                })?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "douyin_api_base" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `douyin_api_base` value on line {line_number}")
                })?;
                cfg.douyin_api_base = Some(parsed);
            }
            "tiktok_api_base" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `tiktok_api_base` value on line {line_number}")
                })?;
                cfg.tiktok_api_base = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `verbosity` value on line {line_number}")
                })?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            cookie_key if cookie_key.ends_with("_cookie") => {
                let service = cookie_key.trim_end_matches("_cookie");
                let platform: Platform = service.parse().with_context(|| {
                    format!("Unknown cookie service '{service}' on line {line_number}")
                })?;
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `{cookie_key}` value on line {line_number}")
                })?;
                cfg.cookies.retain(|cookie| cookie.platform != platform);
                cfg.cookies.push(CookieSetting {
                    platform,
                    value: parsed,
                });
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}
