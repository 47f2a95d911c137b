//! CLI entry point for the vidshare resolver.

use std::io::{self, IsTerminal, Read};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use vidshare_core::{GatewaySettings, HybridGateway};

mod app_config;
mod cli;

use app_config::{FileConfig, VerbositySetting};
use cli::Args;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Failure,
}

impl ProcessExit {
    /// Numeric process status; 2 signals a failed resolution.
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(outcome: ProcessExit) -> Self {
        ExitCode::from(outcome.code())
    }
}

/// Picks the default log level.
///
/// Priority: quiet flag > verbose flag > config verbosity > info.
/// `RUST_LOG` overrides all of these when the filter is built.
fn default_log_level(args: &Args, config_verbosity: Option<VerbositySetting>) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => config_verbosity.map_or("info", VerbositySetting::log_level),
        1 => "debug",
        _ => "trace",
    }
}

fn build_settings(args: &Args, file_config: Option<&FileConfig>) -> GatewaySettings {
    let mut settings = GatewaySettings::default();
    if let Some(cfg) = file_config {
        cfg.apply_to(&mut settings);
    }
    if let Some(secs) = args.fetch_timeout {
        settings.fetch_timeout = Duration::from_secs(secs);
    }
    settings
}

fn seed_credentials(
    gateway: &HybridGateway,
    args: &Args,
    file_config: Option<&FileConfig>,
) -> Result<()> {
    let configured = file_config.map(|cfg| cfg.cookies.as_slice()).unwrap_or_default();
    for cookie in configured {
        gateway
            .update_credential(cookie.platform, &cookie.value)
            .with_context(|| format!("Failed to seed {} cookie from config", cookie.platform))?;
    }
    for cookie in &args.cookies {
        gateway
            .update_credential(cookie.platform, &cookie.value)
            .with_context(|| format!("Failed to set {} cookie from --cookie", cookie.platform))?;
    }
    Ok(())
}

fn read_input(args: &Args) -> Result<Option<String>> {
    if let Some(text) = args.input_text() {
        return Ok(Some(text));
    }
    if io::stdin().is_terminal() {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read input from stdin")?;
    Ok(Some(buffer))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded = app_config::load_default_file_config()?;
    let file_config = loaded.config.as_ref();

    let default_level = default_log_level(&args, file_config.and_then(|cfg| cfg.verbosity));
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the JSON descriptor
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, config_path = ?loaded.path, "CLI arguments parsed");
    if let Some(cfg) = file_config {
        debug!(
            ?cfg,
            verbosity = cfg.verbosity.map_or("unset", VerbositySetting::as_str),
            "Loaded file config"
        );
    }

    let input = match read_input(&args)? {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            info!("No input provided. Pass a share link as an argument or pipe it via stdin.");
            info!("Example: vidshare 'https://www.douyin.com/video/7298145681699622182'");
            return Ok(ProcessExit::Success.into());
        }
    };

    let settings = build_settings(&args, file_config);
    let gateway = HybridGateway::from_settings(&settings)?;
    seed_credentials(&gateway, &args, file_config)?;

    match gateway.resolve(input.trim(), args.minimal).await {
        Ok(descriptor) => {
            let json = serde_json::to_string_pretty(&descriptor)
                .context("Failed to serialize descriptor")?;
            println!("{json}");
            Ok(ProcessExit::Success.into())
        }
        Err(error) => {
            if error.is_retryable() {
                warn!(kind = %error.kind(), "Resolution failed with a retryable error");
            }
            eprintln!("error [{}]: {error}", error.kind());
            Ok(ProcessExit::Failure.into())
        }
    }
}
