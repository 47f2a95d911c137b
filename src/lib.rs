//! Vidshare Core Library
//!
//! Resolves short-video share inputs (URLs, share text wrapping a URL, or
//! bare share tokens) from several platforms into one normalized
//! [`VideoDescriptor`], and keeps per-platform credentials that can be
//! replaced at runtime.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`platform`] - Closed set of supported platforms
//! - [`classifier`] - Share input classification and short-link probing
//! - [`auth`] - Concurrent per-platform credential store
//! - [`adapter`] - Per-platform upstream fetchers and their registry
//! - [`normalizer`] - Layout-driven projection into [`VideoDescriptor`]
//! - [`gateway`] - Orchestrator tying the above together
//! - [`error`] - Closed error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use vidshare_core::{GatewaySettings, HybridGateway, Platform};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = HybridGateway::from_settings(&GatewaySettings::default())?;
//! gateway.update_credential(Platform::Douyin, "ttwid=...; sessionid=...")?;
//!
//! let video = gateway
//!     .resolve("https://v.douyin.com/L4FJNR3/", false)
//!     .await?;
//! println!("{} -> {:?}", video.title, video.play_url);
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod auth;
pub mod classifier;
pub mod error;
pub mod gateway;
pub mod normalizer;
pub mod platform;

mod http_client;
mod user_agent;

// Re-export commonly used types
pub use adapter::{AdapterRegistry, PlatformAdapter, RawPlatformData};
pub use auth::{Credential, CredentialStore};
pub use classifier::{Classifier, ResolvedIdentifier};
pub use error::{BuildError, ErrorKind, GatewayError};
pub use gateway::{GatewaySettings, HybridGateway};
pub use http_client::HttpTimeouts;
pub use normalizer::{VideoDescriptor, project};
pub use platform::Platform;
