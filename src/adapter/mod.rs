//! Platform adapters: fetch raw content records from upstream APIs.
//!
//! Each adapter owns exactly one platform. It turns a
//! [`ResolvedIdentifier`] plus an optional credential snapshot into
//! [`RawPlatformData`]: the upstream JSON record tagged with the field layout
//! the normalizer should read it with. Adapters never normalize.
//!
//! # Architecture
//!
//! - [`PlatformAdapter`] - Async trait every adapter implements
//! - [`AdapterRegistry`] - One adapter per platform, looked up before any network I/O
//! - [`DouyinAdapter`] - Douyin web detail API
//! - [`TikTokAdapter`] - `TikTok` feed API
//! - [`NotImplementedAdapter`] - Placeholder that always fails with `NotImplemented`
//!
//! Every adapter maps upstream failures the same way (see
//! [`classify_status`]) so error kinds stay consistent across platforms.

mod douyin;
mod placeholder;
mod registry;
mod tiktok;
mod utils;

pub use douyin::{DOUYIN_API_BASE, DouyinAdapter};
pub use placeholder::NotImplementedAdapter;
pub use registry::{AdapterRegistry, build_default_adapter_registry};
pub use tiktok::{TIKTOK_API_BASE, TikTokAdapter};
pub use utils::{MAX_RETRY_AFTER, classify_status, parse_retry_after};

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::Credential;
use crate::classifier::ResolvedIdentifier;
use crate::error::GatewayError;
use crate::normalizer::FieldLayout;
use crate::platform::Platform;

/// Platform-shaped content record returned by an adapter.
///
/// `payload` is the single content item (not the whole API envelope);
/// `layout` tells the normalizer where each field lives inside it.
#[derive(Debug, Clone)]
pub struct RawPlatformData {
    /// Platform the record came from
    pub platform: Platform,
    /// Field locations for this record shape
    pub layout: &'static FieldLayout,
    /// The content record itself
    pub payload: Value,
}

impl RawPlatformData {
    /// Creates a raw record.
    #[must_use]
    pub fn new(platform: Platform, layout: &'static FieldLayout, payload: Value) -> Self {
        Self {
            platform,
            layout,
            payload,
        }
    }
}

/// Trait that all platform adapters must implement.
///
/// # Object Safety
///
/// This trait uses `async_trait` so the registry can hold
/// `Box<dyn PlatformAdapter>`.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Returns the platform this adapter serves.
    fn platform(&self) -> Platform;

    /// Returns the adapter's name for logging (e.g., "douyin-web").
    fn name(&self) -> &str;

    /// Fetches the raw content record for `id`.
    ///
    /// `credential` is the snapshot taken when resolution started; `None`
    /// means no credential is stored. Adapters may succeed without one.
    async fn fetch(
        &self,
        id: &ResolvedIdentifier,
        credential: Option<&Credential>,
    ) -> Result<RawPlatformData, GatewayError>;
}
