//! Adapter registry: one adapter per platform, fixed after startup.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::gateway::GatewaySettings;
use crate::platform::Platform;

use super::{DouyinAdapter, PlatformAdapter, TikTokAdapter};

/// Maps each platform to the adapter that serves it.
///
/// A platform with no entry is unsupported; the gateway checks this before
/// any network I/O.
pub struct AdapterRegistry {
    adapters: HashMap<Platform, Box<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registers an adapter under its own platform.
    ///
    /// A second adapter for the same platform replaces the first.
    #[tracing::instrument(skip(self, adapter), fields(platform = %adapter.platform(), adapter = adapter.name()))]
    pub fn register(&mut self, adapter: Box<dyn PlatformAdapter>) {
        let platform = adapter.platform();
        debug!("Registering adapter");
        if let Some(previous) = self.adapters.insert(platform, adapter) {
            warn!(
                replaced = previous.name(),
                "Adapter already registered for platform; replacing it"
            );
        }
    }

    /// Returns the adapter for `platform`, if one is registered.
    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<&dyn PlatformAdapter> {
        self.adapters.get(&platform).map(AsRef::as_ref)
    }

    /// Returns true if `platform` has an adapter.
    #[must_use]
    pub fn contains(&self, platform: Platform) -> bool {
        self.adapters.contains_key(&platform)
    }

    /// Returns the registered platforms, sorted.
    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.adapters.keys().copied().collect();
        platforms.sort();
        platforms
    }

    /// Returns the number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if no adapters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(Platform, &str)> = self
            .adapters
            .iter()
            .map(|(platform, adapter)| (*platform, adapter.name()))
            .collect();
        entries.sort_by_key(|(platform, _)| *platform);
        f.debug_struct("AdapterRegistry")
            .field("adapters", &entries)
            .finish()
    }
}

/// Builds the default adapter registry: Douyin and `TikTok`.
///
/// An adapter that fails to build is logged and left out, so its platform
/// resolves as unsupported instead of aborting startup.
#[must_use]
pub fn build_default_adapter_registry(settings: &GatewaySettings) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    let timeouts = settings.adapter_timeouts();

    match DouyinAdapter::with_base_url(&settings.douyin_api_base, timeouts) {
        Ok(adapter) => registry.register(Box::new(adapter)),
        Err(error) => warn!(
            error = %error,
            "Douyin adapter unavailable; continuing with remaining adapters"
        ),
    }

    match TikTokAdapter::with_base_url(&settings.tiktok_api_base, timeouts) {
        Ok(adapter) => registry.register(Box::new(adapter)),
        Err(error) => warn!(
            error = %error,
            "TikTok adapter unavailable; continuing with remaining adapters"
        ),
    }

    registry
}
