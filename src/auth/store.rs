//! In-memory, per-platform credential store.
//!
//! Each platform holds at most one credential (an opaque cookie header
//! value). Values are replaced wholesale as `Arc` snapshots, so a reader
//! always sees either the previous or the new value, never a mix, and
//! updates to different platforms never contend on a shared lock.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;
use tracing::{debug, info, instrument};

use crate::error::GatewayError;
use crate::platform::Platform;

/// An opaque credential for one platform.
///
/// The value is redacted in Debug output so it cannot leak into logs.
#[derive(Clone)]
pub struct Credential {
    platform: Platform,
    value: String,
    updated_at: SystemTime,
}

impl Credential {
    /// Creates a credential stamped with the current time.
    #[must_use]
    pub fn new(platform: Platform, value: impl Into<String>) -> Self {
        Self {
            platform,
            value: value.into(),
            updated_at: SystemTime::now(),
        }
    }

    /// Returns the platform this credential belongs to.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Returns the raw credential value.
    ///
    /// Sensitive; never log the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if the stored value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Returns when this credential was stored.
    #[must_use]
    pub fn updated_at(&self) -> SystemTime {
        self.updated_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("platform", &self.platform)
            .field("value", &"[REDACTED]")
            .field("value_len", &self.value.len())
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Concurrent map from platform to its current credential.
pub struct CredentialStore {
    entries: DashMap<Platform, Arc<Credential>>,
    supported: HashSet<Platform>,
}

impl CredentialStore {
    /// Creates an empty store accepting credentials for every known platform.
    #[must_use]
    pub fn new() -> Self {
        Self::with_supported(Platform::ALL)
    }

    /// Creates an empty store accepting credentials only for `platforms`.
    #[must_use]
    pub fn with_supported(platforms: impl IntoIterator<Item = Platform>) -> Self {
        Self {
            entries: DashMap::new(),
            supported: platforms.into_iter().collect(),
        }
    }

    /// Returns true if `platform` accepts credentials.
    #[must_use]
    pub fn supports(&self, platform: Platform) -> bool {
        self.supported.contains(&platform)
    }

    /// Returns a snapshot of the current credential for `platform`, if any.
    ///
    /// The snapshot stays valid even if the credential is replaced later.
    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<Arc<Credential>> {
        self.entries.get(&platform).map(|entry| Arc::clone(entry.value()))
    }

    /// Replaces the credential for `platform`.
    ///
    /// Surrounding whitespace is trimmed. An empty value is stored as-is and
    /// is the caller's way to clear authentication without removing the entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnsupportedService`] if the platform does not
    /// accept credentials in this store. The previous value is unchanged.
    #[instrument(skip(self, value), fields(platform = %platform))]
    pub fn set(&self, platform: Platform, value: &str) -> Result<(), GatewayError> {
        if !self.supports(platform) {
            return Err(GatewayError::unsupported_service(platform.as_str()));
        }

        let value = value.trim();

        let credential = Arc::new(Credential::new(platform, value));
        let replaced = self.entries.insert(platform, credential).is_some();
        info!(replaced, value_len = value.len(), "Credential updated");
        Ok(())
    }

    /// Removes the credential for `platform`, returning the last snapshot.
    pub fn remove(&self, platform: Platform) -> Option<Arc<Credential>> {
        let removed = self.entries.remove(&platform).map(|(_, credential)| credential);
        if removed.is_some() {
            debug!(platform = %platform, "Credential removed");
        }
        removed
    }

    /// Returns the platforms that currently hold a credential, sorted.
    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.entries.iter().map(|entry| *entry.key()).collect();
        platforms.sort();
        platforms
    }

    /// Returns the number of stored credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no credential is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut supported: Vec<Platform> = self.supported.iter().copied().collect();
        supported.sort();
        f.debug_struct("CredentialStore")
            .field("stored", &self.platforms())
            .field("supported", &supported)
            .finish()
    }
}
