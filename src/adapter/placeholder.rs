//! Placeholder adapter for platforms that are recognised but not resolvable yet.

use async_trait::async_trait;
use tracing::debug;

use crate::auth::Credential;
use crate::classifier::ResolvedIdentifier;
use crate::error::GatewayError;
use crate::platform::Platform;

use super::{PlatformAdapter, RawPlatformData};

/// Adapter that deterministically fails with `NotImplemented`.
///
/// Registering it gives a platform a place in dispatch, so callers see
/// `NotImplemented` instead of `UnsupportedService`.
#[derive(Debug, Clone)]
pub struct NotImplementedAdapter {
    platform: Platform,
    name: String,
}

impl NotImplementedAdapter {
    /// Creates a placeholder for `platform`.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            name: format!("{platform}-placeholder"),
        }
    }
}

#[async_trait]
impl PlatformAdapter for NotImplementedAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        id: &ResolvedIdentifier,
        _credential: Option<&Credential>,
    ) -> Result<RawPlatformData, GatewayError> {
        debug!(platform = %self.platform, token = %id.token(), "Placeholder adapter invoked");
        Err(GatewayError::not_implemented(self.platform))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_placeholder_always_fails_not_implemented() {
        let adapter = NotImplementedAdapter::new(Platform::Bilibili);
        let id = ResolvedIdentifier::new(Platform::Bilibili, "BV1GJ411x7h7");
        let credential = Credential::new(Platform::Bilibili, "SESSDATA=x");

        for cred in [None, Some(&credential)] {
            let err = adapter.fetch(&id, cred).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotImplemented);
        }
        assert_eq!(adapter.name(), "bilibili-placeholder");
    }
}
