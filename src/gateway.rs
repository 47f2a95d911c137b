//! Hybrid gateway: classify, fetch, and normalize in one call.
//!
//! [`HybridGateway::resolve`] composes the classifier, the adapter registry,
//! the credential store, and the normalizer. Every failure propagates with
//! its original kind; the gateway never retries a fetch. The only internal
//! retry is the classifier's short-link probe.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::adapter::{AdapterRegistry, DOUYIN_API_BASE, TIKTOK_API_BASE, build_default_adapter_registry};
use crate::auth::{Credential, CredentialStore};
use crate::classifier::{Classifier, HttpRedirectProbe};
use crate::error::{BuildError, GatewayError};
use crate::http_client::HttpTimeouts;
use crate::normalizer::{VideoDescriptor, project};
use crate::platform::Platform;

/// Default per-attempt timeout for short-link probes.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// Default bound on one adapter fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Default TCP/TLS connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Startup settings for [`HybridGateway::from_settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Per-attempt bound on the short-link redirect probe
    pub probe_timeout: Duration,
    /// Bound on one adapter fetch
    pub fetch_timeout: Duration,
    /// Connect timeout for every HTTP client
    pub connect_timeout: Duration,
    /// Douyin web API base URL
    pub douyin_api_base: String,
    /// `TikTok` app API base URL
    pub tiktok_api_base: String,
}

impl GatewaySettings {
    /// Client timeouts for adapters.
    #[must_use]
    pub fn adapter_timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect: self.connect_timeout,
            request: self.fetch_timeout,
        }
    }

    /// Client timeouts for the redirect probe.
    #[must_use]
    pub fn probe_timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect: self.connect_timeout.min(self.probe_timeout),
            request: self.probe_timeout,
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            douyin_api_base: DOUYIN_API_BASE.to_string(),
            tiktok_api_base: TIKTOK_API_BASE.to_string(),
        }
    }
}

/// Resolves share inputs into [`VideoDescriptor`]s and manages credentials.
///
/// Cheap to share behind `Arc`; every method takes `&self`.
pub struct HybridGateway {
    classifier: Classifier,
    registry: Arc<AdapterRegistry>,
    credentials: Arc<CredentialStore>,
    fetch_timeout: Duration,
}

impl HybridGateway {
    /// Assembles a gateway from its parts.
    #[must_use]
    pub fn new(
        classifier: Classifier,
        registry: AdapterRegistry,
        credentials: Arc<CredentialStore>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            registry: Arc::new(registry),
            credentials,
            fetch_timeout,
        }
    }

    /// Builds a gateway with the default rules, adapters, and HTTP probe.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the redirect probe's HTTP client cannot be
    /// built. Adapters that fail to build are skipped with a warning.
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, BuildError> {
        let probe = HttpRedirectProbe::new(settings.probe_timeouts())
            .map_err(|e| BuildError::http_client("redirect-probe", e))?;
        let classifier = Classifier::new(Arc::new(probe), settings.probe_timeout);
        let registry = build_default_adapter_registry(settings);

        info!(
            platforms = ?registry.platforms(),
            fetch_timeout_ms = settings.fetch_timeout.as_millis(),
            probe_timeout_ms = settings.probe_timeout.as_millis(),
            "Gateway ready"
        );

        Ok(Self::new(
            classifier,
            registry,
            Arc::new(CredentialStore::new()),
            settings.fetch_timeout,
        ))
    }

    /// Resolves `input` into a descriptor.
    ///
    /// Steps run strictly in order: detect, adapter lookup, short-link
    /// completion, credential snapshot, bounded fetch, projection.
    ///
    /// # Errors
    ///
    /// Propagates the first failing step's [`GatewayError`] unchanged. A
    /// platform without an adapter fails with `UnsupportedService` before
    /// any network I/O; a fetch exceeding the fetch timeout fails with
    /// `UpstreamError`.
    #[tracing::instrument(skip(self, input), fields(input_len = input.len()))]
    pub async fn resolve(&self, input: &str, minimal: bool) -> Result<VideoDescriptor, GatewayError> {
        let candidate = self.classifier.detect(input)?;
        let platform = candidate.platform();

        let Some(adapter) = self.registry.get(platform) else {
            debug!(platform = %platform, "No adapter registered");
            return Err(GatewayError::no_adapter(platform));
        };

        let id = self.classifier.finish(candidate).await?;
        let credential = self.credentials.get(platform);

        debug!(
            platform = %platform,
            token = %id.token(),
            adapter = adapter.name(),
            authenticated = credential.is_some(),
            "Dispatching to adapter"
        );

        let raw = tokio::time::timeout(self.fetch_timeout, adapter.fetch(&id, credential.as_deref()))
            .await
            .map_err(|_| {
                GatewayError::upstream(
                    platform,
                    &format!("fetch timed out after {}ms", self.fetch_timeout.as_millis()),
                )
            })??;

        let descriptor = project(&raw, minimal)?;
        info!(platform = %platform, id = %descriptor.id, "Resolved share input");
        Ok(descriptor)
    }

    /// Replaces the credential for `platform`.
    ///
    /// In-flight resolutions keep the snapshot they already took.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedService` if the store does not accept credentials
    /// for `platform`.
    #[tracing::instrument(skip(self, value))]
    pub fn update_credential(&self, platform: Platform, value: &str) -> Result<(), GatewayError> {
        self.credentials.set(platform, value)
    }

    /// Replaces a credential by service name (`douyin`, `tiktok_web`, ...).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedService` for an unknown service name.
    pub fn update_credential_for_service(&self, service: &str, value: &str) -> Result<(), GatewayError> {
        let platform: Platform = service.parse()?;
        self.update_credential(platform, value)
    }

    /// Returns the current credential snapshot for `platform`.
    #[must_use]
    pub fn credential(&self, platform: Platform) -> Option<Arc<Credential>> {
        self.credentials.get(platform)
    }

    /// Returns the platforms that have an adapter.
    #[must_use]
    pub fn supported_platforms(&self) -> Vec<Platform> {
        self.registry.platforms()
    }

    /// Returns the shared credential store.
    #[must_use]
    pub fn credential_store(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }
}

impl std::fmt::Debug for HybridGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridGateway")
            .field("classifier", &self.classifier)
            .field("registry", &self.registry)
            .field("credentials", &self.credentials)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::adapter::{NotImplementedAdapter, PlatformAdapter, RawPlatformData};
    use crate::classifier::{ProbeFailure, RedirectProbe, ResolvedIdentifier};
    use crate::error::ErrorKind;
    use crate::normalizer::AWEME_LAYOUT;

    /// Probe that must never be called.
    struct UnreachableProbe(AtomicU32);

    #[async_trait]
    impl RedirectProbe for UnreachableProbe {
        async fn resolve_redirect(&self, url: &Url) -> Result<Url, ProbeFailure> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(ProbeFailure::new(format!("unexpected probe of {url}")))
        }
    }

    /// Adapter that echoes the credential it saw into the title.
    struct EchoAdapter {
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl PlatformAdapter for EchoAdapter {
        fn platform(&self) -> Platform {
            Platform::Douyin
        }

        fn name(&self) -> &'static str {
            "echo"
        }

        async fn fetch(
            &self,
            id: &ResolvedIdentifier,
            credential: Option<&Credential>,
        ) -> Result<RawPlatformData, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let seen = credential.map_or("anonymous", Credential::value);
            Ok(RawPlatformData::new(
                Platform::Douyin,
                &AWEME_LAYOUT,
                json!({
                    "aweme_id": id.token(),
                    "desc": seen,
                    "video": {"play_addr": {"url_list": ["https://v.example/a.mp4"]}}
                }),
            ))
        }
    }

    struct SlowAdapter;

    #[async_trait]
    impl PlatformAdapter for SlowAdapter {
        fn platform(&self) -> Platform {
            Platform::TikTok
        }

        fn name(&self) -> &'static str {
            "slow"
        }

        async fn fetch(
            &self,
            _id: &ResolvedIdentifier,
            _credential: Option<&Credential>,
        ) -> Result<RawPlatformData, GatewayError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(GatewayError::upstream(Platform::TikTok, "unreachable"))
        }
    }

    fn gateway(calls: Arc<AtomicU32>) -> HybridGateway {
        let mut registry = AdapterRegistry::new();
        registry.register(Box::new(EchoAdapter { calls }));
        registry.register(Box::new(SlowAdapter));
        let classifier = Classifier::new(
            Arc::new(UnreachableProbe(AtomicU32::new(0))),
            Duration::from_secs(1),
        );
        HybridGateway::new(
            classifier,
            registry,
            Arc::new(CredentialStore::new()),
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn test_resolve_uses_current_credential_snapshot() {
        let gateway = gateway(Arc::new(AtomicU32::new(0)));
        let url = "https://www.douyin.com/video/7372484719365098803";

        let anonymous = gateway.resolve(url, false).await.unwrap();
        assert_eq!(anonymous.title, "anonymous");

        gateway.update_credential(Platform::Douyin, "sessionid=v2").unwrap();
        let authed = gateway.resolve(url, false).await.unwrap();
        assert_eq!(authed.title, "sessionid=v2");
        assert_eq!(authed.id, "7372484719365098803");
    }

    #[tokio::test]
    async fn test_resolve_unsupported_platform_before_any_io() {
        let calls = Arc::new(AtomicU32::new(0));
        let gateway = gateway(calls.clone());
        let err = gateway
            .resolve("https://b23.tv/abc123", false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedService);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_unrecognized_input() {
        let gateway = gateway(Arc::new(AtomicU32::new(0)));
        let err = gateway.resolve("not a url", false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedInput);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout_is_upstream_error() {
        let gateway = gateway(Arc::new(AtomicU32::new(0)));
        let started = tokio::time::Instant::now();
        let err = gateway
            .resolve("https://www.tiktok.com/@scout2015/video/6718335390845095173", false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamError);
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_not_implemented_adapter_propagates_kind() {
        let mut registry = AdapterRegistry::new();
        registry.register(Box::new(NotImplementedAdapter::new(Platform::Bilibili)));
        let gateway = HybridGateway::new(
            Classifier::new(Arc::new(UnreachableProbe(AtomicU32::new(0))), Duration::from_secs(1)),
            registry,
            Arc::new(CredentialStore::new()),
            Duration::from_secs(1),
        );
        let err = gateway
            .resolve("https://www.bilibili.com/video/BV1GJ411x7h7", false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn test_update_credential_for_service_accepts_suffix() {
        let gateway = gateway(Arc::new(AtomicU32::new(0)));
        gateway
            .update_credential_for_service("douyin_web", " ttwid=1 ")
            .unwrap();
        assert_eq!(gateway.credential(Platform::Douyin).unwrap().value(), "ttwid=1");

        gateway.update_credential_for_service("TikTok", "sid=2").unwrap();
        assert_eq!(gateway.credential(Platform::TikTok).unwrap().value(), "sid=2");
    }

    #[test]
    fn test_update_credential_for_unknown_service() {
        let gateway = gateway(Arc::new(AtomicU32::new(0)));
        let err = gateway
            .update_credential_for_service("youtube", "x")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedService);
        assert!(gateway.credential_store().is_empty());
    }

    #[test]
    fn test_supported_platforms_lists_registered_adapters() {
        let gateway = gateway(Arc::new(AtomicU32::new(0)));
        assert_eq!(gateway.supported_platforms(), vec![Platform::Douyin, Platform::TikTok]);
    }

    #[test]
    fn test_default_settings() {
        let settings = GatewaySettings::default();
        assert_eq!(settings.probe_timeout, Duration::from_secs(10));
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
        assert_eq!(settings.adapter_timeouts().request, Duration::from_secs(30));
        assert_eq!(settings.probe_timeouts().request, Duration::from_secs(10));
    }

    #[test]
    fn test_from_settings_registers_default_adapters() {
        let gateway = HybridGateway::from_settings(&GatewaySettings::default()).unwrap();
        assert_eq!(gateway.supported_platforms(), vec![Platform::Douyin, Platform::TikTok]);
    }
}
