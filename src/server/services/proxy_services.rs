use std::sync::Arc;

use tracing::info;

use crate::{
    addon::ConfiguredAddon,
    config::AppConfig,
    server::services::selection_services::{ProbeStrategy, StreamSelector},
};

/// everything a handler can reach, cloned into every request through the Extension layer.
/// `addon` is decided once at startup and None means every stream route answers 503
#[derive(Clone)]
pub struct ProxyServices {
    pub addon: Option<ConfiguredAddon>,
    pub selector: Arc<StreamSelector>,
    pub http: reqwest::Client,
    pub config: Arc<AppConfig>,
}

impl ProxyServices {
    pub fn new(
        config: Arc<AppConfig>,
        http: reqwest::Client,
        addon: Option<ConfiguredAddon>,
    ) -> Self {
        info!("starting proxy services...");

        let strategy = ProbeStrategy::from_config(&config);
        let selector = Arc::new(StreamSelector::new(
            http.clone(),
            config.probe_timeout(),
            strategy,
        ));

        info!(
            "stream selector ok ({:?}, {}s probe timeout), addon configured: {}",
            strategy,
            config.probe_timeout_secs,
            addon.is_some()
        );

        Self {
            addon,
            selector,
            http,
            config,
        }
    }

    /// shared client for the manifest, listings and probes. Keep-alive matters here since the
    /// probes usually hit the same couple of cdn hosts
    pub fn http_client() -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(concat!("addon-proxy/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
    }
}
