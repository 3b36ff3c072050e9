use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::{info, warn};

use crate::addon::{
    client::{AddonClient, DynAddonClient},
    model::Manifest,
};

const MANIFEST_SUFFIX: &str = "/manifest.json";

/// strips `/manifest.json` (after one trailing slash) off the manifest url, anything that doesn't
/// end in it is rejected since there's no way to know where the addon root is
pub fn resolve_base_url(manifest_url: &str) -> anyhow::Result<String> {
    let trimmed = manifest_url.strip_suffix('/').unwrap_or(manifest_url);

    match trimmed.strip_suffix(MANIFEST_SUFFIX) {
        Some(base) if !base.is_empty() => Ok(base.to_string()),
        _ => bail!(
            "manifest url must end with {}, got '{}'",
            MANIFEST_SUFFIX,
            manifest_url
        ),
    }
}

/// everything the stream routes need, built once at startup and never touched again
#[derive(Clone)]
pub struct ConfiguredAddon {
    pub base_url: String,
    pub manifest: Manifest,
    pub client: DynAddonClient,
}

impl ConfiguredAddon {
    pub fn new(base_url: String, manifest: Manifest, client: DynAddonClient) -> Self {
        Self {
            base_url,
            manifest,
            client,
        }
    }

    /// scheme, host and port of the addon. The path often carries a per-user key so it never
    /// leaves the process
    pub fn public_origin(&self) -> Option<String> {
        url::Url::parse(&self.base_url)
            .ok()
            .filter(|url| url.has_host())
            .map(|url| url.origin().ascii_serialization())
    }

    /// resolves the base url and pulls the manifest, both have to work or the addon stays unset
    pub async fn load(
        manifest_url: &str,
        http: reqwest::Client,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let base_url = resolve_base_url(manifest_url)?;
        info!("resolved addon base url: {}", base_url);

        let response = http
            .get(manifest_url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("failed to fetch manifest from {}", manifest_url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("manifest request returned {}", status);
        }

        let manifest: Manifest = response
            .json()
            .await
            .context("manifest is not valid json")?;

        info!(
            "loaded manifest for {} v{}",
            manifest.display_name(),
            manifest.version.as_deref().unwrap_or("?")
        );

        let client = Arc::new(AddonClient::new(base_url.clone(), http, timeout)) as DynAddonClient;

        Ok(Self::new(base_url, manifest, client))
    }

    /// same as load but never fails, the server boots either way and reports 503 when unset
    pub async fn from_config(
        manifest_url: Option<&str>,
        http: reqwest::Client,
        timeout: Duration,
    ) -> Option<Self> {
        let Some(manifest_url) = manifest_url else {
            warn!("no addon manifest url configured, stream routes will answer 503");
            return None;
        };

        match Self::load(manifest_url, http, timeout).await {
            Ok(addon) => Some(addon),
            Err(e) => {
                warn!(
                    "addon configuration failed, stream routes will answer 503: {:#}",
                    e
                );
                None
            }
        }
    }
}
