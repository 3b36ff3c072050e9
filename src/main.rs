use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use addon_proxy::{AddonProxyServer, AppConfig, ConfiguredAddon, Logger, ProxyServices};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(AppConfig::parse());

    // guards are kept alive to flush logs and keep the sentry connection
    let _guards = Logger::init(config.cargo_env, config.sentry_dsn.clone());

    info!("logger and env prepped...");

    let http = ProxyServices::http_client().context("failed to build the http client")?;

    // never fails, a bad or missing manifest just leaves the stream routes on 503
    info!("resolving addon manifest...");
    let addon = ConfiguredAddon::from_config(
        config.addon_manifest_url.as_deref(),
        http.clone(),
        config.upstream_timeout(),
    )
    .await;

    info!("starting server...");

    AddonProxyServer::serve(config, http, addon)
        .await
        .context("server failed to start")?;

    Ok(())
}
