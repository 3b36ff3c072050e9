pub mod api;
pub mod dtos;
pub mod error;
pub mod extractors;
pub mod services;
pub mod utils;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{
    Extension, Router, ServiceExt,
    extract::Request,
    http::{HeaderValue, Method},
    routing::get,
};
use once_cell::sync::Lazy;
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::NormalizePathLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    addon::ConfiguredAddon,
    config::AppConfig,
    server::{
        api::{
            health_controller::{
                fallback_endpoint, health_endpoint, info_endpoint, root_endpoint,
            },
            stream_controller::StreamController,
        },
        services::proxy_services::ProxyServices,
    },
};

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn get_uptime_seconds() -> u64 {
    START_TIME.elapsed().as_secs()
}

pub struct AddonProxyServer;

impl AddonProxyServer {
    /// every route plus the services extension, no listener. Tests drive this directly
    pub fn router(services: ProxyServices) -> Router {
        let cors = Self::cors_layer(&services.config.cors_origin);

        Router::new()
            .route("/", get(root_endpoint))
            .route("/health", get(health_endpoint))
            .route("/info", get(info_endpoint))
            .merge(StreamController::app())
            .fallback(fallback_endpoint)
            .layer(Extension(services))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    fn cors_layer(cors_origin: &str) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
            .allow_headers(Any);

        if cors_origin.trim() == "*" {
            return layer.allow_origin(Any);
        }

        let origins: Vec<HeaderValue> = cors_origin
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("ignoring invalid cors origin '{}'", o);
                    None
                }
            })
            .collect();

        layer.allow_origin(AllowOrigin::list(origins))
    }

    pub async fn serve(
        config: Arc<AppConfig>,
        http: reqwest::Client,
        addon: Option<ConfiguredAddon>,
    ) -> anyhow::Result<()> {
        // start the uptime clock
        Lazy::force(&START_TIME);

        let services = ProxyServices::new(config.clone(), http, addon);
        let app = NormalizePathLayer::trim_trailing_slash().layer(Self::router(services));

        let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
            .await
            .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;

        let addr: SocketAddr = listener.local_addr().context("listener has no address")?;
        info!("listening on {}", addr);

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(Self::shutdown_signal())
            .await
            .context("server error")?;

        info!("server stopped");
        Ok(())
    }

    async fn shutdown_signal() {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
            // never resolve, the process gets killed the hard way instead
            std::future::pending::<()>().await;
        }
        info!("shutdown signal received, draining connections...");
    }
}
