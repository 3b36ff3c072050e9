use axum::Extension;
use axum::Json;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;

use crate::server::dtos::health_dto::{
    AddonHealth, EndpointDoc, HealthResponse, HealthStatus, InfoResponse, RootResponse,
};
use crate::server::error::Error;
use crate::server::services::proxy_services::ProxyServices;
use crate::server::services::selection_services::ProbeStrategy;
use crate::server::utils::mime_utils::supported_formats;
use crate::server::{get_app_version, get_uptime_seconds};

/// liveness, always 200. A missing addon only makes it "degraded" since the process itself is fine
pub async fn health_endpoint(
    Extension(services): Extension<ProxyServices>,
) -> (StatusCode, Json<HealthResponse>) {
    let status = match services.addon {
        Some(_) => HealthStatus::Healthy,
        None => HealthStatus::Degraded,
    };

    let response = HealthResponse {
        status,
        timestamp: Utc::now(),
        uptime_seconds: get_uptime_seconds(),
        version: get_app_version().to_string(),
        environment: format!("{:?}", services.config.cargo_env).to_lowercase(),
        addon: AddonHealth {
            configured: services.addon.is_some(),
            host: services.addon.as_ref().and_then(|a| a.public_origin()),
        },
    };

    (StatusCode::OK, Json(response))
}

/// config snapshot, answers the same whether or not the addon is set
pub async fn info_endpoint(Extension(services): Extension<ProxyServices>) -> Json<InfoResponse> {
    let probe_strategy = match services.selector.strategy() {
        ProbeStrategy::Concurrent { limit } => format!("concurrent ({} in flight)", limit),
        ProbeStrategy::Sequential => "sequential".to_string(),
    };

    Json(InfoResponse {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: get_app_version().to_string(),
        configured: services.addon.is_some(),
        addon_host: services.addon.as_ref().and_then(|a| a.public_origin()),
        manifest: services.addon.as_ref().map(|a| a.manifest.clone()),
        response_mode: services.config.response_mode.as_str().to_string(),
        probe_strategy,
        probe_timeout_secs: services.config.probe_timeout_secs,
        supported_formats: supported_formats(),
    })
}

pub async fn root_endpoint(Extension(services): Extension<ProxyServices>) -> Json<RootResponse> {
    let description = match &services.addon {
        Some(addon) => format!(
            "Picks a playable stream from {} for a movie or episode",
            addon.manifest.display_name()
        ),
        None => "Picks a playable stream from an addon for a movie or episode".to_string(),
    };

    Json(RootResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: get_app_version().to_string(),
        description,
        configured: services.addon.is_some(),
        endpoints: vec![
            EndpointDoc {
                method: "GET",
                path: "/movie/{imdb}",
                description: "Stream for a movie, imdb looks like tt1234567",
            },
            EndpointDoc {
                method: "GET",
                path: "/tv/{imdb}/{season}/{episode}",
                description: "Stream for a single episode",
            },
            EndpointDoc {
                method: "GET",
                path: "/info",
                description: "Configuration snapshot",
            },
            EndpointDoc {
                method: "GET",
                path: "/health",
                description: "Liveness probe",
            },
        ],
        query_parameters: vec![
            EndpointDoc {
                method: "GET",
                path: "format",
                description: "Comma separated formats to accept, e.g. mkv,mp4",
            },
            EndpointDoc {
                method: "GET",
                path: "mode",
                description: "json, redirect, player or playlist",
            },
        ],
    })
}

/// anything unrouted, still 503 while unconfigured so callers see the real problem
pub async fn fallback_endpoint(
    Extension(services): Extension<ProxyServices>,
    uri: Uri,
) -> Response {
    if services.addon.is_none() {
        return Error::NotConfigured.into_response();
    }

    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found", "path": uri.path() })),
    )
        .into_response()
}
