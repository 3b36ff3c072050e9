use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::addon::Manifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// up and answering, but the addon isn't configured so stream routes are 503
    Degraded,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonHealth {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
    pub environment: String,
    pub addon: AddonHealth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub service: String,
    pub version: String,
    pub configured: bool,
    pub addon_host: Option<String>,
    pub manifest: Option<Manifest>,
    pub response_mode: String,
    pub probe_strategy: String,
    pub probe_timeout_secs: u64,
    pub supported_formats: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub configured: bool,
    pub endpoints: Vec<EndpointDoc>,
    pub query_parameters: Vec<EndpointDoc>,
}
