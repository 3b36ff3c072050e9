use axum::Extension;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use crate::addon::ConfiguredAddon;
use crate::server::error::Error;
use crate::server::services::proxy_services::ProxyServices;

/// gate for every route that needs the addon, rejects with 503 when startup couldn't configure it.
/// Put it first in the handler args so the 503 wins over path validation
pub struct Configured(pub ConfiguredAddon, pub ProxyServices);

impl<S> FromRequestParts<S> for Configured
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(services): Extension<ProxyServices> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|err| Error::InternalServerErrorWithContext(err.to_string()))?;

        let Some(addon) = services.addon.clone() else {
            debug!("rejecting {} since no addon is configured", parts.uri.path());
            return Err(Error::NotConfigured);
        };

        Ok(Configured(addon, services))
    }
}
