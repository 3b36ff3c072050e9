use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, error, info};

use crate::{
    addon::model::{MediaRequest, Stream, StreamsResponse},
    server::error::{AppResult, Error},
};

pub type DynAddonClient = Arc<dyn AddonClientTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait AddonClientTrait {
    /// raw stream list for a movie or episode, in the order the addon returned it
    async fn fetch_streams(&self, media: &MediaRequest) -> AppResult<Vec<Stream>>;
}

pub struct AddonClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl AddonClient {
    pub fn new(base_url: String, http: reqwest::Client, timeout: Duration) -> Self {
        Self {
            base_url,
            http,
            timeout,
        }
    }

    pub fn stream_url(&self, media: &MediaRequest) -> String {
        format!("{}/{}", self.base_url, media.stream_path())
    }
}

#[async_trait]
impl AddonClientTrait for AddonClient {
    async fn fetch_streams(&self, media: &MediaRequest) -> AppResult<Vec<Stream>> {
        let url = self.stream_url(media);
        info!("fetching streams for {} from {}", media, url);

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!("stream listing request failed: {}", e);
                Error::Upstream(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("addon returned {} for {}", status, url);
            return Err(Error::Upstream(format!("addon returned {}", status)));
        }

        let body: StreamsResponse = response.json().await.map_err(|e| {
            error!("failed to parse stream listing: {}", e);
            Error::Upstream(format!("invalid stream listing: {}", e))
        })?;

        let streams = body.streams.unwrap_or_default();
        debug!("addon returned {} streams for {}", streams.len(), media);

        Ok(streams)
    }
}
