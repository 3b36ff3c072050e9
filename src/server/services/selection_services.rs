// picks the first usable stream out of what the addon returned. One acceptance rule, two ways of
// scheduling the probes, both give the same answer
use std::pin::pin;
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    addon::model::Stream,
    config::{AppConfig, ProbeStrategyKind},
    server::{
        error::{AppResult, Error},
        utils::mime_utils::{
            MimeEvidence, MimeSource, infer_mime, is_playable_mime, mime_for_format,
            supported_formats,
        },
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStrategy {
    /// up to `limit` probes in flight, results are still read in list order so the earliest
    /// usable candidate wins. Pending probes are dropped (and aborted) once one matches
    Concurrent { limit: usize },
    /// one probe at a time, stops at the first match
    Sequential,
}

impl ProbeStrategy {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.probe_strategy {
            ProbeStrategyKind::Concurrent => Self::Concurrent {
                limit: config.probe_concurrency.max(1),
            },
            ProbeStrategyKind::Sequential => Self::Sequential,
        }
    }
}

/// what the caller is willing to take
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatFilter {
    /// anything that looks like video or a streaming manifest
    Any,
    Targets {
        requested: Vec<String>,
        mimes: Vec<&'static str>,
    },
}

impl FormatFilter {
    /// `format=mkv,MP4` style, case doesn't matter. Unknown tokens are rejected outright instead of
    /// probing for something that can never match
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        let tokens: Vec<String> = raw
            .unwrap_or("")
            .split(',')
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return Ok(Self::Any);
        }

        let mut mimes = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let mime = mime_for_format(token).ok_or_else(|| Error::UnsupportedFormat {
                format: token.clone(),
                supported: supported_formats(),
            })?;
            if !mimes.contains(&mime) {
                mimes.push(mime);
            }
        }

        Ok(Self::Targets {
            requested: tokens,
            mimes,
        })
    }

    pub fn accepts(&self, mime: &str) -> bool {
        match self {
            Self::Any => is_playable_mime(mime),
            Self::Targets { mimes, .. } => mimes.iter().any(|target| *target == mime),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        match self {
            Self::Any => Vec::new(),
            Self::Targets { requested, .. } => requested.clone(),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// the winning candidate plus what we found out about it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub stream: Stream,
    pub url: String,
    pub mime: String,
    pub source: MimeSource,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Probe {
    Reachable { content_type: Option<String> },
    Unreachable,
}

pub struct StreamSelector {
    http: reqwest::Client,
    timeout: Duration,
    strategy: ProbeStrategy,
}

impl StreamSelector {
    pub fn new(http: reqwest::Client, timeout: Duration, strategy: ProbeStrategy) -> Self {
        Self {
            http,
            timeout,
            strategy,
        }
    }

    pub fn strategy(&self) -> ProbeStrategy {
        self.strategy
    }

    /// first usable stream in list order, or None once every candidate has been ruled out.
    /// Probe failures never escape from here
    pub async fn select(&self, streams: &[Stream], filter: &FormatFilter) -> Option<Selection> {
        debug!(
            "selecting from {} candidates with {:?} ({:?})",
            streams.len(),
            filter,
            self.strategy
        );

        let selection = match self.strategy {
            ProbeStrategy::Sequential => {
                let mut found = None;
                for (index, stream) in streams.iter().enumerate() {
                    if let Some(selection) = self.evaluate(index, stream, filter).await {
                        found = Some(selection);
                        break;
                    }
                }
                found
            }
            ProbeStrategy::Concurrent { limit } => {
                // each future owns its candidate, a borrowed one makes the handler future !Send
                let mut results = pin!(
                    futures::stream::iter(streams.iter().cloned().enumerate())
                        .map(|(index, stream)| async move {
                            self.evaluate(index, &stream, filter).await
                        })
                        .buffered(limit.max(1))
                );

                let mut found = None;
                while let Some(result) = results.next().await {
                    if result.is_some() {
                        found = result;
                        break;
                    }
                }
                found
            }
        };

        match &selection {
            Some(s) => info!(
                "selected candidate #{} ({} via {:?}): {}",
                s.index, s.mime, s.source, s.url
            ),
            None => info!("no usable stream among {} candidates", streams.len()),
        }

        selection
    }

    async fn evaluate(
        &self,
        index: usize,
        stream: &Stream,
        filter: &FormatFilter,
    ) -> Option<Selection> {
        let url = stream.playable_url()?;

        let content_type = match self.probe(url).await {
            Probe::Reachable { content_type } => content_type,
            Probe::Unreachable => return None,
        };

        let evidence = MimeEvidence::new(stream, url, content_type.as_deref());
        let (mime, source) = infer_mime(&evidence);

        if !filter.accepts(&mime) {
            debug!("candidate #{} is {} (via {:?}), skipping", index, mime, source);
            return None;
        }

        Some(Selection {
            stream: stream.clone(),
            url: url.to_string(),
            mime,
            source,
            index,
        })
    }

    async fn probe(&self, url: &str) -> Probe {
        match self.http.head(url).timeout(self.timeout).send().await {
            Ok(response) if response.status().is_success() => Probe::Reachable {
                content_type: response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(|s| s.to_string()),
            },
            Ok(response) => {
                debug!("probe of {} returned {}", url, response.status());
                Probe::Unreachable
            }
            Err(e) if e.is_timeout() => {
                debug!("probe of {} timed out after {:?}", url, self.timeout);
                Probe::Unreachable
            }
            Err(e) => {
                debug!("probe of {} failed: {}", url, e);
                Probe::Unreachable
            }
        }
    }
}
