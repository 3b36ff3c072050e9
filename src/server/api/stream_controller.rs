use std::io::Write;

use axum::{
    Json, Router,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use flate2::{Compression, write::GzEncoder};
use tracing::{debug, error, info};

use crate::{
    addon::{ConfiguredAddon, MediaRequest, Stream},
    config::ResponseMode,
    server::{
        dtos::stream_dto::{EpisodePath, MoviePath, StreamQuery, StreamResponse},
        error::{AppResult, Error},
        extractors::{Configured, ValidatedPath, ValidatedQuery},
        services::{
            proxy_services::ProxyServices,
            selection_services::{FormatFilter, Selection},
        },
        utils::{
            mime_utils::supported_formats, player_utils::render_player,
            playlist_utils::build_playlist,
        },
    },
};

/// Supported compression encodings for playlist bodies
#[derive(Debug, Clone, Copy, PartialEq)]
enum ContentEncoding {
    Zstd,
    Gzip,
    None,
}

impl ContentEncoding {
    /// apple players send "gzip, deflate" or "identity", identity always wins
    fn from_accept_encoding(accept_encoding: Option<&str>) -> Self {
        match accept_encoding {
            Some(v) => {
                if v == "identity" || v.starts_with("identity,") {
                    return Self::None;
                }
                if v.contains("zstd") {
                    Self::Zstd
                } else if v.contains("gzip") {
                    Self::Gzip
                } else {
                    Self::None
                }
            }
            None => Self::None,
        }
    }

    fn as_header_value(&self) -> Option<HeaderValue> {
        match self {
            Self::Zstd => Some(HeaderValue::from_static("zstd")),
            Self::Gzip => Some(HeaderValue::from_static("gzip")),
            Self::None => None,
        }
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
        match self {
            Self::Zstd => zstd::encode_all(data, 3),
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::None => Ok(data.to_vec()),
        }
    }
}

pub struct StreamController;

impl StreamController {
    pub fn app() -> Router {
        Router::new()
            .route("/movie/{imdb}", get(Self::movie_stream))
            .route("/tv/{imdb}/{season}/{episode}", get(Self::episode_stream))
    }

    async fn movie_stream(
        Configured(addon, services): Configured,
        ValidatedPath(path): ValidatedPath<MoviePath>,
        ValidatedQuery(query): ValidatedQuery<StreamQuery>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        Self::respond(&addon, &services, path.into_media(), &query, &headers).await
    }

    async fn episode_stream(
        Configured(addon, services): Configured,
        ValidatedPath(path): ValidatedPath<EpisodePath>,
        ValidatedQuery(query): ValidatedQuery<StreamQuery>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let media = path.into_media()?;
        Self::respond(&addon, &services, media, &query, &headers).await
    }

    /// shared by both routes: fetch, pick, then shape the answer for the requested mode
    async fn respond(
        addon: &ConfiguredAddon,
        services: &ProxyServices,
        media: MediaRequest,
        query: &StreamQuery,
        headers: &HeaderMap,
    ) -> AppResult<Response> {
        // both of these are caller mistakes, no point bothering the addon first
        let mode = query.response_mode(services.config.response_mode)?;
        let filter = FormatFilter::parse(query.format.as_deref())?;

        let streams = addon.client.fetch_streams(&media).await?;
        let total = streams.len();

        let candidates: Vec<Stream> = streams
            .into_iter()
            .filter(|s| s.playable_url().is_some())
            .collect();

        if candidates.is_empty() {
            info!("addon has nothing playable for {} ({} entries)", media, total);
            return Err(Error::NoStreamsFound);
        }

        // an unfiltered playlist is pure text, every candidate goes in without probing
        if mode == ResponseMode::Playlist && filter.is_any() {
            debug!("building playlist of {} streams for {}", candidates.len(), media);
            return Self::build_m3u8_response(&build_playlist(&candidates), headers);
        }

        let selection = services
            .selector
            .select(&candidates, &filter)
            .await
            .ok_or_else(|| Error::NoMatchingStream {
                requested: filter.requested(),
                supported: supported_formats(),
                total,
            })?;

        Self::render(mode, &media, selection, total, headers)
    }

    fn render(
        mode: ResponseMode,
        media: &MediaRequest,
        selection: Selection,
        total: usize,
        headers: &HeaderMap,
    ) -> AppResult<Response> {
        match mode {
            ResponseMode::Json => Ok(Json(StreamResponse {
                media: media.to_string(),
                url: selection.url,
                detected_type: selection.mime,
                detected_by: selection.source,
                candidate_index: selection.index,
                total_streams: total,
                stream: selection.stream,
            })
            .into_response()),
            ResponseMode::Redirect => {
                let location = HeaderValue::try_from(selection.url.as_str()).map_err(|e| {
                    error!("stream url can't be used as a location: {}", e);
                    Error::InternalServerErrorWithContext(
                        "Stream url is not a valid header value".to_string(),
                    )
                })?;
                Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
            }
            ResponseMode::Player => {
                let title = format!("{} - {}", selection.stream.display_name(), media);
                Ok(Html(render_player(&title, &selection.url, &selection.mime)).into_response())
            }
            ResponseMode::Playlist => Self::build_m3u8_response(
                &build_playlist(std::slice::from_ref(&selection.stream)),
                headers,
            ),
        }
    }

    /// build m3u8 response with proper headers and optional compression
    fn build_m3u8_response(playlist: &str, headers: &HeaderMap) -> AppResult<Response> {
        let encoding = ContentEncoding::from_accept_encoding(
            headers
                .get(header::ACCEPT_ENCODING)
                .and_then(|v| v.to_str().ok()),
        );

        let mut response_headers = HeaderMap::new();
        response_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/vnd.apple.mpegurl"),
        );
        response_headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let body = encoding.compress(playlist.as_bytes()).map_err(|e| {
            error!("Failed to compress playlist with {:?}: {}", encoding, e);
            Error::InternalServerErrorWithContext("Failed to compress response".to_string())
        })?;

        if let Some(value) = encoding.as_header_value() {
            debug!(
                "Compressed playlist with {:?} from {} to {} bytes",
                encoding,
                playlist.len(),
                body.len()
            );
            response_headers.insert(header::CONTENT_ENCODING, value);
        }

        response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

        Ok((StatusCode::OK, response_headers, body).into_response())
    }
}
