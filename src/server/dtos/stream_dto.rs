use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::addon::{MediaRequest, Stream};
use crate::config::ResponseMode;
use crate::server::error::{AppResult, Error};
use crate::server::utils::mime_utils::MimeSource;

pub static IMDB_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tt\d+$").expect("imdb regex should compile"));

pub static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("numeric regex should compile"));

#[derive(Debug, Deserialize, Validate)]
pub struct MoviePath {
    #[validate(regex(
        path = *IMDB_ID_RE,
        message = "Invalid IMDb ID format, expected something like tt1234567"
    ))]
    pub imdb: String,
}

impl MoviePath {
    pub fn into_media(self) -> MediaRequest {
        MediaRequest::Movie { imdb: self.imdb }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct EpisodePath {
    #[validate(regex(
        path = *IMDB_ID_RE,
        message = "Invalid IMDb ID format, expected something like tt1234567"
    ))]
    pub imdb: String,
    #[validate(regex(path = *NUMERIC_RE, message = "Season must be a number"))]
    pub season: String,
    #[validate(regex(path = *NUMERIC_RE, message = "Episode must be a number"))]
    pub episode: String,
}

impl EpisodePath {
    /// digits only at this point, so the only way parsing fails is overflow
    pub fn into_media(self) -> AppResult<MediaRequest> {
        let season = self
            .season
            .parse()
            .map_err(|_| Error::InvalidPath("Season is out of range".to_string()))?;
        let episode = self
            .episode
            .parse()
            .map_err(|_| Error::InvalidPath("Episode is out of range".to_string()))?;

        Ok(MediaRequest::Episode {
            imdb: self.imdb,
            season,
            episode,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    pub format: Option<String>,
    pub mode: Option<String>,
}

impl StreamQuery {
    /// ?mode= beats the configured default, parsed by hand so a typo gets a json 400
    pub fn response_mode(&self, default: ResponseMode) -> AppResult<ResponseMode> {
        let Some(raw) = self.mode.as_deref().map(str::trim).filter(|m| !m.is_empty()) else {
            return Ok(default);
        };

        match raw.to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseMode::Json),
            "redirect" => Ok(ResponseMode::Redirect),
            "player" | "html" => Ok(ResponseMode::Player),
            "playlist" | "m3u8" => Ok(ResponseMode::Playlist),
            _ => Err(Error::BadRequest(format!(
                "Unknown mode '{}', expected one of json, redirect, player, playlist",
                raw
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResponse {
    pub media: String,
    pub url: String,
    pub detected_type: String,
    pub detected_by: MimeSource,
    pub candidate_index: usize,
    pub total_streams: usize,
    pub stream: Stream,
}
