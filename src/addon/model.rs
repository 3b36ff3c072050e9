use serde::{Deserialize, Serialize};

/// the addon descriptor, only the three fields below are ever read. Everything else the addon
/// puts in there (catalogs, resources, types...) is ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Manifest {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown addon")
    }
}

/// one entry of the `streams` array, the addon is free to leave out anything so every field is
/// optional. A stream without a url is kept around for counting but can never be picked
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl Stream {
    /// first line of the title, falling back to the name. Addons like to put seeders, sizes
    /// and emoji on the following lines
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .and_then(|t| t.lines().map(str::trim).find(|l| !l.is_empty()))
            .or_else(|| self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()))
            .unwrap_or("Unknown")
    }

    pub fn playable_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// body of `/stream/{type}/{id}.json`, a missing `streams` key is treated the same as an empty one
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamsResponse {
    #[serde(default)]
    pub streams: Option<Vec<Stream>>,
}

/// what the caller asked for, knows how to turn itself into the addon path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRequest {
    Movie {
        imdb: String,
    },
    Episode {
        imdb: String,
        season: u32,
        episode: u32,
    },
}

impl MediaRequest {
    pub fn stream_path(&self) -> String {
        match self {
            Self::Movie { imdb } => format!("stream/movie/{}.json", imdb),
            Self::Episode {
                imdb,
                season,
                episode,
            } => format!("stream/series/{}:{}:{}.json", imdb, season, episode),
        }
    }

    pub fn imdb(&self) -> &str {
        match self {
            Self::Movie { imdb } | Self::Episode { imdb, .. } => imdb,
        }
    }
}

impl std::fmt::Display for MediaRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie { imdb } => write!(f, "movie {}", imdb),
            Self::Episode {
                imdb,
                season,
                episode,
            } => write!(f, "{} S{:02}E{:02}", imdb, season, episode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_addon_paths() {
        let movie = MediaRequest::Movie {
            imdb: "tt0111161".into(),
        };
        assert_eq!(movie.stream_path(), "stream/movie/tt0111161.json");

        let episode = MediaRequest::Episode {
            imdb: "tt0903747".into(),
            season: 1,
            episode: 2,
        };
        assert_eq!(episode.stream_path(), "stream/series/tt0903747:1:2.json");
    }

    #[test]
    fn display_name_skips_blank_title_lines() {
        let stream = Stream {
            title: Some("\n  Big Movie 1080p\n👤 42".into()),
            ..Default::default()
        };
        assert_eq!(stream.display_name(), "Big Movie 1080p");

        let named = Stream {
            name: Some("Addon\n4k".into()),
            ..Default::default()
        };
        assert_eq!(named.display_name(), "Addon\n4k");

        assert_eq!(Stream::default().display_name(), "Unknown");
    }

    #[test]
    fn missing_streams_key_deserializes() {
        let body: StreamsResponse = serde_json::from_str("{}").unwrap();
        assert!(body.streams.is_none());

        let raw = r#"{"streams":[{"url":"http://a/b","mimeType":"video/mp4","behaviorHints":{}}]}"#;
        let body: StreamsResponse = serde_json::from_str(raw).unwrap();
        let streams = body.streams.unwrap();
        assert_eq!(streams[0].mime_type.as_deref(), Some("video/mp4"));
    }
}
