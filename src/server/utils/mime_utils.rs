/* format table and mime inference for candidate streams */
use crate::addon::model::Stream;

pub const HLS_MIME: &str = "application/vnd.apple.mpegurl";
pub const DASH_MIME: &str = "application/dash+xml";
pub const DEFAULT_MIME: &str = "video/mp4";

/// format key -> mime, keys are lowercase and lookups lowercase the input first
const FORMAT_TABLE: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("ts", "video/mp2t"),
    ("m3u8", HLS_MIME),
    ("hls", HLS_MIME),
    ("mpd", DASH_MIME),
];

/// servers disagree on what to call an hls playlist
const MIME_ALIASES: &[(&str, &str)] = &[
    ("application/x-mpegurl", HLS_MIME),
    ("audio/mpegurl", HLS_MIME),
    ("audio/x-mpegurl", HLS_MIME),
    ("video/x-mpegurl", HLS_MIME),
    ("video/mkv", "video/x-matroska"),
];

/// headers that say nothing about what the body is
const GENERIC_MIMES: &[&str] = &["application/octet-stream", "binary/octet-stream"];

pub fn supported_formats() -> Vec<&'static str> {
    FORMAT_TABLE.iter().map(|(format, _)| *format).collect()
}

pub fn mime_for_format(format: &str) -> Option<&'static str> {
    let format = format.trim().trim_start_matches('.').to_ascii_lowercase();
    FORMAT_TABLE
        .iter()
        .find(|(key, _)| *key == format)
        .map(|(_, mime)| *mime)
}

/// drops parameters (`; charset=...`), lowercases and folds aliases into one name
pub fn normalize_mime(raw: &str) -> Option<String> {
    let essence = raw.split(';').next()?.trim().to_ascii_lowercase();
    if essence.is_empty() || !essence.contains('/') {
        return None;
    }

    let canonical = MIME_ALIASES
        .iter()
        .find(|(alias, _)| *alias == essence)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(essence);

    Some(canonical)
}

/// a type the no-format path is willing to hand out
pub fn is_playable_mime(mime: &str) -> bool {
    mime.starts_with("video/") || mime == HLS_MIME || mime == DASH_MIME
}

fn url_extension(url: &str) -> Option<String> {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // not absolute, take everything before the query/fragment
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };

    let file = path.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// what a probe (or the lack of one) tells us about a candidate
#[derive(Debug, Clone, Copy)]
pub struct MimeEvidence<'a> {
    pub url: &'a str,
    pub content_type: Option<&'a str>,
    pub declared: Option<&'a str>,
}

impl<'a> MimeEvidence<'a> {
    pub fn new(stream: &'a Stream, url: &'a str, content_type: Option<&'a str>) -> Self {
        Self {
            url,
            content_type,
            declared: stream.mime_type.as_deref(),
        }
    }
}

/// where the inferred type came from, also reported back in the json response
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MimeSource {
    ContentType,
    Declared,
    Extension,
    UrlPattern,
    Default,
}

/// tried in this order, first hit wins
pub const INFERENCE_ORDER: [MimeSource; 5] = [
    MimeSource::ContentType,
    MimeSource::Declared,
    MimeSource::Extension,
    MimeSource::UrlPattern,
    MimeSource::Default,
];

impl MimeSource {
    pub fn infer(&self, evidence: &MimeEvidence<'_>) -> Option<String> {
        match self {
            Self::ContentType => evidence
                .content_type
                .and_then(normalize_mime)
                .filter(|mime| !GENERIC_MIMES.contains(&mime.as_str())),
            Self::Declared => evidence
                .declared
                .and_then(normalize_mime)
                .filter(|mime| !GENERIC_MIMES.contains(&mime.as_str())),
            Self::Extension => url_extension(evidence.url)
                .and_then(|ext| mime_for_format(&ext))
                .map(str::to_string),
            Self::UrlPattern => {
                let url = evidence.url.to_ascii_lowercase();
                let guess = if url.contains("m3u8") {
                    HLS_MIME
                } else if url.contains(".mpd") {
                    DASH_MIME
                } else if url.contains("mp4") {
                    "video/mp4"
                } else if url.contains("mkv") {
                    "video/x-matroska"
                } else if url.contains("webm") {
                    "video/webm"
                } else {
                    return None;
                };
                Some(guess.to_string())
            }
            Self::Default => Some(DEFAULT_MIME.to_string()),
        }
    }
}

/// runs the strategies in order and returns the first answer, Default makes this total
pub fn infer_mime(evidence: &MimeEvidence<'_>) -> (String, MimeSource) {
    INFERENCE_ORDER
        .iter()
        .find_map(|source| source.infer(evidence).map(|mime| (mime, *source)))
        .unwrap_or_else(|| (DEFAULT_MIME.to_string(), MimeSource::Default))
}
