use once_cell::sync::Lazy;
use regex::Regex;

use crate::addon::model::Stream;

static QUALITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{3,4}p|4k)\b").expect("quality regex should compile"));

static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+\.\d+)\s?GB\b").expect("size regex should compile"));

const DEFAULT_BANDWIDTH: u64 = 5_000_000;

/// bandwidth guess and resolution per quality tier, the addon never tells us the real numbers
fn tier(quality: &str) -> Option<(u64, &'static str)> {
    match quality {
        "2160p" | "4k" => Some((20_000_000, "3840x2160")),
        "1080p" => Some((8_000_000, "1920x1080")),
        "720p" => Some((5_000_000, "1280x720")),
        "480p" => Some((2_500_000, "854x480")),
        _ => None,
    }
}

/// quality and size tokens pulled out of the stream title (and name, some addons put the
/// resolution there instead)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamLabel {
    pub quality: Option<String>,
    pub size: Option<String>,
}

impl StreamLabel {
    pub fn parse(stream: &Stream) -> Self {
        let haystack = format!(
            "{} {}",
            stream.title.as_deref().unwrap_or(""),
            stream.name.as_deref().unwrap_or("")
        );

        let quality = QUALITY_RE
            .captures(&haystack)
            .map(|c| c[1].to_ascii_lowercase());
        let size = SIZE_RE.captures(&haystack).map(|c| format!("{}GB", &c[1]));

        Self { quality, size }
    }

    pub fn bandwidth(&self) -> u64 {
        self.quality
            .as_deref()
            .and_then(tier)
            .map(|(bandwidth, _)| bandwidth)
            .unwrap_or(DEFAULT_BANDWIDTH)
    }

    pub fn resolution(&self) -> Option<&'static str> {
        self.quality.as_deref().and_then(tier).map(|(_, res)| res)
    }

    /// tokens the display name doesn't already show, as ` [1080p 2.1GB]`
    fn suffix(&self, name: &str) -> String {
        let lowered = name.to_ascii_lowercase();
        let missing: Vec<&str> = [self.quality.as_deref(), self.size.as_deref()]
            .into_iter()
            .flatten()
            .filter(|token| !lowered.contains(&token.to_ascii_lowercase()))
            .collect();

        if missing.is_empty() {
            String::new()
        } else {
            format!(" [{}]", missing.join(" "))
        }
    }
}

// quotes would end the attribute early and newlines would end the tag
fn attribute_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '"' => '\'',
            '\r' | '\n' => ' ',
            c => c,
        })
        .collect()
}

/// builds the m3u8 document, streams without a url are skipped. Output only depends on the input
/// order so the same listing always gives the same bytes
pub fn build_playlist(streams: &[Stream]) -> String {
    let mut lines = vec!["#EXTM3U".to_string(), "#EXT-X-VERSION:3".to_string()];

    for stream in streams {
        let Some(url) = stream.playable_url() else {
            continue;
        };

        let label = StreamLabel::parse(stream);
        let name = attribute_safe(stream.display_name());

        let mut stream_inf = format!("#EXT-X-STREAM-INF:BANDWIDTH={}", label.bandwidth());
        if let Some(resolution) = label.resolution() {
            stream_inf.push_str(&format!(",RESOLUTION={}", resolution));
        }
        stream_inf.push_str(&format!(",NAME=\"{}\"", name));

        lines.push(stream_inf);
        lines.push(format!("#EXTINF:-1,{}{}", name, label.suffix(&name)));
        lines.push(url.to_string());
    }

    let mut playlist = lines.join("\n");
    playlist.push('\n');
    playlist
}
