use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Transport of a resolved asset.
///
/// Only [`StreamFormat::Hls`] is segmented; every other variant is a single
/// progressive file.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamFormat {
    Hls,
    Mp4,
    Webm,
    Flv,
    Unknown,
}

impl StreamFormat {
    pub fn as_str(&self) -> &str {
        match self {
            StreamFormat::Hls => "hls",
            StreamFormat::Mp4 => "mp4",
            StreamFormat::Webm => "webm",
            StreamFormat::Flv => "flv",
            StreamFormat::Unknown => "unknown",
        }
    }

    pub fn from_extension(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "m3u8" | "m3u" => StreamFormat::Hls,
            "mp4" | "m4v" => StreamFormat::Mp4,
            "webm" => StreamFormat::Webm,
            "flv" => StreamFormat::Flv,
            _ => StreamFormat::Unknown,
        }
    }

    /// Infers the format from the last path segment of a resource URL.
    pub fn from_url(url: &url::Url) -> Self {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|file| file.rsplit_once('.'))
            .map(|(_, ext)| Self::from_extension(ext))
            .unwrap_or(StreamFormat::Unknown)
    }

    /// Maps a type tag found in a decoded JSON payload, either a short name
    /// (`"hls"`) or a MIME type (`"application/x-mpegURL"`).
    pub fn from_type_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        match tag.as_str() {
            "hls" | "m3u8" | "application/x-mpegurl" | "application/vnd.apple.mpegurl" => {
                StreamFormat::Hls
            }
            "mp4" | "video/mp4" => StreamFormat::Mp4,
            "webm" | "video/webm" => StreamFormat::Webm,
            "flv" | "video/x-flv" => StreamFormat::Flv,
            _ => StreamFormat::Unknown,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            StreamFormat::Hls => "application/vnd.apple.mpegurl",
            StreamFormat::Mp4 => "video/mp4",
            StreamFormat::Webm => "video/webm",
            StreamFormat::Flv => "video/x-flv",
            // most hosts serve an mp4 behind an extension-less redirect
            StreamFormat::Unknown => "video/mp4",
        }
    }

    pub fn is_segmented(&self) -> bool {
        matches!(self, StreamFormat::Hls)
    }
}

impl Display for StreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StreamFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hls" => Ok(StreamFormat::Hls),
            "mp4" => Ok(StreamFormat::Mp4),
            "webm" => Ok(StreamFormat::Webm),
            "flv" => Ok(StreamFormat::Flv),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_format_from_url() {
        let url = Url::parse("https://cdn.example/hls/master.M3U8?token=1").unwrap();
        assert_eq!(StreamFormat::from_url(&url), StreamFormat::Hls);

        let url = Url::parse("https://cdn.example/get_video?id=42").unwrap();
        assert_eq!(StreamFormat::from_url(&url), StreamFormat::Unknown);
        assert_eq!(StreamFormat::Unknown.content_type(), "video/mp4");
    }

    #[test]
    fn test_format_from_type_tag() {
        assert_eq!(
            StreamFormat::from_type_tag("application/x-mpegURL"),
            StreamFormat::Hls
        );
        assert_eq!(StreamFormat::from_type_tag(" video/mp4 "), StreamFormat::Mp4);
        assert!(!StreamFormat::from_type_tag("dash").is_segmented());
    }
}
