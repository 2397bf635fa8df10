use crate::media::{Episode, StreamFormat};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use url::Url;

/// The playable result of a successful resolution.
///
/// Built once by the parser that resolved it and read-only afterwards.
/// `is_segmented` marks manifest based streams (HLS), which need a different
/// offline pipeline than a single progressive file.
#[derive(Serialize, Debug, Clone)]
pub struct PlaybackMedia {
    url: Url,
    content_type: String,
    headers: FxHashMap<String, String>,
    is_segmented: bool,
    episode: Episode,
}

impl PlaybackMedia {
    /// Creates a descriptor whose format is inferred from the URL extension.
    pub fn from_url(url: Url, episode: Episode) -> Self {
        let format = StreamFormat::from_url(&url);
        Self {
            url,
            content_type: format.content_type().to_string(),
            headers: FxHashMap::default(),
            is_segmented: format.is_segmented(),
            episode,
        }
    }

    /// Overrides the inferred format, typically from a type tag in a decoded payload.
    pub fn with_format(mut self, format: StreamFormat) -> Self {
        self.content_type = format.content_type().to_string();
        self.is_segmented = format.is_segmented();
        self
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_referer<V: Into<String>>(self, referer: V) -> Self {
        self.with_header(reqwest::header::REFERER.as_str(), referer)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn headers(&self) -> &FxHashMap<String, String> {
        &self.headers
    }

    pub fn is_segmented(&self) -> bool {
        self.is_segmented
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }
}

impl fmt::Display for PlaybackMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_segmented {
            "segmented"
        } else {
            "progressive"
        };
        write!(f, "{} ({}, {})", self.url, self.content_type, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{AnimeReference, EpisodeLink};

    fn episode() -> Episode {
        let parent = AnimeReference::new(
            "Trigun",
            Url::parse("https://site.example/anime/trigun").unwrap(),
            "site",
        );
        let link = EpisodeLink::new("1", "1", "MyCloud", parent);
        Episode::new(link, Url::parse("https://host.example/e/1").unwrap())
    }

    #[test]
    fn test_media_inferred_from_extension() {
        let media = PlaybackMedia::from_url(
            Url::parse("https://cdn.example/video.m3u8").unwrap(),
            episode(),
        );
        assert!(media.is_segmented());
        assert_eq!(media.content_type(), "application/vnd.apple.mpegurl");

        let media = PlaybackMedia::from_url(
            Url::parse("https://cdn.example/video.mp4").unwrap(),
            episode(),
        )
        .with_referer("https://host.example/");
        assert!(!media.is_segmented());
        assert_eq!(
            media.headers().get("referer").map(String::as_str),
            Some("https://host.example/")
        );
    }

    #[test]
    fn test_media_type_tag_override() {
        let media = PlaybackMedia::from_url(
            Url::parse("https://cdn.example/stream?id=9").unwrap(),
            episode(),
        )
        .with_format(StreamFormat::Hls);
        assert!(media.is_segmented());
    }
}
