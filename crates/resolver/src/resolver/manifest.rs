//! Inspection of resolved HLS manifests.
//!
//! Tells a caller what a segmented [`PlaybackMedia`] actually is before it
//! commits to a purpose: the variants of a master playlist, or the length and
//! liveness of a media playlist.

use m3u8_rs::{KeyMethod, MasterPlaylist, MediaPlaylist, MediaPlaylistType, Playlist};
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::error::ResolutionError;
use super::session::{HttpRequest, Session};
use crate::media::PlaybackMedia;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    Master,
    Media,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Variant {
    pub url: Url,
    pub bandwidth: u64,
    pub resolution: Option<(u64, u64)>,
    pub codecs: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ManifestSummary {
    pub url: Url,
    pub kind: ManifestKind,
    /// Master playlists only, best bandwidth first.
    pub variants: Vec<Variant>,
    pub segment_count: usize,
    /// Seconds; 0 for master playlists.
    pub total_duration: f64,
    /// `#EXT-X-ENDLIST` or `#EXT-X-PLAYLIST-TYPE:VOD`.
    pub is_vod: bool,
    /// At least one segment carries an `#EXT-X-KEY` other than `NONE`.
    pub is_encrypted: bool,
}

impl ManifestSummary {
    /// Live and event playlists have no fixed end to download.
    pub fn is_downloadable(&self) -> bool {
        match self.kind {
            ManifestKind::Master => !self.variants.is_empty(),
            ManifestKind::Media => self.is_vod,
        }
    }

    pub fn best_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }
}

/// Parses a manifest body fetched from `base_url`.
pub fn summarize(bytes: &[u8], base_url: &Url) -> Result<ManifestSummary, ResolutionError> {
    let playlist = m3u8_rs::parse_playlist_res(bytes)
        .map_err(|e| ResolutionError::Decode(format!("hls playlist: {e}")))?;

    Ok(match playlist {
        Playlist::MasterPlaylist(pl) => summarize_master(pl, base_url),
        Playlist::MediaPlaylist(pl) => summarize_media(pl, base_url),
    })
}

fn summarize_master(playlist: MasterPlaylist, base_url: &Url) -> ManifestSummary {
    let mut variants: Vec<Variant> = playlist
        .variants
        .into_iter()
        .filter(|variant| !variant.is_i_frame)
        .filter_map(|variant| {
            let url = match base_url.join(&variant.uri) {
                Ok(url) => url,
                Err(e) => {
                    debug!("Skipping variant {}: {}", variant.uri, e);
                    return None;
                }
            };
            Some(Variant {
                url,
                bandwidth: variant.bandwidth,
                resolution: variant.resolution.map(|r| (r.width, r.height)),
                codecs: variant.codecs,
            })
        })
        .collect();
    variants.sort_by(|a, b| b.bandwidth.cmp(&a.bandwidth));

    ManifestSummary {
        url: base_url.clone(),
        kind: ManifestKind::Master,
        variants,
        segment_count: 0,
        total_duration: 0.0,
        is_vod: false,
        is_encrypted: false,
    }
}

fn summarize_media(playlist: MediaPlaylist, base_url: &Url) -> ManifestSummary {
    let total_duration = playlist
        .segments
        .iter()
        .map(|segment| segment.duration as f64)
        .sum();
    let is_encrypted = playlist.segments.iter().any(|segment| {
        segment
            .key
            .as_ref()
            .is_some_and(|key| !matches!(key.method, KeyMethod::None))
    });
    let is_vod =
        playlist.end_list || matches!(playlist.playlist_type, Some(MediaPlaylistType::Vod));

    ManifestSummary {
        url: base_url.clone(),
        kind: ManifestKind::Media,
        variants: Vec::new(),
        segment_count: playlist.segments.len(),
        total_duration,
        is_vod,
        is_encrypted,
    }
}

/// Fetches the manifest of `media` with the headers its host requires.
pub async fn inspect(
    session: &dyn Session,
    media: &PlaybackMedia,
) -> Result<ManifestSummary, ResolutionError> {
    if !media.is_segmented() {
        return Err(ResolutionError::Other(format!(
            "{} is a progressive file, not a manifest",
            media.url()
        )));
    }

    let mut request = HttpRequest::get(media.url().as_str());
    for (key, value) in media.headers() {
        request = request.header(key.as_str(), value.as_str());
    }

    let response = session.execute(request).await?;
    if !response.is_success() {
        return Err(ResolutionError::Status {
            url: media.url().to_string(),
            status: response.status,
        });
    }

    // relative entries resolve against the final url after redirects
    let base = Url::parse(&response.url).unwrap_or_else(|_| media.url().clone());
    summarize(response.bytes(), &base)
}
