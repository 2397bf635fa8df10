//! Hosts that ship the player configuration as an encoded JSON blob.

use std::sync::LazyLock;

use async_trait::async_trait;
use base64::{Engine, prelude::BASE64_STANDARD};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::common::{absolutize, capture};
use crate::deobfuscate::{peel, xor_decode};
use crate::media::{PlaybackMedia, StreamFormat};
use crate::resolver::error::ResolutionError;
use crate::resolver::parser::{ResolveContext, VideoParser};

static PINKBIRD_SOURCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"var\s+sources\s*=\s*"([A-Za-z0-9+/=]+)""#).unwrap());
static MAVERICK_PAYLOAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-payload\s*=\s*"([A-Za-z0-9+/=]+)""#).unwrap());
static MAVERICK_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-key\s*=\s*"([^"]+)""#).unwrap());

/// A decoded `{file|src, type}` player entry.
#[derive(Debug, Deserialize)]
struct EncodedSource {
    #[serde(alias = "src")]
    file: String,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct PinkBirdSources {
    data: Vec<EncodedSource>,
}

fn media_from_source(
    source: &EncodedSource,
    ctx: &ResolveContext,
) -> Result<PlaybackMedia, ResolutionError> {
    let url = absolutize(&source.file, &ctx.episode.target)?;
    let media = PlaybackMedia::from_url(url, ctx.episode.clone());
    Ok(match StreamFormat::from_type_tag(&source.kind) {
        StreamFormat::Unknown => media,
        format => media.with_format(format),
    })
}

/// Sources are base64 wrapped several times over a JSON list.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinkBird;

#[async_trait]
impl VideoParser for PinkBird {
    fn name(&self) -> &'static str {
        "PinkBird"
    }

    async fn parse(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError> {
        let page = ctx.fetch_target().await?;
        let encoded = capture(&PINKBIRD_SOURCES, &page, "PinkBird sources")?;

        let json = peel(encoded);
        let sources: PinkBirdSources = serde_json::from_str(&json)?;
        let source = sources
            .data
            .first()
            .ok_or_else(|| ResolutionError::Decode("PinkBird returned no sources".to_string()))?;
        debug!("PinkBird source type {}", source.kind);

        media_from_source(source, ctx)
    }
}

/// The player config is XORed with a per-page key and base64 encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Maverick;

impl Maverick {
    fn decode(payload: &str, key: &str) -> Result<EncodedSource, ResolutionError> {
        let bytes = BASE64_STANDARD.decode(payload)?;
        let plain = String::from_utf8(xor_decode(&bytes, key.as_bytes()))?;
        Ok(serde_json::from_str(&plain)?)
    }
}

#[async_trait]
impl VideoParser for Maverick {
    fn name(&self) -> &'static str {
        "Maverick"
    }

    async fn parse(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError> {
        let page = ctx.fetch_target().await?;
        let payload = capture(&MAVERICK_PAYLOAD, &page, "Maverick payload")?;
        let key = capture(&MAVERICK_KEY, &page, "Maverick key")?;

        let source = Self::decode(payload, key)?;
        media_from_source(&source, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_session::{MockSession, resolve_with};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_pinkbird_peels_sources() {
        let json = r#"{"data":[{"file":"https://pb-cdn.example/hls/ep3/index","type":"hls"}]}"#;
        let wrapped = BASE64_STANDARD.encode(BASE64_STANDARD.encode(json));
        let page = format!("<script>var sources = \"{wrapped}\";</script>");
        let session = Arc::new(MockSession::new().route("pinkbird.example", 200, &page));

        let media = resolve_with(PinkBird, session, "https://pinkbird.example/embed/ep3")
            .await
            .unwrap();
        assert_eq!(media.url().as_str(), "https://pb-cdn.example/hls/ep3/index");
        // extension-less url, segmented because of the type tag
        assert!(media.is_segmented());
    }

    #[tokio::test]
    async fn test_maverick_xor_payload() {
        let config = r#"{"src":"https://mav.example/files/ep1.mp4","type":"video/mp4"}"#;
        let payload = BASE64_STANDARD.encode(xor_decode(config.as_bytes(), b"k3y"));
        let page = format!(r#"<div id="player" data-payload="{payload}" data-key="k3y"></div>"#);
        let session = Arc::new(MockSession::new().route("maverick.example", 200, &page));

        let media = resolve_with(Maverick, session, "https://maverick.example/watch/ep1")
            .await
            .unwrap();
        assert_eq!(media.url().as_str(), "https://mav.example/files/ep1.mp4");
        assert!(!media.is_segmented());
    }

    #[test]
    fn test_maverick_wrong_key_is_decode_error() {
        let config = r#"{"src":"https://mav.example/a.mp4"}"#;
        let payload = BASE64_STANDARD.encode(xor_decode(config.as_bytes(), b"right"));
        assert!(matches!(
            Maverick::decode(&payload, "wrong"),
            Err(ResolutionError::Decode(_))
        ));
    }
}
