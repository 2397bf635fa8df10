use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::common::absolutize;
use crate::deobfuscate::decode_reordered;
use crate::media::PlaybackMedia;
use crate::resolver::error::ResolutionError;
use crate::resolver::parser::{ResolveContext, VideoParser};

static SOURCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"srces\.push\(\s*\{\s*type:\s*"video/mp4",\s*src:\s*d\('([^']+)',\s*(\d+)\)"#)
        .unwrap()
});

/// Streamango and its clones mask the source with a reordered-alphabet
/// encoding keyed by a number printed next to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Streamango;

#[async_trait]
impl VideoParser for Streamango {
    fn name(&self) -> &'static str {
        "Streamango"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["Fruitstreams"]
    }

    async fn parse(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError> {
        let page = ctx.fetch_target().await?;
        let caps = SOURCE_REGEX
            .captures(&page)
            .ok_or(ResolutionError::PatternNotFound {
                stage: "Streamango masked source",
            })?;

        let key = caps[2]
            .parse::<u32>()
            .map_err(|e| ResolutionError::Decode(format!("Streamango key: {e}")))?;
        let decoded = decode_reordered(&caps[1], key);
        debug!("Streamango source decoded to {}", decoded);

        let url = absolutize(&decoded, &ctx.episode.target)?;
        Ok(PlaybackMedia::from_url(url, ctx.episode.clone()))
    }
}
