use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::media::PlaybackMedia;
use crate::resolver::error::ResolutionError;
use crate::resolver::parser::{ResolveContext, VideoParser};

/// The link is split in two literals; the second one carries a junk prefix
/// that the page strips with `substring(n)`.
static ROBOTLINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"document\.getElementById\('robotlink'\)\.innerHTML\s*=\s*'([^']+)'\s*\+\s*\('([^']+)'\)\.substring\((\d+)\)").unwrap()
});

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamTape;

impl StreamTape {
    fn assemble(prefix: &str, tail: &str, skip: usize) -> Result<Url, ResolutionError> {
        let tail: String = tail.chars().skip(skip).collect();
        let link = format!("https:{prefix}{tail}");
        Ok(Url::parse(&link)?)
    }
}

#[async_trait]
impl VideoParser for StreamTape {
    fn name(&self) -> &'static str {
        "StreamTape"
    }

    async fn parse(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError> {
        let page = ctx.fetch_target().await?;

        let Some(caps) = ROBOTLINK_REGEX.captures(&page) else {
            if page.contains("converting") {
                return Err(ResolutionError::ProcessingPending(
                    "StreamTape is still converting this video".to_string(),
                ));
            }
            return Err(ResolutionError::PatternNotFound {
                stage: "StreamTape robotlink",
            });
        };

        let skip = caps[3]
            .parse::<usize>()
            .map_err(|e| ResolutionError::Decode(format!("robotlink offset: {e}")))?;
        debug!("StreamTape robotlink offset {}", skip);

        let url = Self::assemble(&caps[1], &caps[2], skip)?;
        Ok(PlaybackMedia::from_url(url, ctx.episode.clone()))
    }
}
