//! Hosts that shut down. They stay registered so that episode links saved
//! while they were alive still find a parser, but nothing recommends them.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use super::common::{PageRecipe, capture, origin_of};
use crate::media::{Fitness, PlaybackMedia};
use crate::resolver::error::ResolutionError;
use crate::resolver::parser::{ResolveContext, VideoParser};

static RAPIDVIDEO_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<source\s+src="([^"]+)"\s+type="video/mp4""#).unwrap());
static OPENLOAD_STREAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<p\s+[^>]*id="(?:streamurl|streamurj|streamuri)"[^>]*>([^<]+)</p>"#).unwrap());
static VERYSTREAM_STREAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id="videolink"[^>]*>([^<]+)<"#).unwrap());

page_parser! {
    RapidVideo {
        name: "RapidVideo",
        aliases: ["rapid"],
        fitness: Fitness::DISABLED,
        recipe: PageRecipe::new("RapidVideo source", &RAPIDVIDEO_SOURCE),
    }
}

/// The player page only carries a stream id; the player fetched
/// `/stream/{id}?mime=true` on the embed host, which redirected to the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Openload;

impl Openload {
    fn stream_url(target: &Url, id: &str) -> Result<Url, ResolutionError> {
        let origin = Url::parse(&origin_of(target))?;
        Ok(origin.join(&format!("stream/{}?mime=true", id.trim()))?)
    }
}

#[async_trait]
impl VideoParser for Openload {
    fn name(&self) -> &'static str {
        "Openload"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["oload"]
    }

    fn fitness(&self) -> Fitness {
        Fitness::DISABLED
    }

    async fn parse(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError> {
        let page = ctx.fetch_target().await?;
        let id = capture(&OPENLOAD_STREAM, &page, "Openload stream id")?;
        let url = Self::stream_url(&ctx.episode.target, id)?;

        Ok(PlaybackMedia::from_url(url, ctx.episode.clone())
            .with_referer(ctx.episode.target.as_str()))
    }
}

page_parser! {
    VeryStream {
        name: "VeryStream",
        aliases: [],
        fitness: Fitness::DISABLED,
        recipe: PageRecipe::new("VeryStream video link", &VERYSTREAM_STREAM),
    }
}
