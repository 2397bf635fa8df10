use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;
use url::Url;

use super::common::{capture, epoch_millis, origin_of, random_token};
use crate::media::{Fitness, PlaybackMedia};
use crate::resolver::error::ResolutionError;
use crate::resolver::parser::{ResolveContext, VideoParser};
use crate::resolver::session::HttpRequest;

static PASS_MD5_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\.get\('(/pass_md5/[^']+)'").unwrap());
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?token=([^&']+)&expiry=").unwrap());

/// DoodStream: the embed page points at a `pass_md5` endpoint returning a
/// URL prefix, which the player completes with random padding, the page's
/// token and the current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dood;

impl Dood {
    /// Download pages (`/d/`) carry no player; the embed page (`/e/`) does.
    fn embed_url(target: &Url) -> Url {
        let mut embed = target.clone();
        if let Some(rest) = target.path().strip_prefix("/d/") {
            embed.set_path(&format!("/e/{rest}"));
        }
        embed
    }
}

#[async_trait]
impl VideoParser for Dood {
    fn name(&self) -> &'static str {
        "Dood"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["DoodStream"]
    }

    fn fitness(&self) -> Fitness {
        Fitness::ALL.without_remote_cast()
    }

    async fn parse(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError> {
        let embed = Self::embed_url(&ctx.episode.target);
        let page = ctx
            .text(HttpRequest::get(embed.as_str()).referer(ctx.episode.referer.as_str()))
            .await?;

        let pass_path = capture(&PASS_MD5_REGEX, &page, "Dood pass_md5 path")?;
        let token = capture(&TOKEN_REGEX, &page, "Dood token")?;
        debug!("Dood pass path {}", pass_path);

        let pass_url = embed.join(pass_path)?;
        let prefix = ctx
            .text(HttpRequest::get(pass_url.as_str()).referer(embed.as_str()))
            .await?;
        let prefix = prefix.trim();
        if prefix.is_empty() || prefix.starts_with('<') {
            return Err(ResolutionError::Decode(
                "Dood pass_md5 returned no url prefix".to_string(),
            ));
        }

        let link = format!(
            "{}{}?token={}&expiry={}",
            prefix,
            random_token(10),
            token,
            epoch_millis()
        );
        let url = Url::parse(&link)?;
        Ok(PlaybackMedia::from_url(url, ctx.episode.clone()).with_referer(origin_of(&embed)))
    }
}
