use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, rng};
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::deobfuscate::unpack_page;
use crate::media::PlaybackMedia;
use crate::resolver::error::ResolutionError;
use crate::resolver::parser::ResolveContext;
use crate::resolver::session::HttpRequest;

/// First capture group of `regex` in `body`.
pub(crate) fn capture<'a>(
    regex: &Regex,
    body: &'a str,
    stage: &'static str,
) -> Result<&'a str, ResolutionError> {
    regex
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ResolutionError::PatternNotFound { stage })
}

/// Resolves a URL found in markup against the page it came from.
/// Protocol-relative URLs get `https:`; escaped slashes are unescaped.
pub(crate) fn absolutize(raw: &str, base: &Url) -> Result<Url, ResolutionError> {
    let raw = raw.trim().replace("\\/", "/");
    if raw.starts_with("//") {
        return Ok(Url::parse(&format!("https:{raw}"))?);
    }
    Ok(base.join(&raw)?)
}

/// `scheme://host/` of `url`.
pub(crate) fn origin_of(url: &Url) -> String {
    format!("{}/", url.origin().ascii_serialization())
}

const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Random alphanumeric string, as the hosts' own `makeid` helpers produce.
pub(crate) fn random_token(len: usize) -> String {
    let mut rng = rng();
    (0..len)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// Milliseconds since the Unix epoch.
pub(crate) fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Where a `Referer` header value comes from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum RefererSource {
    /// The episode's referer, by default the parent anime page.
    Episode,
    /// The embed page being resolved.
    Target,
    /// Origin of the embed page.
    Origin,
    Fixed(&'static str),
}

impl RefererSource {
    pub(crate) fn value(&self, ctx: &ResolveContext) -> String {
        match self {
            RefererSource::Episode => ctx.episode.referer.clone(),
            RefererSource::Target => ctx.episode.target.to_string(),
            RefererSource::Origin => origin_of(&ctx.episode.target),
            RefererSource::Fixed(value) => value.to_string(),
        }
    }
}

/// Single page recipe: fetch the embed page, optionally unpack its packed
/// script, capture the media URL and wrap it.
pub(crate) struct PageRecipe {
    pub stage: &'static str,
    pub source: &'static LazyLock<Regex>,
    pub packed: bool,
    pub page_referer: RefererSource,
    pub media_referer: Option<RefererSource>,
}

impl PageRecipe {
    pub(crate) const fn new(stage: &'static str, source: &'static LazyLock<Regex>) -> Self {
        Self {
            stage,
            source,
            packed: false,
            page_referer: RefererSource::Episode,
            media_referer: None,
        }
    }

    pub(crate) const fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    pub(crate) const fn page_referer(mut self, referer: RefererSource) -> Self {
        self.page_referer = referer;
        self
    }

    pub(crate) const fn media_referer(mut self, referer: RefererSource) -> Self {
        self.media_referer = Some(referer);
        self
    }

    pub(crate) async fn run(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError> {
        let request =
            HttpRequest::get(ctx.episode.target.as_str()).referer(self.page_referer.value(ctx));
        let page = ctx.text(request).await?;

        let script = if self.packed {
            let unpacked = unpack_page(&page)?;
            debug!("Unpacked {} bytes of player script", unpacked.len());
            unpacked
        } else {
            page
        };

        let raw = capture(self.source, &script, self.stage)?;
        debug!("Captured {}: {}", self.stage, raw);

        let url = absolutize(raw, &ctx.episode.target)?;
        let mut media = PlaybackMedia::from_url(url, ctx.episode.clone());
        if let Some(referer) = self.media_referer {
            media = media.with_referer(referer.value(ctx));
        }
        Ok(media)
    }
}
