use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::common::capture;
use crate::deobfuscate::peel;
use crate::media::{Fitness, PlaybackMedia};
use crate::resolver::error::ResolutionError;
use crate::resolver::parser::{ResolveContext, VideoParser};
use crate::resolver::session::HttpRequest;

static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:data-id|slug)\s*[=:]\s*["']([A-Za-z0-9_-]+)["']"#).unwrap());

const PING_ENDPOINT: &str = "https://ping.iamcdn.net/";
const HYDRAX_REFERER: &str = "https://hydrax.net/";

/// Current answer of the ping endpoint: a (possibly base64 wrapped) host
/// plus the quality tiers it serves.
#[derive(Debug, Deserialize)]
struct TieredResponse {
    status: bool,
    url: String,
    sources: Vec<String>,
}

/// Older answer: a single (possibly base64 wrapped) location.
#[derive(Debug, Deserialize)]
struct LegacyResponse {
    status: bool,
    sources: String,
}

#[derive(Debug, PartialEq)]
enum PingAnswer {
    Tiered { host: String, tiers: Vec<String> },
    Legacy { location: String },
}

/// Tiers from best to worst with the subdomain prefix each one is served from.
const TIERS: &[(&str, &str)] = &[("fullHd", "whw."), ("hd", "www."), ("sd", "")];

#[derive(Debug, Clone, Copy, Default)]
pub struct Hydrax;

impl Hydrax {
    fn slug(ctx: &ResolveContext, page: Option<&str>) -> Result<String, ResolutionError> {
        if let Some((_, slug)) = ctx.episode.target.query_pairs().find(|(k, _)| k == "v") {
            return Ok(slug.into_owned());
        }
        let page = page.ok_or(ResolutionError::PatternNotFound {
            stage: "Hydrax slug",
        })?;
        Ok(capture(&SLUG_REGEX, page, "Hydrax slug")?.to_string())
    }

    /// Decodes the ping body, newest shape first.
    fn decode_answer(body: &[u8]) -> Result<PingAnswer, ResolutionError> {
        if let Ok(tiered) = serde_json::from_slice::<TieredResponse>(body) {
            if !tiered.status {
                return Err(ResolutionError::Decode("Hydrax refused the slug".to_string()));
            }
            return Ok(PingAnswer::Tiered {
                host: peel(&tiered.url),
                tiers: tiered.sources,
            });
        }

        match serde_json::from_slice::<LegacyResponse>(body) {
            Ok(legacy) if legacy.status => Ok(PingAnswer::Legacy {
                location: peel(&legacy.sources),
            }),
            Ok(_) => Err(ResolutionError::Decode("Hydrax refused the slug".to_string())),
            Err(e) => Err(ResolutionError::Decode(format!(
                "Hydrax answer matches neither known shape: {e}"
            ))),
        }
    }

    fn media_url(answer: PingAnswer) -> Result<Url, ResolutionError> {
        match answer {
            PingAnswer::Tiered { host, tiers } => {
                let prefix = TIERS
                    .iter()
                    .find(|(tier, _)| tiers.iter().any(|t| t == tier))
                    .map(|(_, prefix)| *prefix)
                    .ok_or_else(|| {
                        ResolutionError::Decode(format!("Hydrax offers no known tier: {tiers:?}"))
                    })?;
                let host = host
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .trim_start_matches("//");
                Ok(Url::parse(&format!("https://{prefix}{host}"))?)
            }
            PingAnswer::Legacy { location } => {
                let location = location.trim_start_matches("//");
                if location.starts_with("http") {
                    Ok(Url::parse(location)?)
                } else {
                    Ok(Url::parse(&format!("https://{location}"))?)
                }
            }
        }
    }
}

#[async_trait]
impl VideoParser for Hydrax {
    fn name(&self) -> &'static str {
        "Hydrax"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["iamcdn"]
    }

    fn fitness(&self) -> Fitness {
        Fitness::ALL.without_remote_cast()
    }

    async fn parse(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError> {
        let slug = match Self::slug(ctx, None) {
            Ok(slug) => slug,
            Err(_) => {
                let page = ctx.fetch_target().await?;
                Self::slug(ctx, Some(&page))?
            }
        };
        debug!("Hydrax slug {}", slug);

        let response = ctx
            .send(
                HttpRequest::post(PING_ENDPOINT)
                    .referer(HYDRAX_REFERER)
                    .header("origin", HYDRAX_REFERER.trim_end_matches('/'))
                    .form(&[("slug", slug.as_str())]),
            )
            .await?;

        let answer = Self::decode_answer(response.bytes())?;
        debug!("Hydrax answer {:?}", answer);

        let url = Self::media_url(answer)?;
        Ok(PlaybackMedia::from_url(url, ctx.episode.clone()).with_referer(HYDRAX_REFERER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_session::{MockSession, resolve_with};
    use base64::{Engine, prelude::BASE64_STANDARD};
    use std::sync::Arc;

    #[test]
    fn test_tiered_shape_prefers_full_hd() {
        let host = BASE64_STANDARD.encode("cdn7.iamcdn.example/video/abc");
        let body = format!(r#"{{"status":true,"url":"{host}","sources":["sd","hd","fullHd"]}}"#);

        let answer = Hydrax::decode_answer(body.as_bytes()).unwrap();
        let url = Hydrax::media_url(answer).unwrap();
        assert_eq!(url.as_str(), "https://whw.cdn7.iamcdn.example/video/abc");
    }

    #[test]
    fn test_tiered_shape_falls_back_to_sd() {
        let body = r#"{"status":true,"url":"cdn7.iamcdn.example/v","sources":["sd"]}"#;
        let url = Hydrax::media_url(Hydrax::decode_answer(body.as_bytes()).unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://cdn7.iamcdn.example/v");
    }

    #[test]
    fn test_legacy_shape() {
        let location = BASE64_STANDARD.encode(BASE64_STANDARD.encode("//legacy.iamcdn.example/v/abc"));
        let body = format!(r#"{{"status":true,"sources":"{location}"}}"#);

        let answer = Hydrax::decode_answer(body.as_bytes()).unwrap();
        assert_eq!(
            answer,
            PingAnswer::Legacy {
                location: "//legacy.iamcdn.example/v/abc".to_string()
            }
        );
        assert_eq!(
            Hydrax::media_url(answer).unwrap().as_str(),
            "https://legacy.iamcdn.example/v/abc"
        );
    }

    #[test]
    fn test_unknown_shape_is_descriptive() {
        let err = Hydrax::decode_answer(br#"{"status":true,"message":"ok"}"#).unwrap_err();
        assert!(matches!(err, ResolutionError::Decode(msg) if msg.contains("neither known shape")));
    }

    #[tokio::test]
    async fn test_hydrax_staged_resolution() {
        let session = Arc::new(
            MockSession::new()
                .route(
                    "player.example/embed",
                    200,
                    r#"<div id="player" data-id="Xy_12-ab"></div>"#,
                )
                .route(
                    "ping.iamcdn.net",
                    200,
                    r#"{"status":true,"url":"zone.iamcdn.example/abc","sources":["hd","sd"]}"#,
                ),
        );

        let media = resolve_with(Hydrax, session.clone(), "https://player.example/embed/42")
            .await
            .unwrap();
        assert_eq!(media.url().as_str(), "https://www.zone.iamcdn.example/abc");
        assert_eq!(
            media.headers().get("referer").map(String::as_str),
            Some(HYDRAX_REFERER)
        );

        let requests = session.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].form.as_deref(),
            Some(&[("slug".to_string(), "Xy_12-ab".to_string())][..])
        );
    }

    #[tokio::test]
    async fn test_hydrax_slug_from_query_skips_page() {
        let session = Arc::new(MockSession::new().route(
            "ping.iamcdn.net",
            200,
            r#"{"status":true,"sources":"https://legacy.iamcdn.example/q"}"#,
        ));

        let media = resolve_with(Hydrax, session.clone(), "https://hydrax.net/watch?v=qSlug")
            .await
            .unwrap();
        assert_eq!(media.url().as_str(), "https://legacy.iamcdn.example/q");
        assert_eq!(session.request_count(), 1);
    }
}
