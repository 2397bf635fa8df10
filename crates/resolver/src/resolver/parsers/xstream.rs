use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::common::absolutize;
use crate::media::{PlaybackMedia, StreamFormat};
use crate::resolver::error::ResolutionError;
use crate::resolver::parser::{ResolveContext, VideoParser};
use crate::resolver::session::HttpRequest;

/// Domains serving the same `/api/source/{id}` endpoint.
const KNOWN_HOSTS: &[&str] = &[
    "fembed.com",
    "www.fembed.com",
    "feurl.com",
    "www.feurl.com",
    "fcdn.stream",
    "femax20.com",
    "xstreamcdn.com",
    "www.xstreamcdn.com",
    "embedsito.com",
];

#[derive(Debug, Deserialize)]
struct SourceResponse {
    success: bool,
    data: SourceData,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceData {
    Sources(Vec<Source>),
    Message(String),
}

#[derive(Debug, Deserialize)]
struct Source {
    file: String,
    #[serde(default)]
    label: String,
    #[serde(default, rename = "type")]
    kind: String,
}

impl Source {
    /// `"1080p"` -> 1080; labels without a number rank last.
    fn height(&self) -> u32 {
        let digits: String = self
            .label
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().unwrap_or(0)
    }
}

/// XStreamCDN / Fembed and their mirrors.
#[derive(Debug, Clone, Copy, Default)]
pub struct XStream;

impl XStream {
    fn is_known_host(host: &str) -> bool {
        KNOWN_HOSTS.iter().any(|known| known.eq_ignore_ascii_case(host))
    }
}

#[async_trait]
impl VideoParser for XStream {
    fn name(&self) -> &'static str {
        "XStream"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["Fembed", "Feurl", "FCDN", "XStreamCDN"]
    }

    async fn parse(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError> {
        let target = &ctx.episode.target;
        let host = target.host_str().unwrap_or_default();
        if !Self::is_known_host(host) {
            return Err(ResolutionError::UnsupportedDomain(host.to_string()));
        }

        let id = target
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .ok_or(ResolutionError::PatternNotFound {
                stage: "XStream video id",
            })?;
        debug!("XStream video id {} on {}", id, host);

        let api = format!("https://{host}/api/source/{id}");
        let response: SourceResponse = ctx
            .json(
                HttpRequest::post(api)
                    .referer(target.as_str())
                    .form(&[("r", ctx.episode.referer.as_str()), ("d", host)]),
            )
            .await?;

        let sources = match response.data {
            SourceData::Sources(sources) if response.success => sources,
            SourceData::Message(message) if message.to_lowercase().contains("convert") => {
                return Err(ResolutionError::ProcessingPending(message));
            }
            SourceData::Message(message) => {
                return Err(ResolutionError::Decode(format!("XStream: {message}")));
            }
            SourceData::Sources(_) => {
                return Err(ResolutionError::Decode(
                    "XStream reported failure without a message".to_string(),
                ));
            }
        };

        let best = sources
            .iter()
            .max_by_key(|source| source.height())
            .ok_or_else(|| ResolutionError::Decode("XStream returned no sources".to_string()))?;
        debug!("XStream picked {} out of {} sources", best.label, sources.len());

        let url = absolutize(&best.file, target)?;
        let mut media = PlaybackMedia::from_url(url, ctx.episode.clone());
        let format = StreamFormat::from_type_tag(&best.kind);
        if format != StreamFormat::Unknown {
            media = media.with_format(format);
        }
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_session::{MockSession, resolve_with};
    use reqwest::Method;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_xstream_picks_highest_label() {
        let session = Arc::new(MockSession::new().route(
            "fembed.com/api/source/l7z-ab12",
            200,
            r#"{"success":true,"data":[
                {"file":"https://fvs.example/v/480","label":"480p","type":"mp4"},
                {"file":"https://fvs.example/v/1080","label":"1080p","type":"mp4"},
                {"file":"https://fvs.example/v/720","label":"720p","type":"mp4"}
            ],"player":{}}"#,
        ));

        let media = resolve_with(XStream, session.clone(), "https://www.fembed.com/v/l7z-ab12")
            .await
            .unwrap();
        assert_eq!(media.url().as_str(), "https://fvs.example/v/1080");
        assert_eq!(media.content_type(), "video/mp4");

        let request = &session.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://www.fembed.com/api/source/l7z-ab12");
        let form = request.form.as_ref().unwrap();
        assert!(form.contains(&("d".to_string(), "www.fembed.com".to_string())));
    }

    #[tokio::test]
    async fn test_xstream_converting_is_pending() {
        let session = Arc::new(MockSession::new().route(
            "feurl.com/api/source/",
            200,
            r#"{"success":false,"data":"Video is being converted, please wait"}"#,
        ));

        let result = resolve_with(XStream, session, "https://feurl.com/v/new-one").await;
        assert!(matches!(result, Err(ResolutionError::ProcessingPending(_))));
    }

    #[tokio::test]
    async fn test_xstream_rejects_unknown_host() {
        let session = Arc::new(MockSession::new());

        let result = resolve_with(XStream, session.clone(), "https://lookalike.example/v/abc").await;
        assert!(matches!(
            result,
            Err(ResolutionError::UnsupportedDomain(host)) if host == "lookalike.example"
        ));
        assert_eq!(session.request_count(), 0);
    }
}
