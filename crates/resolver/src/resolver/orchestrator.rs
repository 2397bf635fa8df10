use std::sync::Arc;

use super::error::ResolutionError;
use super::registry::ParserRegistry;
use super::session::Session;
use super::task::ResolutionTask;
use crate::media::{Episode, EpisodeLink, PlaybackMedia, Purpose};
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Single entry point turning an [`Episode`] into a [`ResolutionTask`].
///
/// Holds the shared registry plus the network sessions of the site adapters
/// so follow-up requests reuse the cookie jar of the site that produced the
/// episode.
#[derive(Clone)]
pub struct EpisodeResolver {
    registry: Arc<ParserRegistry>,
    default_session: Arc<dyn Session>,
    site_sessions: FxHashMap<String, Arc<dyn Session>>,
}

impl EpisodeResolver {
    pub fn new(registry: Arc<ParserRegistry>, session: Arc<dyn Session>) -> Self {
        Self {
            registry,
            default_session: session,
            site_sessions: FxHashMap::default(),
        }
    }

    /// Routes episodes whose parent anime comes from `source` through `session`.
    pub fn with_site_session<S: Into<String>>(mut self, source: S, session: Arc<dyn Session>) -> Self {
        self.site_sessions
            .insert(source.into().to_lowercase(), session);
        self
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    fn session_for(&self, episode: &Episode) -> Arc<dyn Session> {
        self.site_sessions
            .get(&episode.source().to_lowercase())
            .cloned()
            .unwrap_or_else(|| self.default_session.clone())
    }

    /// Starts resolving `episode` with the parser registered for its server.
    ///
    /// An unknown server is not a crash: the returned task simply completes
    /// with [`ResolutionError::UnsupportedServer`].
    pub fn resolve(&self, episode: Episode, purpose: Purpose) -> ResolutionTask {
        match self.registry.provider(episode.server()) {
            Some(parser) => {
                let session = self.session_for(&episode);
                parser.resolve(episode, session, purpose)
            }
            None => {
                info!("No parser registered for server {}", episode.server());
                ResolutionTask::failed(ResolutionError::UnsupportedServer(
                    episode.server().to_string(),
                ))
            }
        }
    }

    /// Orders `links` for `purpose`: recommended servers first, then the
    /// remaining ones, each group keeping its original order.
    pub fn rank(&self, links: &[EpisodeLink], purpose: Purpose) -> Vec<EpisodeLink> {
        let (mut preferred, rest): (Vec<_>, Vec<_>) = links
            .iter()
            .cloned()
            .partition(|link| self.registry.is_recommended(&link.server, purpose));
        preferred.extend(rest);
        preferred
    }

    /// Only the links whose server is recommended for `purpose`.
    pub fn recommended(&self, links: &[EpisodeLink], purpose: Purpose) -> Vec<EpisodeLink> {
        links
            .iter()
            .filter(|link| self.registry.is_recommended(&link.server, purpose))
            .cloned()
            .collect()
    }

    /// Resolves candidates one after the other in ranked order and returns
    /// the first success, or the last failure.
    ///
    /// Dropping the returned future cancels the candidate in flight.
    pub async fn resolve_first(
        &self,
        episodes: Vec<Episode>,
        purpose: Purpose,
    ) -> Result<PlaybackMedia, ResolutionError> {
        self.resolve_first_until(episodes, purpose, CancellationToken::new())
            .await
    }

    /// [`resolve_first`](Self::resolve_first) that gives up as soon as
    /// `token` is cancelled, without starting another candidate.
    pub async fn resolve_first_until(
        &self,
        episodes: Vec<Episode>,
        purpose: Purpose,
        token: CancellationToken,
    ) -> Result<PlaybackMedia, ResolutionError> {
        if episodes.is_empty() {
            return Err(ResolutionError::Other("no candidate episodes".to_string()));
        }

        let links: Vec<EpisodeLink> = episodes.iter().map(|e| e.link.clone()).collect();
        let order = self.rank(&links, purpose);

        let mut remaining = episodes;
        let mut last_error = ResolutionError::Other("no candidate episodes".to_string());

        for link in order {
            if token.is_cancelled() {
                return Err(ResolutionError::Cancelled);
            }
            let Some(position) = remaining.iter().position(|e| e.link == link) else {
                continue;
            };
            let episode = remaining.swap_remove(position);
            debug!("Trying server {} for {}", link.server, link.name);

            let task = self.resolve(episode, purpose);
            let inner = task.cancellation_token();
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    inner.cancel();
                    Err(ResolutionError::Cancelled)
                }
                outcome = task => outcome,
            };

            match outcome {
                Ok(media) => return Ok(media),
                Err(ResolutionError::Cancelled) => return Err(ResolutionError::Cancelled),
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::AnimeReference;
    use crate::resolver::default::default_registry;
    use crate::resolver::test_session::MockSession;
    use std::time::Duration;
    use url::Url;

    fn episode(server: &str, target: &str) -> Episode {
        let parent = AnimeReference::new(
            "Mushishi",
            Url::parse("https://anime.example/mushishi").unwrap(),
            "anime.example",
        );
        let link = EpisodeLink::new(format!("ep-1-{server}"), "Episode 1", server, parent);
        Episode::new(link, Url::parse(target).unwrap())
    }

    fn resolver(session: Arc<MockSession>) -> EpisodeResolver {
        EpisodeResolver::new(Arc::new(default_registry()), session)
    }

    #[tokio::test]
    async fn test_unknown_server_is_a_normal_failure() {
        let session = Arc::new(MockSession::new());
        let resolver = resolver(session.clone());

        let result = resolver
            .resolve(episode("Nonexistent", "https://nowhere.example/e/1"), Purpose::Playback)
            .await;

        assert!(matches!(result, Err(ResolutionError::UnsupportedServer(s)) if s == "Nonexistent"));
        assert_eq!(session.request_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_through_alias() {
        let session = Arc::new(
            MockSession::new().route("mcloud.example", 200, r#"sources:[{file:"https://cdn.example/video.m3u8"}]"#),
        );
        let resolver = resolver(session.clone());

        let media = resolver
            .resolve(episode("mcloud", "https://mcloud.example/embed/abc"), Purpose::Playback)
            .await
            .unwrap();
        assert!(media.is_segmented());
        assert_eq!(session.request_count(), 1);
    }

    #[tokio::test]
    async fn test_site_session_routing() {
        let default_session = Arc::new(MockSession::new());
        let site_session = Arc::new(
            MockSession::new().route("vidoza.example", 200, r#"sourcesCode: [{ src: "https://cdn.example/v.mp4", type: "video/mp4"}]"#),
        );
        let resolver = resolver(default_session.clone())
            .with_site_session("Anime.Example", site_session.clone());

        let media = resolver
            .resolve(episode("Vidoza", "https://vidoza.example/embed-1.html"), Purpose::Download)
            .await
            .unwrap();
        assert_eq!(media.url().as_str(), "https://cdn.example/v.mp4");
        assert_eq!(default_session.request_count(), 0);
        assert_eq!(site_session.request_count(), 1);
    }

    #[test]
    fn test_rank_and_filter_by_purpose() {
        let resolver = resolver(Arc::new(MockSession::new()));
        let links: Vec<EpisodeLink> = ["MyCloud", "Openload", "Vidoza", "Unknown"]
            .iter()
            .map(|s| episode(s, "https://host.example/e/1").link)
            .collect();

        let ranked: Vec<_> = resolver
            .rank(&links, Purpose::Download)
            .into_iter()
            .map(|l| l.server)
            .collect();
        assert_eq!(ranked, vec!["Vidoza", "MyCloud", "Openload", "Unknown"]);

        let recommended: Vec<_> = resolver
            .recommended(&links, Purpose::Download)
            .into_iter()
            .map(|l| l.server)
            .collect();
        assert_eq!(recommended, vec!["Vidoza"]);
    }

    #[tokio::test]
    async fn test_resolve_first_falls_through() {
        let session = Arc::new(
            MockSession::new()
                .route("broken.example", 200, "<html>no player</html>")
                .route("uqload.example", 200, r#"sources: ["https://cdn.example/u.mp4"]"#),
        );
        let resolver = resolver(session.clone());

        let media = resolver
            .resolve_first(
                vec![
                    episode("Vidoza", "https://broken.example/embed-1.html"),
                    episode("Uqload", "https://uqload.example/embed-2.html"),
                ],
                Purpose::Playback,
            )
            .await
            .unwrap();
        assert_eq!(media.url().as_str(), "https://cdn.example/u.mp4");
        assert_eq!(session.request_count(), 2);
    }

    const STAGED_EMBED: &str = "$.get('/pass_md5/1-2/tok', function(a) { return a + '?token=tok&expiry=' + Date.now(); });";

    fn staged_session() -> Arc<MockSession> {
        Arc::new(
            MockSession::new()
                .delayed_route("dood.example/e/", Duration::from_millis(200), STAGED_EMBED)
                .route("dood.example/pass_md5/", 200, "https://cdn.example/x"),
        )
    }

    #[tokio::test]
    async fn test_dropped_resolve_first_stops_later_stages() {
        let session = staged_session();
        let resolver = resolver(session.clone());

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            resolver.resolve_first(
                vec![episode("Dood", "https://dood.example/e/abc123")],
                Purpose::Playback,
            ),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(session.request_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_first_until_cancelled() {
        let session = staged_session();
        let resolver = resolver(session.clone());
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let result = resolver
            .resolve_first_until(
                vec![
                    episode("Dood", "https://dood.example/e/abc123"),
                    episode("Uqload", "https://uqload.example/embed-2.html"),
                ],
                Purpose::Playback,
                token,
            )
            .await;
        assert!(matches!(result, Err(ResolutionError::Cancelled)));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(session.request_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_first_without_candidates() {
        let resolver = resolver(Arc::new(MockSession::new()));
        let result = resolver.resolve_first(Vec::new(), Purpose::Playback).await;
        assert!(matches!(result, Err(ResolutionError::Other(_))));
    }

    #[tokio::test]
    #[ignore]
    async fn test_resolve_live_embed() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();

        let session = crate::resolver::default::create_session(&Default::default()).unwrap();
        let resolver = EpisodeResolver::new(Arc::new(default_registry()), Arc::new(session));
        let media = resolver
            .resolve(
                episode("Mp4Upload", "https://www.mp4upload.com/embed-vzhbd4k8dz1f.html"),
                Purpose::Playback,
            )
            .await
            .unwrap();
        println!("{media}");
    }
}
