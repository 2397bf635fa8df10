//! In-memory [`Session`] used by the parser tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::error::ResolutionError;
use super::parser::VideoParser;
use super::session::{HttpRequest, HttpResponse, Session};
use crate::media::{AnimeReference, Episode, EpisodeLink, PlaybackMedia, Purpose};
use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

struct Route {
    needle: String,
    status: u16,
    body: String,
    delay: Option<Duration>,
}

/// Answers requests whose URL contains a registered substring; the first
/// matching route wins and anything else gets a 404.
#[derive(Default)]
pub(crate) struct MockSession {
    routes: Vec<Route>,
    count: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(mut self, needle: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            needle: needle.to_string(),
            status,
            body: body.to_string(),
            delay: None,
        });
        self
    }

    pub(crate) fn delayed_route(mut self, needle: &str, delay: Duration, body: &str) -> Self {
        self.routes.push(Route {
            needle: needle.to_string(),
            status: 200,
            body: body.to_string(),
            delay: Some(delay),
        });
        self
    }

    pub(crate) fn request_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Session for MockSession {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ResolutionError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let Some(route) = self.routes.iter().find(|r| request.url.contains(&r.needle)) else {
            return Ok(HttpResponse::new(404, request.url, "not found"));
        };
        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(HttpResponse::new(
            route.status,
            request.url,
            route.body.clone(),
        ))
    }
}

pub(crate) fn episode(server: &str, target: &str) -> Episode {
    let parent = AnimeReference::new(
        "Serial Experiments Lain",
        Url::parse("https://anime.example/lain").unwrap(),
        "anime.example",
    );
    let link = EpisodeLink::new("layer-01", "Layer 01", server, parent);
    Episode::new(link, Url::parse(target).unwrap())
}

/// Resolves `target` with `parser` through `session` and waits for the outcome.
pub(crate) async fn resolve_with<P: VideoParser>(
    parser: P,
    session: Arc<MockSession>,
    target: &str,
) -> Result<PlaybackMedia, ResolutionError> {
    let parser: Arc<dyn VideoParser> = Arc::new(parser);
    let episode = episode(parser.name(), target);
    parser.resolve(episode, session, Purpose::Playback).await
}

/// Wraps `payload` in a packed `eval(function(p,a,c,k,e,d)...)` script.
/// Tokens in `payload` are base-36 indexes into `words`.
pub(crate) fn packed_page(payload: &str, words: &[&str]) -> String {
    format!(
        "<script type='text/javascript'>eval(function(p,a,c,k,e,d){{while(c--)if(k[c])p=p.replace(new RegExp('\\\\b'+c.toString(a)+'\\\\b','g'),k[c]);return p}}('{}',36,{},'{}'.split('|'),0,{{}}))</script>",
        payload.replace('\'', "\\'"),
        words.len(),
        words.join("|"),
    )
}
