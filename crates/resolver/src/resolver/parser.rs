use std::sync::Arc;

use super::error::ResolutionError;
use super::session::{HttpRequest, HttpResponse, Session};
use super::task::ResolutionTask;
use crate::media::{Episode, Fitness, PlaybackMedia, Purpose};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Everything a parser needs for one resolution attempt.
///
/// All network access goes through [`ResolveContext::send`] and friends,
/// which refuse to start once the attempt is cancelled and abort the request
/// in flight when cancellation arrives.
pub struct ResolveContext {
    pub episode: Episode,
    pub purpose: Purpose,
    session: Arc<dyn Session>,
    token: CancellationToken,
}

impl ResolveContext {
    pub fn new(
        episode: Episode,
        purpose: Purpose,
        session: Arc<dyn Session>,
        token: CancellationToken,
    ) -> Self {
        Self {
            episode,
            purpose,
            session,
            token,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Issues `request` unless the attempt was cancelled. Non-2xx responses
    /// are reported as [`ResolutionError::Status`].
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ResolutionError> {
        if self.token.is_cancelled() {
            return Err(ResolutionError::Cancelled);
        }

        let url = request.url.clone();
        let response = tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("Request to {} cancelled", url);
                return Err(ResolutionError::Cancelled);
            }
            response = self.session.execute(request) => response?,
        };

        if !response.is_success() {
            return Err(ResolutionError::Status {
                url,
                status: response.status,
            });
        }
        Ok(response)
    }

    pub async fn text(&self, request: HttpRequest) -> Result<String, ResolutionError> {
        Ok(self.send(request).await?.text())
    }

    pub async fn json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ResolutionError> {
        self.send(request).await?.json()
    }

    /// Fetches the episode's target page with the episode referer.
    pub async fn fetch_target(&self) -> Result<String, ResolutionError> {
        let request =
            HttpRequest::get(self.episode.target.as_str()).referer(self.episode.referer.as_str());
        self.text(request).await
    }
}

/// A per-host extraction recipe.
///
/// Implementations are stateless leaves: one instance serves every
/// resolution for its server, possibly concurrently.
#[async_trait]
pub trait VideoParser: Send + Sync + 'static {
    /// Canonical server name.
    fn name(&self) -> &'static str;

    /// Additional server names this parser answers to.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn fitness(&self) -> Fitness {
        Fitness::ALL
    }

    fn is_recommended(&self, purpose: Purpose) -> bool {
        self.fitness().allows(purpose)
    }

    async fn parse(&self, ctx: &ResolveContext) -> Result<PlaybackMedia, ResolutionError>;
}

impl dyn VideoParser {
    /// Starts resolving `episode` and returns its task handle right away.
    pub fn resolve(
        self: Arc<Self>,
        episode: Episode,
        session: Arc<dyn Session>,
        purpose: Purpose,
    ) -> ResolutionTask {
        ResolutionTask::spawn(self, episode, session, purpose)
    }
}
