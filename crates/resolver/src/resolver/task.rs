use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use super::error::ResolutionError;
use super::parser::{ResolveContext, VideoParser};
use super::session::Session;
use crate::media::{Episode, PlaybackMedia, Purpose};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type Outcome = Result<PlaybackMedia, ResolutionError>;

enum Inner {
    Running(JoinHandle<Outcome>),
    Ready(Option<Outcome>),
}

/// Handle to one in-flight resolution.
///
/// Awaiting the handle yields the outcome exactly once. [`cancel`](Self::cancel)
/// aborts the request currently in flight and keeps later stages from
/// starting; the outcome is then [`ResolutionError::Cancelled`]. Dropping
/// the handle cancels the resolution as well.
pub struct ResolutionTask {
    token: CancellationToken,
    inner: Inner,
}

impl ResolutionTask {
    pub(crate) fn spawn(
        parser: Arc<dyn VideoParser>,
        episode: Episode,
        session: Arc<dyn Session>,
        purpose: Purpose,
    ) -> Self {
        let token = CancellationToken::new();
        let ctx = ResolveContext::new(episode, purpose, session, token.clone());

        let handle = tokio::spawn(async move {
            info!(
                "Resolving {} via {} for {}",
                ctx.episode.target,
                parser.name(),
                purpose
            );

            let result = match parser.parse(&ctx).await {
                Ok(_) if ctx.is_cancelled() => Err(ResolutionError::Cancelled),
                result => result,
            };

            match &result {
                Ok(media) => info!("{} resolved to {}", parser.name(), media),
                Err(e) if e.is_cancelled() => debug!("{} resolution cancelled", parser.name()),
                Err(e) => warn!("{} failed to resolve {}: {}", parser.name(), ctx.episode.target, e),
            }
            result
        });

        Self {
            token,
            inner: Inner::Running(handle),
        }
    }

    /// A task that has already failed, e.g. because no parser matched.
    pub fn failed(error: ResolutionError) -> Self {
        Self {
            token: CancellationToken::new(),
            inner: Inner::Ready(Some(Err(error))),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Future for ResolutionTask {
    type Output = Outcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            Inner::Running(handle) => Pin::new(handle).poll(cx).map(|joined| {
                joined.unwrap_or_else(|e| {
                    Err(ResolutionError::Other(format!("resolution task failed: {e}")))
                })
            }),
            Inner::Ready(outcome) => Poll::Ready(outcome.take().unwrap_or_else(|| {
                Err(ResolutionError::Other("task polled after completion".to_string()))
            })),
        }
    }
}

impl Drop for ResolutionTask {
    fn drop(&mut self) {
        // no-op for a resolution that already completed
        self.token.cancel();
    }
}

/// One UI selection slot: starting a new resolution cancels the previous one.
#[derive(Default)]
pub struct ResolutionSlot {
    current: Mutex<Option<CancellationToken>>,
}

impl ResolutionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, task: ResolutionTask) -> ResolutionTask {
        let previous = self.current.lock().replace(task.cancellation_token());
        if let Some(previous) = previous {
            previous.cancel();
        }
        task
    }

    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_task_completes_once() {
        let task = ResolutionTask::failed(ResolutionError::UnsupportedServer("Nope".into()));
        assert!(matches!(
            task.await,
            Err(ResolutionError::UnsupportedServer(name)) if name == "Nope"
        ));
    }

    #[tokio::test]
    async fn test_slot_cancels_previous() {
        let slot = ResolutionSlot::new();
        let first = slot.start(ResolutionTask::failed(ResolutionError::Cancelled));
        let second = slot.start(ResolutionTask::failed(ResolutionError::Cancelled));

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        slot.cancel();
        assert!(second.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_cancels_running_task() {
        let token = CancellationToken::new();
        let task = ResolutionTask {
            token: token.clone(),
            inner: Inner::Running(tokio::spawn(std::future::pending::<Outcome>())),
        };
        assert!(!token.is_cancelled());

        drop(task);
        assert!(token.is_cancelled());
    }
}
