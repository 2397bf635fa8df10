//! Resolves episode pages hosted on third-party video sites into a uniform
//! [`PlaybackMedia`](media::PlaybackMedia) descriptor.
//!
//! The entry point is [`EpisodeResolver`](resolver::orchestrator::EpisodeResolver),
//! which looks up the parser registered for an episode's server and returns a
//! cancellable [`ResolutionTask`](resolver::task::ResolutionTask).

pub mod deobfuscate;
pub mod media;
pub mod resolver;

pub use media::{AnimeReference, Episode, EpisodeLink, Fitness, PlaybackMedia, Purpose};
pub use resolver::{
    EpisodeResolver, ParserRegistry, ResolutionError, ResolutionTask, VideoParser,
    default_registry,
};
