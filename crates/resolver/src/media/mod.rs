pub mod episode;
pub mod formats;
pub mod playback_media;
pub mod purpose;

pub use episode::{AnimeReference, Episode, EpisodeLink, ServerIdentifier};
pub use formats::StreamFormat;
pub use playback_media::PlaybackMedia;
pub use purpose::{Fitness, Purpose};
