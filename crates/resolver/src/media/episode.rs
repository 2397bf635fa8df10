use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use url::Url;

/// Name of a streaming backend as presented by the anime site, e.g. `"MyCloud"`.
pub type ServerIdentifier = String;

/// The anime an episode belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnimeReference {
    pub title: String,
    /// Canonical page of the anime on its source site.
    pub link: Url,
    /// Name of the site adapter that produced this reference.
    pub source: String,
}

impl AnimeReference {
    pub fn new<T: Into<String>, S: Into<String>>(title: T, link: Url, source: S) -> Self {
        Self {
            title: title.into(),
            link,
            source: source.into(),
        }
    }
}

/// A selectable episode entry on a particular server.
///
/// Two links are equal when they point at the same episode identifier on the
/// same server of the same anime; the display name is ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EpisodeLink {
    pub identifier: String,
    pub name: String,
    pub server: ServerIdentifier,
    pub parent: AnimeReference,
}

impl EpisodeLink {
    pub fn new<I, N, S>(identifier: I, name: N, server: S, parent: AnimeReference) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            server: server.into(),
            parent,
        }
    }
}

impl PartialEq for EpisodeLink {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.server == other.server
            && self.parent.link == other.parent.link
    }
}

impl Eq for EpisodeLink {}

impl Hash for EpisodeLink {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
        self.server.hash(state);
        self.parent.link.hash(state);
    }
}

/// An episode ready to be resolved: the page hosting the player plus the
/// referer the host expects.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub link: EpisodeLink,
    pub target: Url,
    pub referer: String,
}

impl Episode {
    /// Creates an episode whose referer is the parent anime's page.
    pub fn new(link: EpisodeLink, target: Url) -> Self {
        let referer = link.parent.link.to_string();
        Self {
            link,
            target,
            referer,
        }
    }

    pub fn with_referer<S: Into<String>>(mut self, referer: S) -> Self {
        self.referer = referer.into();
        self
    }

    pub fn server(&self) -> &str {
        &self.link.server
    }

    /// Site adapter this episode was produced by.
    pub fn source(&self) -> &str {
        &self.link.parent.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn parent(link: &str) -> AnimeReference {
        AnimeReference::new("Cowboy Bebop", Url::parse(link).unwrap(), "9anime")
    }

    #[test]
    fn test_link_equality_ignores_name() {
        let a = EpisodeLink::new("ep-1", "Asteroid Blues", "MyCloud", parent("https://site.example/a/1"));
        let b = EpisodeLink::new("ep-1", "Episode 1", "MyCloud", parent("https://site.example/a/1"));
        let c = EpisodeLink::new("ep-1", "Episode 1", "Kwik", parent("https://site.example/a/1"));

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: FxHashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_episode_default_referer() {
        let link = EpisodeLink::new("ep-1", "1", "MyCloud", parent("https://site.example/a/1"));
        let episode = Episode::new(link, Url::parse("https://mcloud.example/embed/xyz").unwrap());
        assert_eq!(episode.referer, "https://site.example/a/1");

        let episode = episode.with_referer("https://site.example/watch/1");
        assert_eq!(episode.referer, "https://site.example/watch/1");
        assert_eq!(episode.source(), "9anime");
    }
}
