use std::any::Any;
use std::sync::Arc;

use super::parser::VideoParser;
use crate::media::Purpose;
use tracing::debug;

/// One `server name -> parser` entry.
#[derive(Clone)]
pub struct ParserRegistration {
    pub canonical_name: String,
    pub aliases: Vec<String>,
    pub parser: Arc<dyn VideoParser>,
    concrete: Arc<dyn Any + Send + Sync>,
}

impl ParserRegistration {
    fn matches_canonical(&self, name: &str) -> bool {
        self.canonical_name.eq_ignore_ascii_case(name)
    }

    fn matches_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Debug for ParserRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistration")
            .field("canonical_name", &self.canonical_name)
            .field("aliases", &self.aliases)
            .field("parser", &self.parser.name())
            .finish()
    }
}

/// Append-only lookup table from server names to parsers.
///
/// Built once at startup and then shared read-only; lookups are case
/// insensitive and the first matching registration wins.
#[derive(Default, Debug, Clone)]
pub struct ParserRegistry {
    entries: Vec<ParserRegistration>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `parser` under `server`, with the parser's own aliases.
    pub fn register<P: VideoParser>(&mut self, parser: P, server: &str) {
        self.register_arc(Arc::new(parser), server);
    }

    pub fn register_arc<P: VideoParser>(&mut self, parser: Arc<P>, server: &str) {
        if self.entries.iter().any(|e| e.matches_canonical(server)) {
            debug!("Server {} registered twice, the first registration wins", server);
        }

        self.entries.push(ParserRegistration {
            canonical_name: server.to_string(),
            aliases: parser.aliases().iter().map(|a| a.to_string()).collect(),
            parser: parser.clone(),
            concrete: parser,
        });
    }

    /// Finds the parser for `name`. Canonical names are compared before
    /// aliases; an unknown server yields `None`.
    pub fn provider(&self, name: &str) -> Option<Arc<dyn VideoParser>> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|e| e.matches_canonical(name))
            .or_else(|| self.entries.iter().find(|e| e.matches_alias(name)))
            .map(|e| e.parser.clone())
    }

    /// First registered parser of concrete type `T`.
    pub fn provider_of_kind<T: VideoParser>(&self) -> Option<Arc<T>> {
        self.entries
            .iter()
            .find_map(|e| e.concrete.clone().downcast::<T>().ok())
    }

    pub fn registrations(&self) -> &[ParserRegistration] {
        &self.entries
    }

    /// Registrations whose parser recommends itself for `purpose`.
    pub fn recommended(&self, purpose: Purpose) -> impl Iterator<Item = &ParserRegistration> {
        self.entries
            .iter()
            .filter(move |e| e.parser.is_recommended(purpose))
    }

    /// Whether `server` is known and recommended for `purpose`.
    pub fn is_recommended(&self, server: &str, purpose: Purpose) -> bool {
        self.provider(server)
            .is_some_and(|parser| parser.is_recommended(purpose))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
