mod default;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod parser;
pub mod parsers;
pub mod registry;
pub mod session;
pub mod task;

#[cfg(test)]
pub(crate) mod test_session;

pub use default::{
    ProxyConfig, SessionConfig, create_client, create_session, default_client, default_registry,
};
pub use error::{Recovery, ResolutionError};
pub use orchestrator::EpisodeResolver;
pub use parser::{ResolveContext, VideoParser};
pub use registry::{ParserRegistration, ParserRegistry};
pub use session::{HttpRequest, HttpResponse, HttpSession, Session};
pub use task::{ResolutionSlot, ResolutionTask};
