use super::error::ResolutionError;
use super::parsers::{
    Dood, GoUnlimited, Hydrax, Kwik, Maverick, Mixdrop, Mp4Upload, MyCloud, Openload, PinkBird,
    PrettyFast, RapidVideo, SendVid, StreamSb, StreamTape, Streamango, TrollVid, Uqload,
    VeryStream, VidStreaming, VideoBin, Vidlox, Vidoza, XStream, YourUpload,
};
use super::registry::ParserRegistry;
use super::session::HttpSession;
use reqwest::Client;
use rustls::{ClientConfig, crypto::ring};
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Settings of the shared network session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_agent: Option<String>,
    pub timeout: Duration,
    pub proxy: Option<ProxyConfig>,
    pub cookies: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: Duration::from_secs(30),
            proxy: None,
            cookies: None,
        }
    }
}

pub fn default_client() -> Result<Client, ResolutionError> {
    create_client(&SessionConfig::default())
}

pub fn create_client(config: &SessionConfig) -> Result<Client, ResolutionError> {
    let provider = Arc::new(ring::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ResolutionError::Configuration(format!("tls protocol versions: {e}")))?
        .with_platform_verifier()
        .map_err(|e| ResolutionError::Configuration(format!("tls verifier: {e}")))?
        .with_no_client_auth();

    let mut builder = Client::builder()
        .use_preconfigured_tls(tls_config)
        .timeout(config.timeout);

    if let Some(proxy_config) = &config.proxy {
        match reqwest::Proxy::all(&proxy_config.url) {
            Ok(mut proxy) => {
                if let (Some(username), Some(password)) =
                    (&proxy_config.username, &proxy_config.password)
                {
                    proxy = proxy.basic_auth(username, password);
                }
                builder = builder.proxy(proxy);
            }
            Err(e) => {
                warn!("Failed to configure proxy '{}': {}", proxy_config.url, e);
            }
        }
    }

    Ok(builder.build()?)
}

/// Builds the shared [`HttpSession`] described by `config`.
pub fn create_session(config: &SessionConfig) -> Result<HttpSession, ResolutionError> {
    let mut session = HttpSession::new(create_client(config)?);
    if let Some(user_agent) = &config.user_agent {
        session = session.with_header(reqwest::header::USER_AGENT.as_str(), user_agent)?;
    }
    if let Some(cookies) = &config.cookies {
        session = session.with_cookies_from_string(cookies);
    }
    Ok(session)
}

/// Returns a registry populated with every supported server.
pub fn default_registry() -> ParserRegistry {
    let mut registry = ParserRegistry::new();

    registry.register(MyCloud, "MyCloud");
    registry.register(PrettyFast, "PrettyFast");
    registry.register(VidStreaming, "VidStreaming");
    registry.register(XStream, "XStream");
    registry.register(Hydrax, "Hydrax");
    registry.register(Dood, "Dood");
    registry.register(StreamSb, "StreamSB");
    registry.register(StreamTape, "StreamTape");
    registry.register(Mp4Upload, "Mp4Upload");
    registry.register(Kwik, "Kwik");
    registry.register(Mixdrop, "Mixdrop");
    registry.register(GoUnlimited, "GoUnlimited");
    registry.register(YourUpload, "YourUpload");
    registry.register(Uqload, "Uqload");
    registry.register(Vidlox, "Vidlox");
    registry.register(SendVid, "SendVid");
    registry.register(TrollVid, "TrollVid");
    registry.register(Vidoza, "Vidoza");
    registry.register(VideoBin, "VideoBin");
    registry.register(Streamango, "Streamango");
    registry.register(PinkBird, "PinkBird");
    registry.register(Maverick, "Maverick");
    // defunct hosts, kept so persisted links still find their parser
    registry.register(RapidVideo, "RapidVideo");
    registry.register(Openload, "Openload");
    registry.register(VeryStream, "VeryStream");

    registry
}
