use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("http status {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("pattern not found: {stage}")]
    PatternNotFound { stage: &'static str },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unsupported domain: {0}")]
    UnsupportedDomain(String),
    #[error("media is still being processed: {0}")]
    ProcessingPending(String),
    #[error("no parser registered for server '{0}'")]
    UnsupportedServer(String),
    #[error("resolution cancelled")]
    Cancelled,
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("other error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for ResolutionError {
    fn from(e: serde_json::Error) -> Self {
        ResolutionError::Decode(format!("json: {e}"))
    }
}

impl From<base64::DecodeError> for ResolutionError {
    fn from(e: base64::DecodeError) -> Self {
        ResolutionError::Decode(format!("base64: {e}"))
    }
}

impl From<url::ParseError> for ResolutionError {
    fn from(e: url::ParseError) -> Self {
        ResolutionError::Decode(format!("url: {e}"))
    }
}

impl From<std::string::FromUtf8Error> for ResolutionError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        ResolutionError::Decode(format!("utf-8: {e}"))
    }
}

/// What the error-presentation layer is advised to offer the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Open the episode page in an in-app browser.
    OpenInBrowser,
    /// Suggest another server for the same episode.
    TryAlternativeServer,
    /// The host is preparing the asset; try again later.
    RetryLater,
    /// Pick a different source site altogether.
    ChooseAnotherSource,
    None,
}

impl ResolutionError {
    pub fn recovery(&self) -> Recovery {
        match self {
            ResolutionError::Http(_) | ResolutionError::Status { .. } => Recovery::OpenInBrowser,
            ResolutionError::PatternNotFound { .. } | ResolutionError::Decode(_) => {
                Recovery::OpenInBrowser
            }
            ResolutionError::UnsupportedDomain(_) | ResolutionError::UnsupportedServer(_) => {
                Recovery::TryAlternativeServer
            }
            ResolutionError::ProcessingPending(_) => Recovery::RetryLater,
            ResolutionError::Configuration(_) | ResolutionError::Other(_) => {
                Recovery::ChooseAnotherSource
            }
            ResolutionError::Cancelled => Recovery::None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolutionError::Cancelled)
    }
}
