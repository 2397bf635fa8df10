use episode_resolver::ResolutionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout error: Operation timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
}

impl CliError {
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Advice for the user, when the failure suggests one.
    pub fn hint(&self) -> Option<&'static str> {
        use episode_resolver::resolver::Recovery;

        let Self::Resolution(e) = self else {
            return None;
        };
        match e.recovery() {
            Recovery::OpenInBrowser => Some("open the episode page in a browser instead"),
            Recovery::TryAlternativeServer => Some("try another server for this episode"),
            Recovery::RetryLater => Some("the host is still processing the video, retry later"),
            Recovery::ChooseAnotherSource => Some("pick a different source site"),
            Recovery::None => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
