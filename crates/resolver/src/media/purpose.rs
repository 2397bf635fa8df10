use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Context in which a resolved asset is going to be consumed.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    Playback,
    Download,
    RemoteCast,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [Purpose::Playback, Purpose::Download, Purpose::RemoteCast];

    pub fn as_str(&self) -> &str {
        match self {
            Purpose::Playback => "playback",
            Purpose::Download => "download",
            Purpose::RemoteCast => "remote-cast",
        }
    }
}

impl Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "playback" | "play" => Ok(Purpose::Playback),
            "download" => Ok(Purpose::Download),
            "remote-cast" | "remotecast" | "cast" => Ok(Purpose::RemoteCast),
            other => Err(format!("unknown purpose: {other}")),
        }
    }
}

/// Static declaration of which purposes a parser should be preferred for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fitness {
    pub playback: bool,
    pub download: bool,
    pub remote_cast: bool,
}

impl Fitness {
    pub const ALL: Fitness = Fitness {
        playback: true,
        download: true,
        remote_cast: true,
    };

    /// Defunct hosts kept registered so persisted links still resolve.
    pub const DISABLED: Fitness = Fitness {
        playback: false,
        download: false,
        remote_cast: false,
    };

    pub const fn without_download(self) -> Self {
        Self {
            download: false,
            ..self
        }
    }

    pub const fn without_remote_cast(self) -> Self {
        Self {
            remote_cast: false,
            ..self
        }
    }

    pub fn allows(&self, purpose: Purpose) -> bool {
        match purpose {
            Purpose::Playback => self.playback,
            Purpose::Download => self.download,
            Purpose::RemoteCast => self.remote_cast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_parse() {
        assert_eq!("cast".parse::<Purpose>(), Ok(Purpose::RemoteCast));
        assert_eq!("Download".parse::<Purpose>(), Ok(Purpose::Download));
        assert!("stream".parse::<Purpose>().is_err());
        assert_eq!(Purpose::RemoteCast.to_string(), "remote-cast");
    }

    #[test]
    fn test_fitness() {
        let fitness = Fitness::ALL.without_download();
        assert!(fitness.allows(Purpose::Playback));
        assert!(!fitness.allows(Purpose::Download));
        assert!(fitness.allows(Purpose::RemoteCast));

        assert!(Purpose::ALL.iter().all(|p| !Fitness::DISABLED.allows(*p)));
    }
}
