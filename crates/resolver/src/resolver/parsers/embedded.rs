//! Hosts whose player page carries the media URL in plain sight.

use std::sync::LazyLock;

use regex::Regex;

use super::common::{PageRecipe, RefererSource};
use crate::media::Fitness;

static MYCLOUD_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"file:\s*"([^"]+)""#).unwrap());
static PRETTYFAST_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""file":\s*"([^"]+)""#).unwrap());
static YOURUPLOAD_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"file:\s*'([^']+)'").unwrap());
static UQLOAD_SOURCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"sources:\s*\["([^"]+)"\]"#).unwrap());
static VIDLOX_SOURCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"sources:\s*\[\s*"([^"]+\.m3u8)""#).unwrap());
static SENDVID_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<source\s+src="([^"]+)""#).unwrap());
static TROLLVID_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<source\s+src="([^"]+)"\s+type="video/mp4""#).unwrap());
static VIDOZA_SOURCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"sourcesCode:\s*\[\s*\{\s*src:\s*"([^"]+)""#).unwrap());
static VIDSTREAMING_SOURCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sources:\s*\[\s*\{\s*file:\s*'([^']+)'").unwrap());
static VIDEOBIN_SOURCES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"sources:\s*\[\s*"([^"]+)""#).unwrap());

page_parser! {
    /// Serves event style HLS manifests only, so it is never offered for download.
    MyCloud {
        name: "MyCloud",
        aliases: ["mcloud"],
        fitness: Fitness::ALL.without_download(),
        recipe: PageRecipe::new("MyCloud player file", &MYCLOUD_FILE),
    }
}

page_parser! {
    PrettyFast {
        name: "PrettyFast",
        aliases: ["F5 - HQ", "F5 Beverly Hills"],
        fitness: Fitness::ALL,
        recipe: PageRecipe::new("PrettyFast player file", &PRETTYFAST_FILE),
    }
}

page_parser! {
    YourUpload {
        name: "YourUpload",
        aliases: [],
        fitness: Fitness::ALL.without_remote_cast(),
        recipe: PageRecipe::new("YourUpload player file", &YOURUPLOAD_FILE)
            .media_referer(RefererSource::Fixed("https://www.yourupload.com/")),
    }
}

page_parser! {
    Uqload {
        name: "Uqload",
        aliases: [],
        fitness: Fitness::ALL.without_remote_cast(),
        recipe: PageRecipe::new("Uqload sources", &UQLOAD_SOURCES)
            .media_referer(RefererSource::Origin),
    }
}

page_parser! {
    Vidlox {
        name: "Vidlox",
        aliases: [],
        fitness: Fitness::ALL,
        recipe: PageRecipe::new("Vidlox hls source", &VIDLOX_SOURCES),
    }
}

page_parser! {
    SendVid {
        name: "SendVid",
        aliases: [],
        fitness: Fitness::ALL,
        recipe: PageRecipe::new("SendVid video source", &SENDVID_SOURCE),
    }
}

page_parser! {
    TrollVid {
        name: "TrollVid",
        aliases: [],
        fitness: Fitness::ALL,
        recipe: PageRecipe::new("TrollVid mp4 source", &TROLLVID_SOURCE),
    }
}

page_parser! {
    Vidoza {
        name: "Vidoza",
        aliases: [],
        fitness: Fitness::ALL,
        recipe: PageRecipe::new("Vidoza sources", &VIDOZA_SOURCES),
    }
}

page_parser! {
    VidStreaming {
        name: "VidStreaming",
        aliases: ["Vidstream", "Gogo server", "vidcdn"],
        fitness: Fitness::ALL,
        recipe: PageRecipe::new("VidStreaming sources", &VIDSTREAMING_SOURCES)
            .page_referer(RefererSource::Target),
    }
}

page_parser! {
    VideoBin {
        name: "VideoBin",
        aliases: [],
        fitness: Fitness::ALL,
        recipe: PageRecipe::new("VideoBin sources", &VIDEOBIN_SOURCES),
    }
}
