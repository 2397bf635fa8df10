//! Hosts that hide the player setup inside a packed script.

use std::sync::LazyLock;

use regex::Regex;

use super::common::{PageRecipe, RefererSource};
use crate::media::Fitness;

static MP4UPLOAD_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"player\.src\(\s*"([^"]+)""#).unwrap());
static KWIK_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"const\s+source\s*=\s*'([^']+)'").unwrap());
static MIXDROP_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"MDCore\.wurl\s*=\s*"([^"]+)""#).unwrap());
static GOUNLIMITED_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src:\s*"([^"]+)""#).unwrap());

page_parser! {
    Mp4Upload {
        name: "Mp4Upload",
        aliases: [],
        fitness: Fitness::ALL.without_remote_cast(),
        recipe: PageRecipe::new("Mp4Upload player source", &MP4UPLOAD_SOURCE)
            .packed()
            .media_referer(RefererSource::Fixed("https://www.mp4upload.com/")),
    }
}

page_parser! {
    /// Kwik refuses both the embed page and the stream without a referer.
    Kwik {
        name: "Kwik",
        aliases: ["Kiwik"],
        fitness: Fitness::ALL.without_remote_cast(),
        recipe: PageRecipe::new("Kwik source", &KWIK_SOURCE)
            .packed()
            .media_referer(RefererSource::Fixed("https://kwik.cx/")),
    }
}

page_parser! {
    Mixdrop {
        name: "Mixdrop",
        aliases: [],
        fitness: Fitness::ALL.without_remote_cast(),
        recipe: PageRecipe::new("Mixdrop wurl", &MIXDROP_SOURCE)
            .packed()
            .media_referer(RefererSource::Origin),
    }
}

page_parser! {
    GoUnlimited {
        name: "GoUnlimited",
        aliases: [],
        fitness: Fitness::ALL,
        recipe: PageRecipe::new("GoUnlimited player source", &GOUNLIMITED_SOURCE).packed(),
    }
}
