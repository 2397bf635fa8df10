//! Per-host extraction recipes.
//!
//! The regular expressions in here describe undocumented third-party markup.
//! They are kept exactly as the hosts serve it today and break whenever a
//! host changes its player page; a broken pattern surfaces as
//! [`ResolutionError::PatternNotFound`](crate::resolver::error::ResolutionError::PatternNotFound).

/// Declares a zero-sized parser driven by a single [`PageRecipe`](common::PageRecipe).
macro_rules! page_parser {
    (
        $(#[$meta:meta])*
        $ty:ident {
            name: $name:literal,
            aliases: [$($alias:literal),* $(,)?],
            fitness: $fitness:expr,
            recipe: $recipe:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        #[async_trait::async_trait]
        impl $crate::resolver::parser::VideoParser for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn aliases(&self) -> &'static [&'static str] {
                &[$($alias),*]
            }

            fn fitness(&self) -> $crate::media::Fitness {
                $fitness
            }

            async fn parse(
                &self,
                ctx: &$crate::resolver::parser::ResolveContext,
            ) -> Result<$crate::media::PlaybackMedia, $crate::resolver::error::ResolutionError> {
                static RECIPE: $crate::resolver::parsers::common::PageRecipe = $recipe;
                RECIPE.run(ctx).await
            }
        }
    };
}

pub(crate) mod common;
mod defunct;
mod dood;
mod embedded;
mod encoded;
mod hydrax;
mod packed;
mod streamango;
mod streamsb;
mod streamtape;
mod xstream;

pub use defunct::{Openload, RapidVideo, VeryStream};
pub use dood::Dood;
pub use embedded::{
    MyCloud, PrettyFast, SendVid, TrollVid, Uqload, VidStreaming, VideoBin, Vidlox, Vidoza,
    YourUpload,
};
pub use encoded::{Maverick, PinkBird};
pub use hydrax::Hydrax;
pub use packed::{GoUnlimited, Kwik, Mixdrop, Mp4Upload};
pub use streamango::Streamango;
pub use streamsb::StreamSb;
pub use streamtape::StreamTape;
pub use xstream::XStream;
