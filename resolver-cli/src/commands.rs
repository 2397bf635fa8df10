use crate::{
    cli::OutputFormat,
    config::AppConfig,
    error::{CliError, Result},
    output::{OutputManager, write_output},
};
use episode_resolver::media::StreamFormat;
use episode_resolver::resolver::manifest::{self, ManifestSummary};
use episode_resolver::resolver::{ProxyConfig, Session, create_session};
use episode_resolver::{
    AnimeReference, Episode, EpisodeLink, EpisodeResolver, PlaybackMedia, Purpose,
    default_registry,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{path::Path, sync::Arc, time::Duration};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

/// Site name recorded on episodes built from the command line.
const CLI_SOURCE: &str = "cli";

pub struct CommandExecutor {
    config: AppConfig,
    session: Arc<dyn Session>,
    resolver: EpisodeResolver,
    timeout: Duration,
}

pub struct ResolveOptions<'a> {
    pub url: &'a str,
    pub server: &'a str,
    pub purpose: Option<Purpose>,
    pub referer: Option<&'a str>,
    pub inspect: bool,
    pub output: Option<OutputFormat>,
    pub output_file: Option<&'a Path>,
}

impl CommandExecutor {
    pub fn new(
        config: AppConfig,
        timeout: Option<u64>,
        proxy: Option<ProxyConfig>,
        cookies: Option<&str>,
    ) -> Result<Self> {
        let session_config = config.session_config(timeout, proxy, cookies);
        debug!("Session config: {:?}", session_config);

        let session: Arc<dyn Session> = Arc::new(create_session(&session_config)?);
        let resolver = EpisodeResolver::new(Arc::new(default_registry()), session.clone());

        Ok(Self {
            timeout: session_config.timeout,
            config,
            session,
            resolver,
        })
    }

    pub async fn resolve(&self, options: ResolveOptions<'_>) -> Result<()> {
        let episode = build_episode(options.url, options.server, options.referer)?;
        let purpose = options.purpose.unwrap_or(self.config.default_purpose);
        info!(
            "Resolving {} on {} for {}",
            episode.target,
            episode.server(),
            purpose
        );

        let pb = self.create_progress_bar(&format!("Resolving {}...", episode.server()));
        let task = self.resolver.resolve(episode, purpose);
        let token = task.cancellation_token();
        let result = match timeout(self.timeout, task).await {
            Ok(result) => result.map_err(CliError::from),
            Err(_) => {
                // stops the in-flight request instead of leaking it
                token.cancel();
                Err(CliError::timeout(self.timeout.as_secs()))
            }
        };
        pb.finish_and_clear();
        let media = result?;

        if !self.resolver.registry().is_recommended(media.episode().server(), purpose) {
            warn!(
                "{} is not recommended for {}, the result may not work",
                media.episode().server(),
                purpose
            );
        }

        let summary = if options.inspect && media.is_segmented() {
            let pb = self.create_progress_bar("Inspecting manifest...");
            let summary = self.inspect_media(&media).await;
            pb.finish_and_clear();
            match summary {
                Ok(summary) => Some(summary),
                Err(e) => {
                    warn!("Manifest inspection failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let output = OutputManager::new(self.config.colored_output).format_media(
            &media,
            summary.as_ref(),
            options.output.unwrap_or(self.config.default_output_format),
        )?;
        write_output(&output, options.output_file)
    }

    pub fn list_servers(&self, purpose: Option<Purpose>, output: Option<OutputFormat>) -> Result<()> {
        let registry = self.resolver.registry();
        let registrations: Vec<_> = match purpose {
            Some(purpose) => registry.recommended(purpose).collect(),
            None => registry.registrations().iter().collect(),
        };

        let output = OutputManager::new(self.config.colored_output).format_servers(
            &registrations,
            output.unwrap_or(self.config.default_output_format),
        )?;
        write_output(&output, None)
    }

    pub async fn inspect(
        &self,
        url: &str,
        referer: Option<&str>,
        output: Option<OutputFormat>,
    ) -> Result<()> {
        let episode = build_episode(url, "manifest", referer)?;
        let mut media =
            PlaybackMedia::from_url(episode.target.clone(), episode).with_format(StreamFormat::Hls);
        if let Some(referer) = referer {
            media = media.with_referer(referer);
        }

        let pb = self.create_progress_bar("Fetching manifest...");
        let summary = self.inspect_media(&media).await;
        pb.finish_and_clear();

        let output = OutputManager::new(self.config.colored_output)
            .format_manifest(&summary?, output.unwrap_or(self.config.default_output_format))?;
        write_output(&output, None)
    }

    async fn inspect_media(&self, media: &PlaybackMedia) -> Result<ManifestSummary> {
        match timeout(self.timeout, manifest::inspect(self.session.as_ref(), media)).await {
            Ok(summary) => Ok(summary?),
            Err(_) => Err(CliError::timeout(self.timeout.as_secs())),
        }
    }

    fn create_progress_bar(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Wraps a bare embed URL into an episode; the referer doubles as the parent page.
fn build_episode(url: &str, server: &str, referer: Option<&str>) -> Result<Episode> {
    let target = Url::parse(url)?;
    if !matches!(target.scheme(), "http" | "https") {
        return Err(CliError::invalid_input(format!(
            "unsupported scheme '{}', expected http or https",
            target.scheme()
        )));
    }
    if server.trim().is_empty() {
        return Err(CliError::invalid_input("server name must not be empty"));
    }

    let parent_link = match referer {
        Some(referer) => Url::parse(referer)?,
        None => target.clone(),
    };
    let parent = AnimeReference::new(server, parent_link, CLI_SOURCE);
    let link = EpisodeLink::new(target.path(), target.path(), server.trim(), parent);
    Ok(Episode::new(link, target))
}
