use clap::{Parser, Subcommand, ValueEnum};
use episode_resolver::Purpose;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "resolver",
    about = "Resolve anime episode pages on third-party video hosts into playable media URLs",
    version,
    author
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Proxy URL (supports http, https, socks5)
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// Proxy username (if proxy requires authentication)
    #[arg(long, global = true)]
    pub proxy_username: Option<String>,

    /// Proxy password (if proxy requires authentication)
    #[arg(long, global = true)]
    pub proxy_password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve an embed page into a playable media descriptor
    Resolve {
        /// The embed page hosting the player
        #[arg(short, long)]
        url: String,

        /// Server name as shown by the anime site (e.g. "MyCloud", "Fembed")
        #[arg(short, long)]
        server: String,

        /// What the media is going to be used for
        #[arg(short, long, value_parser = clap::value_parser!(Purpose))]
        purpose: Option<Purpose>,

        /// Page the embed is linked from, sent as referer
        #[arg(long)]
        referer: Option<String>,

        /// The cookies to use for the requests
        #[arg(long)]
        cookies: Option<String>,

        /// Also fetch and summarize the HLS manifest of segmented media
        #[arg(long)]
        inspect: bool,

        /// Output format
        #[arg(short, long)]
        output: Option<OutputFormat>,

        /// Save output to file
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// List supported servers and what they are recommended for
    Servers {
        /// Only list servers recommended for this purpose
        #[arg(short, long, value_parser = clap::value_parser!(Purpose))]
        purpose: Option<Purpose>,

        /// Output format
        #[arg(short, long)]
        output: Option<OutputFormat>,
    },

    /// Summarize an HLS manifest
    Inspect {
        /// Manifest URL
        #[arg(short, long)]
        url: String,

        /// Referer required by the CDN
        #[arg(long)]
        referer: Option<String>,

        /// Output format
        #[arg(short, long)]
        output: Option<OutputFormat>,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Show configuration information
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty-printed human-readable output
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// Compact JSON output
    JsonCompact,
    /// Table format
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonCompact => write!(f, "json-compact"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}
