use crate::{cli::OutputFormat, error::Result};
#[cfg(feature = "colored-output")]
use colored::*;
use episode_resolver::resolver::ParserRegistration;
use episode_resolver::resolver::manifest::{ManifestKind, ManifestSummary};
use episode_resolver::{PlaybackMedia, Purpose};
use std::borrow::Cow;
use std::io::Write;
#[cfg(feature = "table-output")]
use tabled::{Table, Tabled, settings::Style};

pub struct OutputManager {
    colored: bool,
}

impl OutputManager {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn format_media(
        &self,
        media: &PlaybackMedia,
        manifest: Option<&ManifestSummary>,
        format: OutputFormat,
    ) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_media_pretty(media, manifest)),
            OutputFormat::Json => {
                Self::to_json(&serde_json::json!({ "media": media, "manifest": manifest }), true)
            }
            OutputFormat::JsonCompact => {
                Self::to_json(&serde_json::json!({ "media": media, "manifest": manifest }), false)
            }
            #[cfg(feature = "table-output")]
            OutputFormat::Table => Ok(Self::format_media_table(media, manifest)),
            #[cfg(not(feature = "table-output"))]
            OutputFormat::Table => Ok(self.format_media_pretty(media, manifest)),
        }
    }

    pub fn format_manifest(&self, manifest: &ManifestSummary, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Self::to_json(manifest, true),
            OutputFormat::JsonCompact => Self::to_json(manifest, false),
            _ => {
                let mut output = String::new();
                self.push_manifest(&mut output, manifest);
                Ok(output)
            }
        }
    }

    pub fn format_servers(
        &self,
        registrations: &[&ParserRegistration],
        format: OutputFormat,
    ) -> Result<String> {
        match format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                let entries: Vec<_> = registrations
                    .iter()
                    .map(|r| {
                        let fitness = r.parser.fitness();
                        serde_json::json!({
                            "name": r.canonical_name,
                            "aliases": r.aliases,
                            "playback": fitness.playback,
                            "download": fitness.download,
                            "remote_cast": fitness.remote_cast,
                        })
                    })
                    .collect();
                Self::to_json(&entries, format == OutputFormat::Json)
            }
            #[cfg(feature = "table-output")]
            OutputFormat::Table => Ok(Self::format_servers_table(registrations)),
            _ => {
                let mut output = String::new();
                output.push_str(&self.colorize("Supported servers:", &Color::Green, true));
                output.push('\n');
                for registration in registrations {
                    let recommended: Vec<&str> = Purpose::ALL
                        .iter()
                        .filter(|p| registration.parser.is_recommended(**p))
                        .map(|p| p.as_str())
                        .collect();
                    let recommended = if recommended.is_empty() {
                        Cow::Borrowed("defunct")
                    } else {
                        Cow::Owned(recommended.join(", "))
                    };
                    output.push_str(&format!(
                        "  {} [{}]",
                        self.colorize(&registration.canonical_name, &Color::Cyan, true),
                        recommended
                    ));
                    if !registration.aliases.is_empty() {
                        output.push_str(&format!(
                            " {} {}",
                            self.colorize("aka", &Color::Yellow, false),
                            registration.aliases.join(", ")
                        ));
                    }
                    output.push('\n');
                }
                Ok(output)
            }
        }
    }

    fn format_media_pretty(&self, media: &PlaybackMedia, manifest: Option<&ManifestSummary>) -> String {
        let mut output = String::new();

        output.push_str(&self.colorize("Resolved Media:", &Color::Green, true));
        output.push('\n');
        self.push_field(&mut output, "Server", media.episode().server(), &Color::Cyan);
        self.push_field(&mut output, "URL", media.url().as_str(), &Color::Blue);
        self.push_field(&mut output, "Content Type", media.content_type(), &Color::Cyan);
        let kind = if media.is_segmented() {
            "segmented"
        } else {
            "progressive"
        };
        self.push_field(&mut output, "Delivery", kind, &Color::Cyan);

        if !media.headers().is_empty() {
            output.push_str(&format!(
                "  {}:\n",
                self.colorize("Headers", &Color::Yellow, false)
            ));
            for (key, value) in media.headers() {
                output.push_str(&format!(
                    "    {}: {}\n",
                    self.colorize(key, &Color::Green, false),
                    self.colorize(value, &Color::Cyan, false)
                ));
            }
        }

        if let Some(manifest) = manifest {
            output.push('\n');
            self.push_manifest(&mut output, manifest);
        }

        output
    }

    fn push_manifest(&self, output: &mut String, manifest: &ManifestSummary) {
        output.push_str(&self.colorize("Manifest:", &Color::Green, true));
        output.push('\n');
        self.push_field(output, "URL", manifest.url.as_str(), &Color::Blue);

        match manifest.kind {
            ManifestKind::Master => {
                self.push_field(output, "Kind", "master", &Color::Cyan);
                for variant in &manifest.variants {
                    let resolution = variant
                        .resolution
                        .map(|(w, h)| format!("{w}x{h}"))
                        .unwrap_or_else(|| "?".to_string());
                    output.push_str(&format!(
                        "    {} {} kbps  {}\n",
                        self.colorize(&resolution, &Color::Yellow, false),
                        variant.bandwidth / 1000,
                        self.colorize(variant.url.as_str(), &Color::Blue, false)
                    ));
                }
            }
            ManifestKind::Media => {
                self.push_field(output, "Kind", "media", &Color::Cyan);
                self.push_field(output, "Segments", &manifest.segment_count.to_string(), &Color::Cyan);
                self.push_field(
                    output,
                    "Duration",
                    &format!("{:.1}s", manifest.total_duration),
                    &Color::Cyan,
                );
                self.push_field(output, "VOD", &manifest.is_vod.to_string(), &Color::Cyan);
                self.push_field(
                    output,
                    "Encrypted",
                    &manifest.is_encrypted.to_string(),
                    &Color::Cyan,
                );
            }
        }
        self.push_field(
            output,
            "Downloadable",
            &manifest.is_downloadable().to_string(),
            &Color::Cyan,
        );
    }

    fn push_field(&self, output: &mut String, label: &str, value: &str, color: &Color) {
        output.push_str(&format!(
            "  {}: {}\n",
            self.colorize(label, &Color::Yellow, false),
            self.colorize(value, color, false)
        ));
    }

    fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
        let mut result = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        result.push('\n');
        Ok(result)
    }

    #[cfg(feature = "table-output")]
    fn format_media_table(media: &PlaybackMedia, manifest: Option<&ManifestSummary>) -> String {
        #[derive(Tabled)]
        struct TableRow<'a> {
            property: &'a str,
            value: Cow<'a, str>,
        }

        let mut rows = vec![
            TableRow {
                property: "Server",
                value: Cow::Borrowed(media.episode().server()),
            },
            TableRow {
                property: "URL",
                value: Cow::Borrowed(media.url().as_str()),
            },
            TableRow {
                property: "Content Type",
                value: Cow::Borrowed(media.content_type()),
            },
            TableRow {
                property: "Segmented",
                value: Cow::Owned(media.is_segmented().to_string()),
            },
        ];

        for (key, value) in media.headers() {
            rows.push(TableRow {
                property: key,
                value: Cow::Borrowed(value),
            });
        }

        if let Some(manifest) = manifest {
            if let Some(best) = manifest.best_variant() {
                rows.push(TableRow {
                    property: "Best Variant",
                    value: Cow::Borrowed(best.url.as_str()),
                });
            }
            rows.push(TableRow {
                property: "Downloadable",
                value: Cow::Owned(manifest.is_downloadable().to_string()),
            });
        }

        let mut table = Table::new(rows).with(Style::modern()).to_string();
        table.push('\n');
        table
    }

    #[cfg(feature = "table-output")]
    fn format_servers_table(registrations: &[&ParserRegistration]) -> String {
        #[derive(Tabled)]
        struct ServerRow<'a> {
            name: &'a str,
            aliases: String,
            playback: bool,
            download: bool,
            cast: bool,
        }

        let rows = registrations.iter().map(|r| {
            let fitness = r.parser.fitness();
            ServerRow {
                name: &r.canonical_name,
                aliases: r.aliases.join(", "),
                playback: fitness.playback,
                download: fitness.download,
                cast: fitness.remote_cast,
            }
        });

        let mut table = Table::new(rows).with(Style::modern()).to_string();
        table.push('\n');
        table
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Blue => text.blue(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (self.colored, color, bold);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
}

pub fn write_output(content: &str, output_file: Option<&std::path::Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        None => {
            print!("{content}");
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}
