mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands},
    commands::{CommandExecutor, ResolveOptions},
    config::AppConfig,
    error::{CliError, Result},
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use episode_resolver::resolver::ProxyConfig;
use std::process;
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        error!("Application error: {}", e);
        #[cfg(feature = "colored-output")]
        {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", "Hint:".yellow().bold(), hint);
            }
        }
        #[cfg(not(feature = "colored-output"))]
        {
            eprintln!("Error: {}", e);
            if let Some(hint) = e.hint() {
                eprintln!("Hint: {}", hint);
            }
        }
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet)?;

    // Subcommands that never touch the network
    match &args.command {
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            return Ok(());
        }
        Commands::Config { show, reset } => {
            if *reset {
                AppConfig::reset(args.config.as_deref())?;
                println!("✓ Configuration reset to defaults");
            } else if *show {
                let config = AppConfig::load(args.config.as_deref())?;
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
            return Ok(());
        }
        _ => {}
    }

    let config = AppConfig::load(args.config.as_deref())?;
    info!("Starting resolver with config: {:?}", config);

    let proxy = args.proxy.map(|url| ProxyConfig {
        url,
        username: args.proxy_username,
        password: args.proxy_password,
    });
    let cookies = match &args.command {
        Commands::Resolve { cookies, .. } => cookies.clone(),
        _ => None,
    };
    let executor = CommandExecutor::new(config, args.timeout, proxy, cookies.as_deref())?;

    match args.command {
        Commands::Resolve {
            url,
            server,
            purpose,
            referer,
            cookies: _,
            inspect,
            output,
            output_file,
        } => {
            executor
                .resolve(ResolveOptions {
                    url: &url,
                    server: &server,
                    purpose,
                    referer: referer.as_deref(),
                    inspect,
                    output,
                    output_file: output_file.as_deref(),
                })
                .await?;
        }

        Commands::Servers { purpose, output } => {
            executor.list_servers(purpose, output)?;
        }

        Commands::Inspect {
            url,
            referer,
            output,
        } => {
            executor.inspect(&url, referer.as_deref(), output).await?;
        }

        Commands::Completions { .. } | Commands::Config { .. } => {
            return Err(CliError::invalid_input("command already handled"));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .with(filter)
        .init();

    Ok(())
}
