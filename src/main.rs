mod cli;
mod commands;
mod config;
mod paths;
mod resource;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::ProviderConfig;
use std::io;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub config: ProviderConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity; stderr only, stdout carries responses
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();

    let config = ProviderConfig::load(cli.config.as_deref())?;

    let ctx = Context {
        quiet: cli.quiet,
        config,
    };

    match cli.command {
        Command::Serve => commands::serve::run(&ctx),
        Command::Schema => commands::schema::run(&ctx),
        Command::Invoke { request } => commands::invoke::run(&ctx, &request),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "file-provider", &mut io::stdout());
            Ok(())
        }
    }
}
