mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod ui;

use anyhow::{Context as _, Result};
use catalog::Catalog;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub catalog: Catalog,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
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
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "openboot", &mut io::stdout());
        return Ok(());
    }

    let catalog = Catalog::embedded().context("Embedded package catalog is invalid")?;
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        catalog,
    };

    match cli.command {
        Command::Snapshot(args) => commands::snapshot::run(&ctx, &args),
        Command::Clean(args) => commands::clean::run(&ctx, &args),
        Command::Install(args) => commands::install::run(&ctx, &args),
        Command::Presets => commands::presets::run(&ctx),
        Command::State(args) => commands::state::run(&ctx, &args),
        Command::Completions { .. } => Ok(()),
    }
}
