#![allow(clippy::print_stderr, clippy::print_stdout)]

pub mod handlers;
pub mod models;
pub mod services;

use crate::handlers::{consumer, keygen, vendor};
use crate::models::args::{Cli, Commands};

use anyhow::Result;
use clap::Parser;
use sigil_kernel::config::load_config;
use sigil_kernel::domain::config::{LoggingConfig, SigilConfig};
use sigil_logger::Logger;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config: SigilConfig = load_config(cli.config.as_deref())?;
    let _logger = init_logger(&config.logging, cli.log_level.as_deref())?;

    let licensing = &config.licensing;
    match cli.command {
        Commands::Keygen { secret, force } => {
            keygen::generate_keyset(licensing, secret.as_deref(), force)?;
        },
        Commands::Issue(args) => vendor::issue_license(licensing, args)?,
        Commands::Install { path } => consumer::install(licensing, &path)?,
        Commands::View { verify } => consumer::view(licensing, verify)?,
        Commands::Verify {} => consumer::verify(licensing)?,
        Commands::Uninstall {} => consumer::uninstall(licensing)?,
        Commands::Subject {} => consumer::subject(licensing),
    }

    Ok(())
}

fn init_logger(config: &LoggingConfig, level: Option<&str>) -> Result<Logger> {
    let mut builder =
        Logger::builder().name("sigil").level_str(level.unwrap_or(&config.level))?.json(config.json);
    if let Some(filter) = &config.filter {
        builder = builder.env_filter(filter);
    }
    if let Some(directory) = &config.directory {
        builder = builder.path(directory);
    }
    Ok(builder.init()?)
}
