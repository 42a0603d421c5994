//! `vinscan`: scan VIN QR codes and check them against the record store.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use vinscan_config::{ConfigLoad, ConfigLoader, ConfigSource, logging};

mod backend;
mod cli;
mod commands;

use backend::Backend;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(logging::CLI_LOG_DEFAULT);

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.global.config {
        loader = loader.with_path(path);
    }
    if cli.global.no_env_file {
        loader = loader.skip_env_file();
    }
    let ConfigLoad {
        mut config,
        source,
        env_file_loaded,
    } = loader.load().context("failed to load configuration")?;

    if env_file_loaded {
        info!("loaded .env file");
    }
    match &source {
        ConfigSource::Default => info!("no config file found, using defaults"),
        ConfigSource::EnvPath(path) => {
            info!(path = %path.display(), "config loaded from VINSCAN_CONFIG_PATH")
        }
        ConfigSource::File(path) => info!(path = %path.display(), "config loaded from file"),
    }

    cli.global.apply(&mut config);
    if let Command::Scan(args) = &cli.command {
        args.apply(&mut config);
    }
    config.validate().context("invalid configuration")?;

    let remote = cli.global.store.is_none();
    for warning in config.warnings(remote) {
        match &warning.hint {
            Some(hint) => warn!(message = %warning.message, hint = %hint, "configuration warning"),
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    let backend = Backend::connect(&config, cli.global.store.as_deref()).await?;
    let color = !cli.global.no_color;

    match cli.command {
        Command::Scan(args) => commands::scan::run(args, &config, &backend, color).await,
        Command::Check(args) => commands::check::run(args, &config, &backend, color).await,
        Command::Enroll(args) => commands::enroll::run(args, &backend).await,
    }
}
