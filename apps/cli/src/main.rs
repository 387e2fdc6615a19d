#![allow(clippy::print_stderr, clippy::print_stdout, unreachable_pub)]

mod args;
mod handlers;

use crate::args::{Cli, Commands};
use anyhow::{Context, Result};
use clap::Parser;
use trip_kernel::config::load_app_config;
use trip_kernel::domain::config::AppConfig;
use trip_logger::{LevelFilter, Logger};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut bootstrap = Logger::builder().name(env!("CARGO_BIN_NAME"));
    if let Some(directives) = &cli.log_level {
        bootstrap = bootstrap.env_filter(directives.as_str());
    }
    let mut config = bootstrap
        .scoped(|| load_app_config(cli.config.as_deref()))?
        .context("Critical: Configuration is malformed")?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    if let Some(endpoint) = cli.endpoint {
        config.submission.endpoint = endpoint;
    }

    let _log = init_logging(&config, cli.log_level)?;

    match cli.command {
        Commands::Status { json } => handlers::status::show(&config, json).await,
        Commands::Check { field, value } => {
            handlers::check::check_field(&config, field, &value).await
        },
        Commands::Register(args) => handlers::register::register(&config, args).await,
    }
}

fn init_logging(config: &AppConfig, directives: Option<String>) -> Result<Logger> {
    let logging = &config.logging;
    let level: LevelFilter = logging
        .level
        .parse()
        .with_context(|| format!("Unknown log level '{}'", logging.level))?;

    let mut builder =
        Logger::builder().name(env!("CARGO_BIN_NAME")).level(level).json(logging.json);
    if let Some(directives) = directives {
        builder = builder.env_filter(directives);
    }
    if let Some(directory) = &logging.directory {
        builder = builder.directory(directory);
    }

    Ok(builder.init()?)
}
