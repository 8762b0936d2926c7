mod cli;
mod config;
mod logging;
mod render;
mod session;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use jobwatch_core::JobHandle;
use jobwatch_logging::watch_info;

use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let (mut config, source) = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    if cli.print_config {
        println!("{}", config.to_ron()?);
        return Ok(ExitCode::SUCCESS);
    }

    let level = jobwatch_logging::raise_level(config.level()?, cli.verbose);
    logging::initialize(config.log_destination, level);
    match &source {
        Some(path) => watch_info!("Loaded config from {:?}", path),
        None => watch_info!("No config file found; using defaults"),
    }

    let handle = cli.handle.context("a job handle is required")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let outcome = runtime.block_on(session::run(&config, JobHandle::from(handle), !cli.no_wait));
    // A pending stdin read must not keep the process alive.
    runtime.shutdown_background();
    Ok(outcome?.exit_code())
}
