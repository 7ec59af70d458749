mod cli;
mod commands;
mod common;

use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Command;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", common::FAILURE_ICON.red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let global = &cli.global;
    match cli.command {
        Command::Install => commands::install::execute(global).await,
        Command::Uninstall => commands::uninstall::execute(global).await,
        Command::Start => commands::control::start(global).await,
        Command::Stop => commands::control::stop(global).await,
        Command::Restart => commands::control::restart(global).await,
        Command::Logs => commands::logs::execute(global).await,
        Command::View(args) => commands::view::execute(global, args).await,
        Command::Id(args) => commands::id::execute(global, args).await,
        Command::Add(args) => commands::packages::add(global, args).await,
        Command::Remove(args) => commands::packages::remove(global, args).await,
        Command::Rebuild(args) => commands::packages::rebuild(global, args).await,
    }
}
