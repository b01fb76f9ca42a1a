//! devradarctl: terminal front end for a devradar proximity session.

mod cli;
mod commands;
mod render;

use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;

use cli::{Cli, Command};

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // Stdout carries results only.
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("devradarctl", level)
        .filter_module("devradar_session", level)
        .filter_module("devradar_config", level)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real env vars still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if std::env::var("RUST_LOG").is_err() {
        init_logger(cli.verbose);
    } else {
        env_logger::init();
        log::debug!("Logger initialized from RUST_LOG");
    }

    let (config, source) = commands::load_config(&cli)?;

    match &cli.command {
        Command::Search(args) => commands::search(&config, args).await,
        Command::Watch(args) => commands::watch(&config, args).await,
        Command::Config => commands::show_config(&config, &source),
    }
}
