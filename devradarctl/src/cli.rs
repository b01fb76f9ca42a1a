use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "devradarctl",
    version,
    about = "Find developers near a position and watch for new ones"
)]
pub struct Cli {
    /// Client config file (TOML or JSON); overrides DEVRADAR_CONFIG_PATH
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "DEVRADAR_SERVER_URL")]
    pub server: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one proximity search and print the devs found
    Search(SearchArgs),
    /// Search, then keep printing newly registered devs until Ctrl-C
    Watch(SearchArgs),
    /// Print the effective client configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Latitude of the search center in degrees
    #[arg(
        long,
        env = "DEVRADAR_LATITUDE",
        allow_hyphen_values = true,
        requires = "lon"
    )]
    pub lat: Option<f64>,

    /// Longitude of the search center in degrees
    #[arg(
        long,
        env = "DEVRADAR_LONGITUDE",
        allow_hyphen_values = true,
        requires = "lat"
    )]
    pub lon: Option<f64>,

    /// Comma separated techs, passed to the server as typed
    #[arg(long, default_value = "")]
    pub techs: String,

    /// Print devs as JSON instead of one line each
    #[arg(long)]
    pub json: bool,
}
