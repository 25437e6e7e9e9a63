//! Placewatch CLI - command-line interface
//!
//! Manages the persisted place list and runs the live geofence watch from
//! a terminal.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "placewatch",
    version,
    about = "Personal places-of-interest tracker with entry/exit notifications"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Watch the live position stream and notify on entry/exit
    Watch(commands::watch::WatchArgs),

    /// Manage the saved place list
    Places {
        #[command(subcommand)]
        command: commands::places::PlacesCommands,
    },

    /// Find groups of saved places that are close to each other
    Groups(commands::groups::GroupsArgs),

    /// View and modify settings
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Places { command } => commands::places::run(command),
        Commands::Groups(args) => commands::groups::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
