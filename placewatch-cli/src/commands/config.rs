//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path`
//! for viewing and modifying settings from the command line.

use std::str::FromStr;

use clap::Subcommand;

use placewatch::storage::{load_settings, save_settings};
use placewatch::AppSettings;

use super::open_store;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g. default_radius)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. default_radius)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration storage path
    Path,
}

/// The known settings keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigKey {
    DefaultRadius,
    NotifyOnEnter,
    NotifyOnExit,
}

impl ConfigKey {
    fn all() -> [ConfigKey; 3] {
        [
            ConfigKey::DefaultRadius,
            ConfigKey::NotifyOnEnter,
            ConfigKey::NotifyOnExit,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigKey::DefaultRadius => "default_radius",
            ConfigKey::NotifyOnEnter => "notify_on_enter",
            ConfigKey::NotifyOnExit => "notify_on_exit",
        }
    }

    fn get(&self, settings: &AppSettings) -> String {
        match self {
            ConfigKey::DefaultRadius => format!("{:.0}", settings.default_radius_m),
            ConfigKey::NotifyOnEnter => settings.notify_on_enter.to_string(),
            ConfigKey::NotifyOnExit => settings.notify_on_exit.to_string(),
        }
    }

    fn set(&self, settings: &mut AppSettings, value: &str) -> Result<(), CliError> {
        match self {
            ConfigKey::DefaultRadius => {
                let radius: f64 = value.parse().map_err(|_| {
                    CliError::Config(format!("'{}' is not a number of meters", value))
                })?;
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(CliError::Config(
                        "default_radius must be a positive number of meters".to_string(),
                    ));
                }
                settings.default_radius_m = radius;
            }
            ConfigKey::NotifyOnEnter => {
                settings.notify_on_enter = parse_bool(value)?;
            }
            ConfigKey::NotifyOnExit => {
                settings.notify_on_exit = parse_bool(value)?;
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default_radius" => Ok(ConfigKey::DefaultRadius),
            "notify_on_enter" => Ok(ConfigKey::NotifyOnEnter),
            "notify_on_exit" => Ok(ConfigKey::NotifyOnExit),
            _ => Err(()),
        }
    }
}

fn parse_bool(value: &str) -> Result<bool, CliError> {
    match value {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        _ => Err(CliError::Config(format!(
            "'{}' is not a boolean (use true/false)",
            value
        ))),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'placewatch config list' to see available keys.",
            key
        ))
    })
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let store = open_store()?;
    let settings = load_settings(&store)?;
    println!("{}", config_key.get(&settings));
    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let store = open_store()?;
    let mut settings = load_settings(&store)?;

    config_key.set(&mut settings, value)?;
    save_settings(&store, &settings)?;

    println!("Set {} = {}", config_key.name(), config_key.get(&settings));
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let store = open_store()?;
    let settings = load_settings(&store)?;

    println!("Configuration Settings");
    println!("======================");
    println!();
    for key in ConfigKey::all() {
        println!("  {} = {}", key.name(), key.get(&settings));
    }
    Ok(())
}

fn run_path() -> Result<(), CliError> {
    let store = open_store()?;
    println!("{}", store.dir().display());
    Ok(())
}
