//! Groups command - find clusters of saved places.

use clap::Args;

use placewatch::groups::{find_nearby_groups, GroupConfig};
use placewatch::storage::{load_places, load_settings};

use super::open_store;
use crate::error::CliError;

/// Arguments for the groups command.
#[derive(Debug, Args)]
pub struct GroupsArgs {
    /// Number of places per group
    #[arg(long, default_value_t = 3)]
    pub size: usize,

    /// Maximum pairwise distance within a group, in meters
    #[arg(long, default_value_t = 1000.0)]
    pub max_distance: f64,
}

/// Run the groups command.
pub fn run(args: GroupsArgs) -> Result<(), CliError> {
    if args.size == 0 {
        return Err(CliError::Config("group size must be at least 1".to_string()));
    }
    if !(args.max_distance.is_finite() && args.max_distance > 0.0) {
        return Err(CliError::Config(
            "max distance must be a positive number of meters".to_string(),
        ));
    }

    let store = open_store()?;
    let settings = load_settings(&store)?;
    let places = load_places(&store, settings.default_radius_m)?;

    let config = GroupConfig {
        group_size: args.size,
        max_distance_m: args.max_distance,
    };
    let groups = find_nearby_groups(&places, &config);

    if groups.is_empty() {
        println!(
            "No groups of {} places within {:.0}m of each other.",
            config.group_size, config.max_distance_m
        );
        return Ok(());
    }

    println!(
        "Found {} group(s) of {} places within {:.0}m:",
        groups.len(),
        config.group_size,
        config.max_distance_m
    );
    println!();
    for (idx, group) in groups.iter().enumerate() {
        println!("Group {}:", idx + 1);
        for place in group {
            println!("  {}  {}", place.name, place.center);
        }
        println!();
    }
    Ok(())
}
