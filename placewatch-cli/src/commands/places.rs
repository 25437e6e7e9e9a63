//! Places command - manage the persisted place list.

use clap::Subcommand;

use placewatch::storage::{load_places, load_settings, save_places};
use placewatch::{GeoPoint, Place, PlaceId};

use super::open_store;
use crate::error::CliError;

/// Places subcommands.
#[derive(Debug, Subcommand)]
pub enum PlacesCommands {
    /// List all saved places
    List,

    /// Save a new place
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,

        /// Notification radius in meters (defaults to the configured radius)
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Delete a place by id
    Remove {
        /// Place id as shown by `places list`
        id: String,
    },
}

/// Run a places subcommand.
pub fn run(command: PlacesCommands) -> Result<(), CliError> {
    match command {
        PlacesCommands::List => run_list(),
        PlacesCommands::Add {
            name,
            lat,
            lon,
            radius,
        } => run_add(name, lat, lon, radius),
        PlacesCommands::Remove { id } => run_remove(&id),
    }
}

fn run_list() -> Result<(), CliError> {
    let store = open_store()?;
    let settings = load_settings(&store)?;
    let places = load_places(&store, settings.default_radius_m)?;

    if places.is_empty() {
        println!("No saved places.");
        return Ok(());
    }

    println!("Saved Places");
    println!("============");
    println!();
    for place in &places {
        println!(
            "  {}  {}  {}  radius {:.0}m",
            place.id, place.name, place.center, place.radius_m
        );
    }
    println!();
    println!("{} place(s)", places.len());
    Ok(())
}

fn run_add(name: String, lat: f64, lon: f64, radius: Option<f64>) -> Result<(), CliError> {
    if !(lat.is_finite() && lon.is_finite()) {
        return Err(CliError::Config(
            "latitude and longitude must be finite numbers".to_string(),
        ));
    }

    let store = open_store()?;
    let settings = load_settings(&store)?;
    let mut places = load_places(&store, settings.default_radius_m)?;

    // A missing or invalid radius falls back to the configured default.
    let place = Place::new(
        name,
        GeoPoint::new(lat, lon),
        radius.unwrap_or(settings.default_radius_m),
        settings.default_radius_m,
    );

    println!(
        "Saved {} at {} with radius {:.0}m (id {})",
        place.name, place.center, place.radius_m, place.id
    );
    places.push(place);
    save_places(&store, &places)?;
    Ok(())
}

fn run_remove(id: &str) -> Result<(), CliError> {
    let store = open_store()?;
    let settings = load_settings(&store)?;
    let mut places = load_places(&store, settings.default_radius_m)?;

    let target = PlaceId::from(id);
    let before = places.len();
    places.retain(|p| p.id != target);

    if places.len() == before {
        return Err(CliError::Config(format!("no place with id '{}'", id)));
    }

    save_places(&store, &places)?;
    println!("Removed place {}", id);
    Ok(())
}
