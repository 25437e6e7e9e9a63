//! CLI command implementations.

pub mod config;
pub mod groups;
pub mod places;
pub mod watch;

use placewatch::storage::JsonFileStore;

use crate::error::CliError;

/// Open the default on-disk store shared by all commands.
pub fn open_store() -> Result<JsonFileStore, CliError> {
    Ok(JsonFileStore::open_default()?)
}
