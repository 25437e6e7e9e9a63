//! Key-value persistence for the place list and settings.
//!
//! The unit of persistence is the whole document: the full place list is
//! written on every change and reloaded at session start. Entry/exit state
//! is session-scoped and deliberately has no representation here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::place::{sanitize_radius, Place};
use crate::settings::AppSettings;

/// Storage key for the place list document.
pub const PLACES_KEY: &str = "places";

/// Storage key for the settings document.
pub const SETTINGS_KEY: &str = "settings";

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// A stored document could not be parsed.
    #[error("invalid stored document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// No platform data directory could be determined.
    #[error("no data directory available on this platform")]
    NoDataDir,
}

/// Minimal key-value store.
///
/// Keys are short identifiers; values are serialized documents.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Key-value store keeping one JSON document per key in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform data directory (`…/placewatch`).
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = dirs::data_dir()
            .ok_or(StorageError::NoDataDir)?
            .join("placewatch");
        Ok(Self::new(dir))
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Load the persisted place list. A missing document is an empty list.
///
/// Radii are sanitized against `default_radius_m` on the way in, so a
/// hand-edited or corrupted-by-degrees document cannot smuggle a
/// non-positive radius into evaluation.
pub fn load_places(
    store: &dyn KeyValueStore,
    default_radius_m: f64,
) -> Result<Vec<Place>, StorageError> {
    let Some(text) = store.get(PLACES_KEY)? else {
        return Ok(Vec::new());
    };
    let mut places: Vec<Place> = serde_json::from_str(&text)?;
    for place in &mut places {
        place.radius_m = sanitize_radius(place.radius_m, default_radius_m);
    }
    Ok(places)
}

/// Persist the full place list.
pub fn save_places(store: &dyn KeyValueStore, places: &[Place]) -> Result<(), StorageError> {
    let text = serde_json::to_string_pretty(places)?;
    store.set(PLACES_KEY, &text)
}

/// Load settings, falling back to defaults for a missing document or
/// missing fields.
pub fn load_settings(store: &dyn KeyValueStore) -> Result<AppSettings, StorageError> {
    match store.get(SETTINGS_KEY)? {
        Some(text) => Ok(serde_json::from_str(&text)?),
        None => Ok(AppSettings::default()),
    }
}

/// Persist the settings document.
pub fn save_settings(
    store: &dyn KeyValueStore,
    settings: &AppSettings,
) -> Result<(), StorageError> {
    let text = serde_json::to_string_pretty(settings)?;
    store.set(SETTINGS_KEY, &text)
}
