//! Shared, mutable store of monitored places.
//!
//! The store is the authoritative list of regions. The UI layer mutates it
//! (add/remove), the evaluation engine only reads it, taking a fresh snapshot
//! on every pass so concurrent edits between passes are always observed.

use std::sync::Arc;

use parking_lot::RwLock;

use super::{Place, PlaceId};

/// Clonable handle to the shared place list.
///
/// Cloning is cheap; all clones observe the same underlying collection.
#[derive(Debug, Clone, Default)]
pub struct PlaceStore {
    inner: Arc<RwLock<Vec<Place>>>,
}

impl PlaceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with an initial list (session reload).
    pub fn with_places(places: Vec<Place>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(places)),
        }
    }

    /// Append a place to the list.
    pub fn add(&self, place: Place) {
        self.inner.write().push(place);
    }

    /// Remove a place by id. Returns true if something was removed.
    pub fn remove(&self, id: &PlaceId) -> bool {
        let mut places = self.inner.write();
        let before = places.len();
        places.retain(|p| &p.id != id);
        places.len() != before
    }

    /// Replace the entire list (bulk reload from storage).
    pub fn replace(&self, places: Vec<Place>) {
        *self.inner.write() = places;
    }

    /// Point-in-time copy of the current list, in insertion order.
    pub fn snapshot(&self) -> Vec<Place> {
        self.inner.read().clone()
    }

    /// Look up a single place by id.
    pub fn get(&self, id: &PlaceId) -> Option<Place> {
        self.inner.read().iter().find(|p| &p.id == id).cloned()
    }

    /// Case-insensitive substring search over place names.
    pub fn search(&self, keyword: &str) -> Vec<Place> {
        let needle = keyword.to_lowercase();
        self.inner
            .read()
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Number of places currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
