//! Monitored places (geofence regions).
//!
//! A [`Place`] is a named circular region: a WGS84 center plus a notification
//! radius in meters. Places carry only persisted attributes; entry/exit
//! membership is tracked separately by [`crate::tracker`] so that store
//! mutations can never leak session state into storage.

mod store;

pub use store::PlaceStore;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

/// Opaque unique identifier for a place.
///
/// Assigned at creation, immutable, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlaceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlaceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A monitored place: center + notification radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Unique identifier.
    pub id: PlaceId,
    /// User-supplied display label.
    pub name: String,
    /// Region center (immutable after creation).
    pub center: GeoPoint,
    /// Notification radius in meters (always positive and finite).
    pub radius_m: f64,
}

impl Place {
    /// Create a new place with a generated id.
    ///
    /// `radius_m` is sanitized: zero, negative, or non-finite values fall
    /// back to `default_radius_m`, matching how invalid user input is
    /// handled at creation time.
    pub fn new(
        name: impl Into<String>,
        center: GeoPoint,
        radius_m: f64,
        default_radius_m: f64,
    ) -> Self {
        Self {
            id: PlaceId::generate(),
            name: name.into(),
            center,
            radius_m: sanitize_radius(radius_m, default_radius_m),
        }
    }

    /// Create a place with an explicit id (reload from storage, tests).
    pub fn with_id(
        id: impl Into<PlaceId>,
        name: impl Into<String>,
        center: GeoPoint,
        radius_m: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            center,
            radius_m,
        }
    }

    /// Whether center and radius are usable for distance evaluation.
    pub fn is_evaluable(&self) -> bool {
        self.center.is_finite() && self.radius_m.is_finite() && self.radius_m > 0.0
    }
}

/// Sanitize a user-supplied radius, falling back to the default.
pub fn sanitize_radius(radius_m: f64, default_radius_m: f64) -> f64 {
    if radius_m.is_finite() && radius_m > 0.0 {
        radius_m
    } else {
        default_radius_m
    }
}
