//! Placewatch: personal places-of-interest tracker.
//!
//! Marks geographic points with a notification radius and watches a live
//! position stream for boundary crossings, firing a local notification
//! exactly once per entry or exit transition.
//!
//! # Architecture
//!
//! ```text
//! PositionSource ──► PositionFeed ──► GeofenceEngine ──► NotificationDispatcher ──► Notifier
//!                     (normalize,      (distance +          (settings gate,
//!                      timeouts)        EntryStateTracker)   formatting)
//! ```
//!
//! The [`service::GeofenceService`] wires the pieces together and serializes
//! all evaluation on a single task. Membership state is session-scoped and
//! owned exclusively by the engine; the place list and settings are shared,
//! externally-mutable collaborators read fresh on every pass.

pub mod engine;
pub mod feed;
pub mod geo;
pub mod groups;
pub mod notify;
pub mod place;
pub mod service;
pub mod settings;
pub mod storage;
pub mod tracker;

pub use engine::{GeofenceEngine, GeofenceEvent};
pub use feed::{
    FeedConfig, PositionError, PositionFeed, PositionSample, PositionSource, PositionUpdate,
};
pub use geo::{haversine_distance_m, GeoPoint};
pub use notify::{NotificationDispatcher, Notifier, NotifyError};
pub use place::{Place, PlaceId, PlaceStore};
pub use service::GeofenceService;
pub use settings::{AppSettings, SharedSettings};
pub use tracker::EntryStateTracker;

/// Crate version, for banners and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
