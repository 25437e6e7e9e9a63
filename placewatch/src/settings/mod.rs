//! Application settings.
//!
//! Settings may be edited concurrently by the UI layer while the engine is
//! running, so consumers read the current value through [`SharedSettings`]
//! at the moment they need it rather than caching a snapshot.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Default notification radius for new places, in meters.
pub const DEFAULT_RADIUS_M: f64 = 1000.0;

/// User-configurable application settings.
///
/// `serde(default)` lets a partially-written settings document load cleanly:
/// missing fields fall back to defaults, the same merge-over-defaults
/// behavior the settings have always had.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Radius applied when a place is created without an explicit one.
    pub default_radius_m: f64,
    /// Whether entry transitions produce a notification.
    pub notify_on_enter: bool,
    /// Whether exit transitions produce a notification.
    pub notify_on_exit: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_radius_m: DEFAULT_RADIUS_M,
            notify_on_enter: true,
            notify_on_exit: true,
        }
    }
}

/// Clonable handle to settings shared between the UI layer and the engine.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<AppSettings>>,
}

impl SharedSettings {
    /// Create a handle holding the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle holding specific settings.
    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// The settings as of right now.
    pub fn current(&self) -> AppSettings {
        *self.inner.read()
    }

    /// Replace the settings.
    pub fn update(&self, settings: AppSettings) {
        *self.inner.write() = settings;
    }
}
