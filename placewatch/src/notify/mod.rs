//! Notification dispatch.
//!
//! Consumes transition events and decides whether to call the external
//! [`Notifier`], gated by the per-event-type settings flags read at dispatch
//! time. Delivery is fire-and-forget: a notifier failure is logged and
//! swallowed at this boundary, never propagated into the engine.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::engine::GeofenceEvent;
use crate::settings::SharedSettings;

/// Failure reported by a notification backend.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The environment refuses to show notifications.
    #[error("notifications not permitted")]
    NotPermitted,

    /// Backend-specific delivery failure.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// External notification collaborator.
///
/// Implementations may silently no-op when the environment denies
/// permission; they must not block.
pub trait Notifier: Send + Sync {
    /// Show a notification.
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Formats transition events and forwards them to the notifier.
pub struct NotificationDispatcher {
    settings: SharedSettings,
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    /// Create a dispatcher gated by `settings`.
    pub fn new(settings: SharedSettings, notifier: Arc<dyn Notifier>) -> Self {
        Self { settings, notifier }
    }

    /// Handle one transition event.
    ///
    /// Settings are consulted at dispatch time, so flag edits made while the
    /// watch is running apply to the very next event.
    pub fn dispatch(&self, event: &GeofenceEvent) {
        let settings = self.settings.current();

        let enabled = match event {
            GeofenceEvent::Entry { .. } => settings.notify_on_enter,
            GeofenceEvent::Exit { .. } => settings.notify_on_exit,
        };
        if !enabled {
            debug!(place = %event.place().name, "notification suppressed by settings");
            return;
        }

        let (title, body) = format_notification(event);
        if let Err(e) = self.notifier.notify(&title, &body) {
            // Fire-and-forget: delivery problems never become engine errors.
            warn!(place = %event.place().name, error = %e, "notification delivery failed");
        }
    }
}

/// Deterministic title/body for a transition event.
///
/// Radius is stated in whole meters, current distance to one decimal.
pub fn format_notification(event: &GeofenceEvent) -> (String, String) {
    let place = event.place();
    let distance_m = event.distance_m();
    match event {
        GeofenceEvent::Entry { .. } => (
            format!("Arrived at {}!", place.name),
            format!(
                "Entered the {:.0} m zone around {} ({:.1} m away now).",
                place.radius_m, place.name, distance_m
            ),
        ),
        GeofenceEvent::Exit { .. } => (
            format!("Left {}", place.name),
            format!(
                "Moved outside the {:.0} m zone around {} ({:.1} m away now).",
                place.radius_m, place.name, distance_m
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    use crate::geo::GeoPoint;
    use crate::place::Place;
    use crate::settings::AppSettings;

    /// Notifier that records every delivery.
    #[derive(Default)]
    struct RecordingNotifier {
        delivered: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
            self.delivered
                .lock()
                .push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    /// Notifier that always fails.
    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
            Err(NotifyError::NotPermitted)
        }
    }

    fn cafe() -> Place {
        Place::with_id("p1", "Cafe", GeoPoint::new(37.2458, 127.0567), 100.0)
    }

    fn entry_event() -> GeofenceEvent {
        GeofenceEvent::Entry {
            place: cafe(),
            distance_m: 80.21,
        }
    }

    fn exit_event() -> GeofenceEvent {
        GeofenceEvent::Exit {
            place: cafe(),
            distance_m: 200.0,
        }
    }

    #[test]
    fn test_entry_format() {
        let (title, body) = format_notification(&entry_event());
        assert_eq!(title, "Arrived at Cafe!");
        assert_eq!(
            body,
            "Entered the 100 m zone around Cafe (80.2 m away now)."
        );
    }

    #[test]
    fn test_exit_format() {
        let (title, body) = format_notification(&exit_event());
        assert_eq!(title, "Left Cafe");
        assert_eq!(
            body,
            "Moved outside the 100 m zone around Cafe (200.0 m away now)."
        );
    }

    #[test]
    fn test_dispatch_honors_enter_flag() {
        let notifier = Arc::new(RecordingNotifier::default());
        let settings = SharedSettings::with_settings(AppSettings {
            notify_on_enter: false,
            ..AppSettings::default()
        });
        let dispatcher = NotificationDispatcher::new(settings, notifier.clone());

        dispatcher.dispatch(&entry_event());
        assert!(notifier.delivered.lock().is_empty(), "entry suppressed");

        dispatcher.dispatch(&exit_event());
        assert_eq!(notifier.delivered.lock().len(), 1, "exit still delivered");
    }

    #[test]
    fn test_dispatch_honors_exit_flag() {
        let notifier = Arc::new(RecordingNotifier::default());
        let settings = SharedSettings::with_settings(AppSettings {
            notify_on_exit: false,
            ..AppSettings::default()
        });
        let dispatcher = NotificationDispatcher::new(settings, notifier.clone());

        dispatcher.dispatch(&exit_event());
        assert!(notifier.delivered.lock().is_empty());
    }

    #[test]
    fn test_settings_read_at_dispatch_time() {
        let notifier = Arc::new(RecordingNotifier::default());
        let settings = SharedSettings::new();
        let dispatcher = NotificationDispatcher::new(settings.clone(), notifier.clone());

        dispatcher.dispatch(&entry_event());
        assert_eq!(notifier.delivered.lock().len(), 1);

        settings.update(AppSettings {
            notify_on_enter: false,
            ..AppSettings::default()
        });
        dispatcher.dispatch(&entry_event());
        assert_eq!(
            notifier.delivered.lock().len(),
            1,
            "flag change applies to the next event"
        );
    }

    #[test]
    fn test_notifier_failure_is_swallowed() {
        let dispatcher = NotificationDispatcher::new(SharedSettings::new(), Arc::new(FailingNotifier));
        // Must not panic or propagate.
        dispatcher.dispatch(&entry_event());
        dispatcher.dispatch(&exit_event());
    }
}
