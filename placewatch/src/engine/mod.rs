//! Geofence evaluation engine.
//!
//! On every position sample the engine re-evaluates membership for every
//! monitored place and emits edge-triggered transition events: exactly one
//! [`GeofenceEvent`] per boundary crossing, no matter how many samples
//! arrive while the user stays inside or outside.
//!
//! The engine exclusively owns the session's [`EntryStateTracker`]. It reads
//! the [`PlaceStore`] afresh on each pass and prunes tracker state against
//! it, so places added or removed between passes are picked up without any
//! coordination.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::feed::PositionSample;
use crate::geo::haversine_distance_m;
use crate::place::{Place, PlaceId, PlaceStore};
use crate::tracker::EntryStateTracker;

/// An edge-triggered boundary crossing.
#[derive(Debug, Clone, PartialEq)]
pub enum GeofenceEvent {
    /// The position moved from outside to inside the region.
    Entry {
        /// The region that was entered.
        place: Place,
        /// Distance from the sample to the region center, in meters.
        distance_m: f64,
    },
    /// The position moved from inside to outside the region.
    Exit {
        /// The region that was left.
        place: Place,
        /// Distance from the sample to the region center, in meters.
        distance_m: f64,
    },
}

impl GeofenceEvent {
    /// The region this event concerns.
    pub fn place(&self) -> &Place {
        match self {
            GeofenceEvent::Entry { place, .. } | GeofenceEvent::Exit { place, .. } => place,
        }
    }

    /// Instantaneous distance to the region center when the event fired.
    pub fn distance_m(&self) -> f64 {
        match self {
            GeofenceEvent::Entry { distance_m, .. } | GeofenceEvent::Exit { distance_m, .. } => {
                *distance_m
            }
        }
    }

    /// Whether this is an entry transition.
    pub fn is_entry(&self) -> bool {
        matches!(self, GeofenceEvent::Entry { .. })
    }
}

/// Evaluates position samples against the monitored places.
#[derive(Debug)]
pub struct GeofenceEngine {
    store: PlaceStore,
    tracker: EntryStateTracker,
}

impl GeofenceEngine {
    /// Create an engine observing `store`. Entry state starts empty: every
    /// session re-observes membership instead of assuming it.
    pub fn new(store: PlaceStore) -> Self {
        Self {
            store,
            tracker: EntryStateTracker::new(),
        }
    }

    /// Evaluate one position sample against every monitored place.
    ///
    /// Returns the transitions this sample caused, in store order. Runs to
    /// completion synchronously; callers serialize invocations so each pass
    /// sees consistent tracker state.
    ///
    /// Boundary is inclusive: a distance exactly equal to the radius counts
    /// as inside. A place with malformed data is skipped with a warning and
    /// never aborts evaluation of its siblings.
    pub fn on_sample(&mut self, sample: &PositionSample) -> Vec<GeofenceEvent> {
        let places = self.store.snapshot();

        // Keep tracker entries in lockstep with the store, tolerating
        // out-of-band add/delete between passes.
        let valid_ids: HashSet<PlaceId> = places.iter().map(|p| p.id.clone()).collect();
        self.tracker.prune(&valid_ids);

        let position = sample.point();
        let mut events = Vec::new();

        for place in places {
            if !place.is_evaluable() {
                warn!(
                    place = %place.id,
                    name = %place.name,
                    "skipping place with malformed center or radius"
                );
                continue;
            }

            let distance_m = haversine_distance_m(position, place.center);
            if !distance_m.is_finite() {
                warn!(
                    place = %place.id,
                    name = %place.name,
                    "skipping place with non-finite distance"
                );
                continue;
            }

            let was_entered = self.tracker.get(&place.id);
            let is_inside = distance_m <= place.radius_m;

            if is_inside && !was_entered {
                self.tracker.set(place.id.clone(), true);
                debug!(place = %place.name, distance_m, "entry transition");
                events.push(GeofenceEvent::Entry { place, distance_m });
            } else if !is_inside && was_entered {
                self.tracker.set(place.id.clone(), false);
                debug!(place = %place.name, distance_m, "exit transition");
                events.push(GeofenceEvent::Exit { place, distance_m });
            }
        }

        events
    }

    /// Read-only view of the session's entry state.
    pub fn tracker(&self) -> &EntryStateTracker {
        &self.tracker
    }

    /// The observed place store.
    pub fn store(&self) -> &PlaceStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPoint, EARTH_RADIUS_M};

    /// Degrees of latitude spanning `meters` on the mean-radius sphere.
    fn lat_degrees(meters: f64) -> f64 {
        meters / (EARTH_RADIUS_M * std::f64::consts::PI / 180.0)
    }

    /// A sample `meters` due north of `center`.
    fn sample_at(center: GeoPoint, meters: f64) -> PositionSample {
        PositionSample::new(center.latitude + lat_degrees(meters), center.longitude, 5.0)
    }

    fn test_center() -> GeoPoint {
        GeoPoint::new(37.2458, 127.0567)
    }

    fn store_with(places: Vec<Place>) -> PlaceStore {
        PlaceStore::with_places(places)
    }

    #[test]
    fn test_approach_enter_dwell_leave() {
        // Region p1, radius 100m; samples at 150m, 80m, 80m, 200m.
        let center = test_center();
        let store = store_with(vec![Place::with_id("p1", "Mangpo", center, 100.0)]);
        let mut engine = GeofenceEngine::new(store);

        let events = engine.on_sample(&sample_at(center, 150.0));
        assert!(events.is_empty(), "still outside, no event");

        let events = engine.on_sample(&sample_at(center, 80.0));
        assert_eq!(events.len(), 1);
        assert!(events[0].is_entry());
        assert!((events[0].distance_m() - 80.0).abs() < 0.01);

        let events = engine.on_sample(&sample_at(center, 80.0));
        assert!(events.is_empty(), "repeat inside sample must not re-fire");

        let events = engine.on_sample(&sample_at(center, 200.0));
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_entry());
        assert!((events[0].distance_m() - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let center = test_center();
        let sample = sample_at(center, 100.0);

        // Pin the radius to the measured distance so the comparison is exact.
        let measured = haversine_distance_m(sample.point(), center);
        let store = store_with(vec![Place::with_id("p1", "Edge", center, measured)]);
        let mut engine = GeofenceEngine::new(store);

        let events = engine.on_sample(&sample);
        assert_eq!(events.len(), 1, "d == radius counts as inside");
        assert!(events[0].is_entry());

        // Any smaller radius puts the same sample outside.
        let store = store_with(vec![Place::with_id(
            "p2",
            "JustUnder",
            center,
            measured - 1e-6,
        )]);
        let mut engine = GeofenceEngine::new(store);
        assert!(engine.on_sample(&sample).is_empty());
    }

    #[test]
    fn test_entry_fires_exactly_once() {
        let center = test_center();
        let store = store_with(vec![Place::with_id("p1", "Home", center, 100.0)]);
        let mut engine = GeofenceEngine::new(store);

        let mut total = 0;
        for _ in 0..5 {
            total += engine.on_sample(&sample_at(center, 50.0)).len();
        }
        assert_eq!(total, 1, "one entry across five inside samples");
    }

    #[test]
    fn test_delete_clears_state_and_readd_starts_outside() {
        let center = test_center();
        let store = store_with(vec![Place::with_id("p1", "Home", center, 100.0)]);
        let mut engine = GeofenceEngine::new(store.clone());

        engine.on_sample(&sample_at(center, 50.0));
        assert!(engine.tracker().get(&PlaceId::from("p1")));

        // Delete while inside: next pass prunes the state, no exit fires.
        store.remove(&PlaceId::from("p1"));
        let events = engine.on_sample(&sample_at(center, 50.0));
        assert!(events.is_empty(), "deleting a region never emits an exit");
        assert_eq!(engine.tracker().tracked_count(), 0);

        // Re-add with the same id: fresh object, fresh state, entry re-fires.
        store.add(Place::with_id("p1", "Home again", center, 100.0));
        let events = engine.on_sample(&sample_at(center, 50.0));
        assert_eq!(events.len(), 1);
        assert!(events[0].is_entry());
    }

    #[test]
    fn test_regions_evaluate_independently() {
        // A (radius 50) and B (radius 500) share a center; a sample at 200m
        // is inside B only.
        let center = test_center();
        let store = store_with(vec![
            Place::with_id("a", "Small", center, 50.0),
            Place::with_id("b", "Large", center, 500.0),
        ]);
        let mut engine = GeofenceEngine::new(store);

        let events = engine.on_sample(&sample_at(center, 200.0));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].place().id.as_str(), "b");

        // Moving to 30m enters A as well; B stays entered with no repeat.
        let events = engine.on_sample(&sample_at(center, 30.0));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].place().id.as_str(), "a");
    }

    #[test]
    fn test_malformed_region_does_not_abort_siblings() {
        let center = test_center();
        let store = store_with(vec![
            Place::with_id("bad", "Broken", GeoPoint::new(f64::NAN, 127.0), 100.0),
            Place::with_id("good", "Works", center, 100.0),
        ]);
        let mut engine = GeofenceEngine::new(store);

        let events = engine.on_sample(&sample_at(center, 50.0));
        assert_eq!(events.len(), 1, "healthy sibling still evaluates");
        assert_eq!(events[0].place().id.as_str(), "good");
    }

    #[test]
    fn test_all_regions_evaluated_every_sample() {
        // Three separated regions; one sample inside all of them at once
        // (radius large enough) must emit three entries.
        let center = test_center();
        let store = store_with(vec![
            Place::with_id("a", "A", center, 10_000.0),
            Place::with_id("b", "B", GeoPoint::new(37.25, 127.06), 10_000.0),
            Place::with_id("c", "C", GeoPoint::new(37.24, 127.05), 10_000.0),
        ]);
        let mut engine = GeofenceEngine::new(store);

        let events = engine.on_sample(&sample_at(center, 0.0));
        assert_eq!(events.len(), 3, "no early exit across regions");
        assert!(events.iter().all(|e| e.is_entry()));
    }

    #[test]
    fn test_empty_store_is_a_no_op() {
        let mut engine = GeofenceEngine::new(PlaceStore::new());
        let events = engine.on_sample(&sample_at(test_center(), 0.0));
        assert!(events.is_empty());
        assert_eq!(engine.tracker().tracked_count(), 0);
    }
}
