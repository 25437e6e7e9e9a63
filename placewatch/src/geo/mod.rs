//! Great-circle distance calculation.
//!
//! Provides the haversine distance between two WGS84 coordinates. Every
//! membership decision in the evaluation engine rests on this function, so
//! the formula is fixed and covered by property tests.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic point in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates are finite numbers.
    ///
    /// No range validation is performed anywhere in this module; callers are
    /// expected to supply valid WGS84 coordinates. Finiteness is the one
    /// property the evaluation engine checks before trusting a distance.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two points in meters (haversine formula).
///
/// ```text
/// a = sin²(Δφ/2) + cos(φ1)·cos(φ2)·sin²(Δλ/2)
/// c = 2·atan2(√a, √(1−a))
/// d = R·c
/// ```
///
/// Pure and deterministic. Garbage in, garbage out: out-of-range inputs
/// produce meaningless (but finite) results, non-finite inputs produce NaN.
#[inline]
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::new(37.2458, 127.0567);
        assert_eq!(haversine_distance_m(p, p), 0.0);
    }

    #[test]
    fn test_known_distance_seoul_to_busan() {
        // Seoul City Hall to Busan City Hall, roughly 320km great-circle.
        let seoul = GeoPoint::new(37.5663, 126.9779);
        let busan = GeoPoint::new(35.1798, 129.0750);

        let d = haversine_distance_m(seoul, busan);
        assert!(
            (d - 320_000.0).abs() < 10_000.0,
            "Expected ~320km, got {:.0}m",
            d
        );
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // One degree of latitude on the mean-radius sphere is R·π/180.
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);

        let expected = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        let d = haversine_distance_m(a, b);
        assert!(
            (d - expected).abs() < 0.001,
            "Expected {:.3}m, got {:.3}m",
            expected,
            d
        );
    }

    #[test]
    fn test_nan_input_propagates() {
        let a = GeoPoint::new(f64::NAN, 0.0);
        let b = GeoPoint::new(0.0, 0.0);
        assert!(haversine_distance_m(a, b).is_nan());
        assert!(!a.is_finite());
    }

    #[test]
    fn test_display_precision() {
        let p = GeoPoint::new(37.2458, 127.0567);
        assert_eq!(p.to_string(), "(37.245800, 127.056700)");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_identity(
                lat in -90.0..90.0_f64,
                lon in -180.0..180.0_f64
            ) {
                let p = GeoPoint::new(lat, lon);
                prop_assert_eq!(haversine_distance_m(p, p), 0.0);
            }

            #[test]
            fn test_symmetry(
                lat1 in -90.0..90.0_f64,
                lon1 in -180.0..180.0_f64,
                lat2 in -90.0..90.0_f64,
                lon2 in -180.0..180.0_f64
            ) {
                let a = GeoPoint::new(lat1, lon1);
                let b = GeoPoint::new(lat2, lon2);

                let ab = haversine_distance_m(a, b);
                let ba = haversine_distance_m(b, a);
                prop_assert!(
                    (ab - ba).abs() < 1e-6,
                    "distance not symmetric: {} vs {}",
                    ab, ba
                );
            }

            #[test]
            fn test_non_negative_and_bounded(
                lat1 in -90.0..90.0_f64,
                lon1 in -180.0..180.0_f64,
                lat2 in -90.0..90.0_f64,
                lon2 in -180.0..180.0_f64
            ) {
                let d = haversine_distance_m(
                    GeoPoint::new(lat1, lon1),
                    GeoPoint::new(lat2, lon2),
                );

                // Half the circumference is the largest great-circle distance.
                let max = EARTH_RADIUS_M * std::f64::consts::PI;
                prop_assert!(d >= 0.0, "negative distance {}", d);
                prop_assert!(d <= max + 1.0, "distance {} exceeds half circumference", d);
            }
        }
    }
}
