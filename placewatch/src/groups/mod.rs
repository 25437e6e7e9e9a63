//! Nearby place group finder.
//!
//! Offline batch utility that searches a place-list snapshot for groups of
//! places that all sit within a mutual distance of each other: "these three
//! spots are close together, visit them in one trip". Runs over a snapshot,
//! entirely independent of the live tracker.

use crate::geo::haversine_distance_m;
use crate::place::Place;

/// Group search parameters.
#[derive(Debug, Clone, Copy)]
pub struct GroupConfig {
    /// Exact number of places per group.
    pub group_size: usize,
    /// Maximum pairwise distance within a group, in meters.
    pub max_distance_m: f64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            group_size: 3,
            max_distance_m: 1000.0,
        }
    }
}

/// Find all groups of exactly `config.group_size` places whose pairwise
/// great-circle distances are all within `config.max_distance_m`.
///
/// Combinations are generated forward-only over the snapshot's order, so
/// each group of places appears at most once. Cost grows combinatorially
/// with the list size; intended for the tens-of-places scale of a personal
/// place list.
pub fn find_nearby_groups(places: &[Place], config: &GroupConfig) -> Vec<Vec<Place>> {
    let mut groups = Vec::new();
    if config.group_size == 0 || places.len() < config.group_size {
        return groups;
    }

    let mut current: Vec<usize> = Vec::with_capacity(config.group_size);
    collect_groups(places, config, 0, &mut current, &mut groups);
    groups
}

fn collect_groups(
    places: &[Place],
    config: &GroupConfig,
    start: usize,
    current: &mut Vec<usize>,
    groups: &mut Vec<Vec<Place>>,
) {
    if current.len() == config.group_size {
        if all_mutually_near(places, current, config.max_distance_m) {
            groups.push(current.iter().map(|&i| places[i].clone()).collect());
        }
        return;
    }
    if start >= places.len() {
        return;
    }

    current.push(start);
    collect_groups(places, config, start + 1, current, groups);
    current.pop();

    collect_groups(places, config, start + 1, current, groups);
}

fn all_mutually_near(places: &[Place], indices: &[usize], max_distance_m: f64) -> bool {
    for (pos, &i) in indices.iter().enumerate() {
        for &j in &indices[pos + 1..] {
            let d = haversine_distance_m(places[i].center, places[j].center);
            if !(d <= max_distance_m) {
                return false;
            }
        }
    }
    true
}
