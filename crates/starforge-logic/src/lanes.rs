//! Warp lane pair collection with canonical deduplication.
//!
//! A lane between two stars is undirected, so each unordered endpoint pair
//! must yield at most one lane no matter which endpoint the scan visits
//! first, and no matter how the star list is chunked. The canonical key
//! orders endpoints by lower x (then lower y), and the dedup set is owned by
//! the caller so it spans every chunk of one network build.

use std::collections::HashSet;

use crate::spatial::{IndexedPoint, NeighborFinder};

/// Canonical endpoint key: `(x1, y1, x2, y2)` with the endpoints ordered by
/// x, then y. Coordinates are rounded to whole units, matching stored star
/// positions.
pub type PairKey = (i64, i64, i64, i64);

/// An accepted lane between two stars.
#[derive(Debug, Clone, PartialEq)]
pub struct GatePair {
    pub source_id: u64,
    pub dest_id: u64,
    pub source_x: f64,
    pub source_y: f64,
    pub dest_x: f64,
    pub dest_y: f64,
    pub distance: f64,
}

/// Build the canonical key for an endpoint pair.
pub fn canonical_key(ax: f64, ay: f64, bx: f64, by: f64) -> PairKey {
    let a = (ax.round() as i64, ay.round() as i64);
    let b = (bx.round() as i64, by.round() as i64);
    if a <= b {
        (a.0, a.1, b.0, b.1)
    } else {
        (b.0, b.1, a.0, a.1)
    }
}

/// Collect deduplicated lane pairs for `stars`.
///
/// Each star considers its `max_per_star` nearest neighbors within
/// `max_distance`. `seen` carries canonical keys across chunked calls; a key
/// already present yields no pair but still occupies one of the star's
/// neighbor slots.
pub fn collect_gate_pairs(
    stars: &[IndexedPoint],
    finder: &NeighborFinder,
    max_distance: f64,
    max_per_star: usize,
    seen: &mut HashSet<PairKey>,
) -> Vec<GatePair> {
    let mut pairs = Vec::new();
    for star in stars {
        let neighbors = finder.find_neighbors(star.x, star.y, max_distance, Some(star.id));
        for neighbor in neighbors.into_iter().take(max_per_star) {
            let key = canonical_key(star.x, star.y, neighbor.x, neighbor.y);
            if !seen.insert(key) {
                continue;
            }
            pairs.push(GatePair {
                source_id: star.id,
                dest_id: neighbor.id,
                source_x: star.x,
                source_y: star.y,
                dest_x: neighbor.x,
                dest_y: neighbor.y,
                distance: neighbor.distance,
            });
        }
    }
    pairs
}
