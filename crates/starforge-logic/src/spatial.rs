//! Neighbor queries over placed points.
//!
//! Two interchangeable paths that must agree exactly:
//! - [`SpatialIndex`] — uniform grid keyed by `floor(coord / cell_size)`,
//!   turning the all-pairs adjacency scan into a cell-block scan.
//! - brute force — a linear scan, cheaper below [`BRUTE_FORCE_THRESHOLD`]
//!   points where grid bookkeeping costs more than it saves.
//!
//! [`NeighborFinder`] picks between them by input size so callers never
//! choose manually.

use std::collections::HashMap;

/// A point registered in the index, identified by its row id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// A neighbor query result, sorted ascending by distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub distance: f64,
}

/// Below this point count, a linear scan beats the grid.
pub const BRUTE_FORCE_THRESHOLD: usize = 128;

/// Uniform grid spatial index.
///
/// `cell_size` must be at least the largest query radius the caller intends
/// to use, so a query only needs to scan the surrounding cell block. Builders
/// use `cell_size = 2 × adjacency threshold`.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<IndexedPoint>>,
}

impl SpatialIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn build(points: &[IndexedPoint], cell_size: f64) -> Self {
        let mut index = Self::new(cell_size);
        for p in points {
            index.insert(*p);
        }
        index
    }

    pub fn insert(&mut self, point: IndexedPoint) {
        let key = self.cell_of(point.x, point.y);
        self.cells.entry(key).or_default().push(point);
    }

    fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// All points within `max_distance` of `(x, y)`, nearest first.
    ///
    /// `exclude` drops one id from the results, so a point can query its own
    /// neighborhood without matching itself.
    pub fn find_neighbors(
        &self,
        x: f64,
        y: f64,
        max_distance: f64,
        exclude: Option<u64>,
    ) -> Vec<Neighbor> {
        let (cx, cy) = self.cell_of(x, y);
        let cell_radius = (max_distance / self.cell_size).ceil() as i64;
        let mut results = Vec::new();

        for dx in -cell_radius..=cell_radius {
            for dy in -cell_radius..=cell_radius {
                let Some(cell) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for p in cell {
                    if exclude == Some(p.id) {
                        continue;
                    }
                    let distance = ((p.x - x).powi(2) + (p.y - y).powi(2)).sqrt();
                    if distance <= max_distance {
                        results.push(Neighbor {
                            id: p.id,
                            x: p.x,
                            y: p.y,
                            distance,
                        });
                    }
                }
            }
        }
        sort_neighbors(&mut results);
        results
    }
}

/// Linear-scan neighbor query with the same contract as
/// [`SpatialIndex::find_neighbors`].
pub fn find_neighbors_brute(
    points: &[IndexedPoint],
    x: f64,
    y: f64,
    max_distance: f64,
    exclude: Option<u64>,
) -> Vec<Neighbor> {
    let mut results: Vec<Neighbor> = points
        .iter()
        .filter(|p| exclude != Some(p.id))
        .filter_map(|p| {
            let distance = ((p.x - x).powi(2) + (p.y - y).powi(2)).sqrt();
            (distance <= max_distance).then_some(Neighbor {
                id: p.id,
                x: p.x,
                y: p.y,
                distance,
            })
        })
        .collect();
    sort_neighbors(&mut results);
    results
}

// Distance ties break on id so both paths agree exactly.
fn sort_neighbors(results: &mut [Neighbor]) {
    results.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Size-adaptive neighbor finder over a fixed point set.
#[derive(Debug, Clone)]
pub enum NeighborFinder {
    Grid(SpatialIndex),
    Brute(Vec<IndexedPoint>),
}

impl NeighborFinder {
    /// Build a finder, choosing the grid only when the point count justifies
    /// it. `cell_size` should be twice the largest query radius.
    pub fn build(points: &[IndexedPoint], cell_size: f64) -> Self {
        if points.len() < BRUTE_FORCE_THRESHOLD {
            NeighborFinder::Brute(points.to_vec())
        } else {
            NeighborFinder::Grid(SpatialIndex::build(points, cell_size))
        }
    }

    pub fn find_neighbors(
        &self,
        x: f64,
        y: f64,
        max_distance: f64,
        exclude: Option<u64>,
    ) -> Vec<Neighbor> {
        match self {
            NeighborFinder::Grid(index) => index.find_neighbors(x, y, max_distance, exclude),
            NeighborFinder::Brute(points) => {
                find_neighbors_brute(points, x, y, max_distance, exclude)
            }
        }
    }
}
