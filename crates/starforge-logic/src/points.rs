//! Point placement strategies for star fields.
//!
//! Two strategies, each with its own config:
//! - [`PlacementStrategy::Spiral`] — golden-ratio spiral with jitter, used
//!   for the dense civilized core.
//! - [`PlacementStrategy::Rejection`] — uniform rejection sampling with an
//!   optional exclusion rectangle, used for the sparse frontier around the
//!   core.
//!
//! Both run under a fixed attempt budget and return fewer points than
//! requested when the bounds cannot hold them at the required spacing. The
//! caller decides whether an underfull result is acceptable.

use rand::Rng;

use crate::geometry::{Bounds, Point};

/// Config for golden-ratio spiral placement.
#[derive(Debug, Clone)]
pub struct SpiralConfig {
    /// Minimum distance between any two accepted points.
    pub min_spacing: f64,
    /// Attempt budget as a multiple of the requested count.
    pub attempt_factor: usize,
    /// Points are clamped this far inside the bounds.
    pub edge_margin: f64,
    /// Jitter amplitude as a fraction of `min_spacing`.
    pub jitter: f64,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            min_spacing: 15.0,
            attempt_factor: 10,
            edge_margin: 5.0,
            jitter: 0.5,
        }
    }
}

/// Config for uniform rejection sampling.
#[derive(Debug, Clone)]
pub struct RejectionConfig {
    /// Minimum distance between any two accepted points.
    pub min_spacing: f64,
    /// Attempt budget as a multiple of the requested count.
    pub attempt_factor: usize,
    /// Candidates are drawn this far inside the bounds.
    pub edge_margin: f64,
    /// Candidates inside this rectangle are rejected.
    pub exclusion: Option<Bounds>,
}

impl Default for RejectionConfig {
    fn default() -> Self {
        Self {
            min_spacing: 25.0,
            attempt_factor: 20,
            edge_margin: 10.0,
            exclusion: None,
        }
    }
}

/// A point placement strategy with its configuration.
#[derive(Debug, Clone)]
pub enum PlacementStrategy {
    Spiral(SpiralConfig),
    Rejection(RejectionConfig),
}

impl PlacementStrategy {
    /// Place up to `count` points inside `bounds`.
    ///
    /// May return fewer than `count` points when the attempt budget runs out.
    pub fn place(&self, count: usize, bounds: &Bounds, rng: &mut impl Rng) -> Vec<Point> {
        match self {
            PlacementStrategy::Spiral(cfg) => place_spiral(count, bounds, cfg, rng),
            PlacementStrategy::Rejection(cfg) => place_rejection(count, bounds, cfg, rng),
        }
    }
}

fn place_spiral(
    count: usize,
    bounds: &Bounds,
    cfg: &SpiralConfig,
    rng: &mut impl Rng,
) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let golden = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let angle_increment = std::f64::consts::TAU / (golden * golden);
    let center = bounds.center();
    let max_radius = bounds.width().min(bounds.height()) / 2.0 - cfg.min_spacing;
    let inner = bounds.inset(cfg.edge_margin);

    let mut points: Vec<Point> = Vec::with_capacity(count);
    let mut attempts = 0usize;
    let budget = count * cfg.attempt_factor;

    while points.len() < count && attempts < budget {
        attempts += 1;
        // Radius grows with accepted points so density stays even across
        // the disc; rejected candidates do not advance the spiral.
        let i = points.len();
        let radius = (i as f64 / count as f64).sqrt() * max_radius;
        let angle = attempts as f64 * angle_increment;

        let amplitude = cfg.min_spacing * cfg.jitter;
        let candidate = inner.clamp(Point::new(
            center.x + radius * angle.cos() + rng.gen_range(-1.0..=1.0) * amplitude,
            center.y + radius * angle.sin() + rng.gen_range(-1.0..=1.0) * amplitude,
        ));

        if has_min_spacing(&candidate, &points, cfg.min_spacing) {
            points.push(candidate);
        }
    }
    points
}

fn place_rejection(
    count: usize,
    bounds: &Bounds,
    cfg: &RejectionConfig,
    rng: &mut impl Rng,
) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let inner = bounds.inset(cfg.edge_margin);
    let mut points: Vec<Point> = Vec::with_capacity(count);
    let mut attempts = 0usize;
    let budget = count * cfg.attempt_factor;

    while points.len() < count && attempts < budget {
        attempts += 1;
        let candidate = Point::new(
            rng.gen_range(inner.x_min..=inner.x_max),
            rng.gen_range(inner.y_min..=inner.y_max),
        );

        if let Some(exclusion) = &cfg.exclusion {
            if exclusion.contains(&candidate) {
                continue;
            }
        }
        if has_min_spacing(&candidate, &points, cfg.min_spacing) {
            points.push(candidate);
        }
    }
    points
}

/// True when `candidate` is at least `min_spacing` from every accepted point.
fn has_min_spacing(candidate: &Point, accepted: &[Point], min_spacing: f64) -> bool {
    accepted
        .iter()
        .all(|p| candidate.distance_to(p) >= min_spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn min_pairwise_distance(points: &[Point]) -> f64 {
        let mut min = f64::INFINITY;
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                min = min.min(points[i].distance_to(&points[j]));
            }
        }
        min
    }

    #[test]
    fn spiral_fifty_points_in_two_hundred_square() {
        let bounds = Bounds::from_dimensions(200.0, 200.0);
        let cfg = SpiralConfig {
            min_spacing: 15.0,
            ..SpiralConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let points = PlacementStrategy::Spiral(cfg).place(50, &bounds, &mut rng);

        assert_eq!(points.len(), 50);
        assert!(min_pairwise_distance(&points) >= 15.0);
        let inner = bounds.inset(5.0);
        assert!(points.iter().all(|p| inner.contains(p)));
    }

    #[test]
    fn spiral_underfull_when_bounds_too_small() {
        let bounds = Bounds::from_dimensions(40.0, 40.0);
        let cfg = SpiralConfig {
            min_spacing: 15.0,
            ..SpiralConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let points = PlacementStrategy::Spiral(cfg).place(100, &bounds, &mut rng);

        // Budget exhausts; whatever was placed still honors spacing.
        assert!(points.len() < 100);
        assert!(min_pairwise_distance(&points) >= 15.0);
    }

    #[test]
    fn rejection_honors_exclusion_and_spacing() {
        let bounds = Bounds::from_dimensions(500.0, 500.0);
        let exclusion = Bounds::new(125.0, 125.0, 375.0, 375.0);
        let cfg = RejectionConfig {
            min_spacing: 25.0,
            exclusion: Some(exclusion),
            ..RejectionConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let points = PlacementStrategy::Rejection(cfg).place(100, &bounds, &mut rng);

        assert!(!points.is_empty());
        assert!(points.iter().all(|p| !exclusion.contains(p)));
        assert!(min_pairwise_distance(&points) >= 25.0);
        let inner = bounds.inset(10.0);
        assert!(points.iter().all(|p| inner.contains(p)));
    }

    #[test]
    fn same_seed_same_points() {
        let bounds = Bounds::from_dimensions(300.0, 300.0);
        let place = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            PlacementStrategy::Spiral(SpiralConfig::default()).place(30, &bounds, &mut rng)
        };
        assert_eq!(place(9), place(9));
        assert_ne!(place(9), place(10));
    }

    #[test]
    fn zero_count_is_empty() {
        let bounds = Bounds::from_dimensions(100.0, 100.0);
        let mut rng = StdRng::seed_from_u64(1);
        let points =
            PlacementStrategy::Rejection(RejectionConfig::default()).place(0, &bounds, &mut rng);
        assert!(points.is_empty());
    }
}
