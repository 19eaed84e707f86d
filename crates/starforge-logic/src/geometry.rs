//! Points and rectangular bounds shared by the placement algorithms.
//!
//! Pure geometry — no database dependency, works with plain structs.

use serde::{Deserialize, Serialize};

/// A 2D position in galaxy units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned rectangle, inclusive of its edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// A rectangle anchored at the origin.
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x_min + self.width() / 2.0,
            self.y_min + self.height() / 2.0,
        )
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }

    /// Shrink by `margin` on every side.
    pub fn inset(&self, margin: f64) -> Self {
        Self::new(
            self.x_min + margin,
            self.y_min + margin,
            self.x_max - margin,
            self.y_max - margin,
        )
    }

    /// Clamp a point to lie within these bounds.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.x_min, self.x_max),
            p.y.clamp(self.y_min, self.y_max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn bounds_contains_edges() {
        let b = Bounds::from_dimensions(100.0, 100.0);
        assert!(b.contains(&Point::new(0.0, 0.0)));
        assert!(b.contains(&Point::new(100.0, 100.0)));
        assert!(!b.contains(&Point::new(100.1, 50.0)));
    }

    #[test]
    fn inset_and_clamp() {
        let b = Bounds::from_dimensions(100.0, 100.0).inset(10.0);
        assert_eq!(b.x_min, 10.0);
        assert_eq!(b.x_max, 90.0);
        let p = b.clamp(Point::new(150.0, -5.0));
        assert_eq!(p.x, 90.0);
        assert_eq!(p.y, 10.0);
    }

    #[test]
    fn center_of_offset_rect() {
        let b = Bounds::new(125.0, 125.0, 375.0, 375.0);
        let c = b.center();
        assert_eq!(c.x, 250.0);
        assert_eq!(c.y, 250.0);
    }
}
