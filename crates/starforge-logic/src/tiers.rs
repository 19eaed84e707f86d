//! Galaxy size tiers — dimensions, star counts, and derived thresholds.
//!
//! | Tier    | Outer Bounds | Core Bounds | Core Stars | Outer Stars | Total |
//! |---------|--------------|-------------|------------|-------------|-------|
//! | Small   | 500×500      | 250×250     | 100        | 150         | 250   |
//! | Medium  | 1500×1500    | 750×750     | 300        | 450         | 750   |
//! | Large   | 2500×2500    | 1250×1250   | 500        | 750         | 1250  |
//! | Massive | 5000×5000    | 2500×2500   | 1000       | 1500        | 2500  |
//!
//! The massive tier is internal (load testing) and excluded from public
//! listings.

use serde::{Deserialize, Serialize};

use crate::geometry::Bounds;

/// The four galaxy size tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTier {
    Small,
    Medium,
    Large,
    Massive,
}

impl SizeTier {
    /// Tiers offered for public galaxy creation. Massive is internal only.
    pub fn public_tiers() -> &'static [SizeTier] {
        &[SizeTier::Small, SizeTier::Medium, SizeTier::Large]
    }

    /// Outer bounds (width and height) in galaxy units.
    pub fn outer_size(&self) -> f64 {
        match self {
            SizeTier::Small => 500.0,
            SizeTier::Medium => 1500.0,
            SizeTier::Large => 2500.0,
            SizeTier::Massive => 5000.0,
        }
    }

    /// Core region size; the core square is centered in the galaxy.
    pub fn core_size(&self) -> f64 {
        self.outer_size() / 2.0
    }

    pub fn outer_bounds(&self) -> Bounds {
        Bounds::from_dimensions(self.outer_size(), self.outer_size())
    }

    /// The centered core square.
    pub fn core_bounds(&self) -> Bounds {
        let offset = (self.outer_size() - self.core_size()) / 2.0;
        Bounds::new(
            offset,
            offset,
            offset + self.core_size(),
            offset + self.core_size(),
        )
    }

    /// Number of civilized stars placed in the core region.
    pub fn core_stars(&self) -> usize {
        match self {
            SizeTier::Small => 100,
            SizeTier::Medium => 300,
            SizeTier::Large => 500,
            SizeTier::Massive => 1000,
        }
    }

    /// Number of frontier stars placed in the outer region.
    pub fn outer_stars(&self) -> usize {
        match self {
            SizeTier::Small => 150,
            SizeTier::Medium => 450,
            SizeTier::Large => 750,
            SizeTier::Massive => 1500,
        }
    }

    pub fn total_stars(&self) -> usize {
        self.core_stars() + self.outer_stars()
    }

    /// Sector grid size (the galaxy is divided into grid × grid sectors).
    pub fn grid_size(&self) -> u32 {
        match self {
            SizeTier::Small => 10,
            SizeTier::Medium => 15,
            SizeTier::Large => 20,
            SizeTier::Massive => 25,
        }
    }

    /// Warp gate adjacency threshold: max dimension / 15.
    pub fn gate_adjacency(&self) -> f64 {
        (self.outer_size() / 15.0).floor()
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeTier::Small => "Small Galaxy (500×500)",
            SizeTier::Medium => "Medium Galaxy (1500×1500)",
            SizeTier::Large => "Large Galaxy (2500×2500)",
            SizeTier::Massive => "Massive Galaxy (5000×5000)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeTier::Small => "small",
            SizeTier::Medium => "medium",
            SizeTier::Large => "large",
            SizeTier::Massive => "massive",
        }
    }
}
