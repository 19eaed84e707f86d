//! Generation configuration.
//!
//! One typed struct covers everything the pipeline needs; tier-derived
//! defaults come from [`GenerationConfig::from_tier`], and individual fields
//! can be overridden before the run. The master seed drives every stage
//! through derived per-stage RNG streams, so a (tier, seed) pair always
//! produces the same galaxy and the streams do not shift when an unrelated
//! stage changes its draw count.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use starforge_logic::geometry::Bounds;
use starforge_logic::tiers::SizeTier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub tier: SizeTier,
    /// Display name; a pool name is drawn when absent.
    pub name: Option<String>,
    /// Master seed for all placement and synthesis randomness.
    pub seed: u64,
    /// Minimum spacing between core stars.
    pub core_min_spacing: f64,
    /// Minimum spacing between outer stars.
    pub outer_min_spacing: f64,
    /// Per-star cap for the core active gate network.
    pub max_gates_per_star: usize,
    /// Per-star cap for the outer dormant network.
    pub outer_max_gates_per_star: usize,
    /// Neighbor threshold for the outer dormant network.
    pub outer_gate_max_distance: f64,
    /// Fraction of final active gates flipped hidden.
    pub hidden_gate_fraction: f64,
    /// Bulk write chunk size.
    pub chunk_size: usize,
    /// Whether the precursor content stage places anything.
    pub include_precursors: bool,
    /// Whether the mirror universe stage creates a mirror.
    pub include_mirror: bool,
}

impl GenerationConfig {
    pub fn from_tier(tier: SizeTier, seed: u64) -> Self {
        Self {
            tier,
            name: None,
            seed,
            core_min_spacing: 15.0,
            outer_min_spacing: 25.0,
            max_gates_per_star: 6,
            outer_max_gates_per_star: 2,
            outer_gate_max_distance: 200.0,
            hidden_gate_fraction: 0.02,
            chunk_size: crate::bulk::DEFAULT_CHUNK_SIZE,
            include_precursors: true,
            include_mirror: true,
        }
    }

    /// Config for the mirror of a galaxy generated with `self`: same tier
    /// and seed, denser and stranger gate network, no nested mirror.
    pub fn mirror_config(&self) -> Self {
        Self {
            max_gates_per_star: 8,
            hidden_gate_fraction: 0.05,
            include_precursors: false,
            include_mirror: false,
            name: None,
            ..self.clone()
        }
    }

    pub fn dimensions(&self) -> (f64, f64) {
        (self.tier.outer_size(), self.tier.outer_size())
    }

    pub fn outer_bounds(&self) -> Bounds {
        self.tier.outer_bounds()
    }

    pub fn core_bounds(&self) -> Bounds {
        self.tier.core_bounds()
    }

    pub fn grid_size(&self) -> u32 {
        self.tier.grid_size()
    }

    pub fn gate_adjacency(&self) -> f64 {
        self.tier.gate_adjacency()
    }

    /// Derive the RNG stream for one stage from the master seed and the
    /// stage tag.
    pub fn stage_rng(&self, stage: &str) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ fnv1a(stage.as_bytes()))
    }
}

// FNV-1a; stable across platforms and runs, unlike the std hasher.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
