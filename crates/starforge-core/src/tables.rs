//! Row types stored through the persistence sink.
//!
//! Every row type derives serde so snapshots and attribute payloads work the
//! same way across backends. Ids are assigned by the store on insert; rows
//! are built with `id: 0`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use starforge_logic::bodies::PlanetKind;
use starforge_logic::tiers::SizeTier;

/// Milliseconds since the Unix epoch, for row timestamps.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Galaxy lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalaxyStatus {
    Draft,
    Generating,
    Active,
    Failed,
}

/// Which region of the galaxy a POI belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Core,
    Outer,
}

/// Point-of-interest types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiType {
    Star,
    Terrestrial,
    Lava,
    GasGiant,
    IceGiant,
    SuperEarth,
    Ocean,
    Moon,
    AsteroidBelt,
    Derelict,
}

impl From<PlanetKind> for PoiType {
    fn from(kind: PlanetKind) -> Self {
        match kind {
            PlanetKind::Terrestrial => PoiType::Terrestrial,
            PlanetKind::Lava => PoiType::Lava,
            PlanetKind::GasGiant => PoiType::GasGiant,
            PlanetKind::IceGiant => PoiType::IceGiant,
            PlanetKind::SuperEarth => PoiType::SuperEarth,
            PlanetKind::Ocean => PoiType::Ocean,
        }
    }
}

/// Warp gate lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Active,
    Dormant,
    Precursor,
}

/// What kind of gate this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    Standard,
    /// Hidden precursor portal, self-referencing until the mirror exists.
    MirrorPortal,
    /// Prime-side entry into the mirror universe.
    MirrorEntry,
    /// Mirror-side return gate back to the prime universe.
    MirrorReturn,
}

/// System defense installation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseKind {
    OrbitalCannon,
    SpaceLaser,
    GroundMissile,
    PlanetaryShield,
    FighterPort,
}

impl DefenseKind {
    pub const FORTRESS_PACKAGE: [DefenseKind; 5] = [
        DefenseKind::OrbitalCannon,
        DefenseKind::SpaceLaser,
        DefenseKind::GroundMissile,
        DefenseKind::PlanetaryShield,
        DefenseKind::FighterPort,
    ];

    pub fn base_health(&self) -> u32 {
        match self {
            DefenseKind::OrbitalCannon => 500,
            DefenseKind::SpaceLaser => 300,
            DefenseKind::GroundMissile => 200,
            DefenseKind::PlanetaryShield => 10_000,
            DefenseKind::FighterPort => 1_000,
        }
    }

    /// How many of this installation a fortress system carries.
    pub fn fortress_quantity(&self) -> u32 {
        match self {
            DefenseKind::OrbitalCannon => 4,
            DefenseKind::SpaceLaser => 2,
            DefenseKind::GroundMissile => 6,
            DefenseKind::PlanetaryShield => 1,
            DefenseKind::FighterPort => 1,
        }
    }
}

/// One galaxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalaxyRow {
    pub id: u64,
    pub name: String,
    pub tier: SizeTier,
    pub width: f64,
    pub height: f64,
    pub seed: u64,
    pub status: GalaxyStatus,
    /// Set on a mirror galaxy, pointing at its prime.
    pub mirror_of: Option<u64>,
    /// Set on a prime galaxy once its mirror exists.
    pub mirror_galaxy_id: Option<u64>,
    pub generation_started_at: Option<u64>,
    pub generation_completed_at: Option<u64>,
}

/// One point of interest: star, planetary body, or derelict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiRow {
    pub id: u64,
    pub galaxy_id: u64,
    pub parent_poi_id: Option<u64>,
    /// 1-based orbital slot for children of a star or planet.
    pub orbital_index: Option<u32>,
    pub poi_type: PoiType,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub region: Region,
    pub sector_id: Option<u64>,
    pub is_inhabited: bool,
    pub is_hidden: bool,
    pub is_fortified: bool,
    pub attributes: Value,
    pub mineral_deposits: Option<Value>,
}

/// One sector of the grid overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorRow {
    pub id: u64,
    pub galaxy_id: u64,
    pub name: String,
    pub grid_x: u32,
    pub grid_y: u32,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub danger_level: u32,
}

/// One warp gate. Endpoint coordinates are denormalized onto the row so the
/// canonical uniqueness key needs no join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarpGateRow {
    pub id: u64,
    pub galaxy_id: u64,
    pub source_poi_id: u64,
    pub destination_poi_id: u64,
    pub source_x: f64,
    pub source_y: f64,
    pub dest_x: f64,
    pub dest_y: f64,
    pub distance: f64,
    pub status: GateStatus,
    pub gate_kind: GateKind,
    pub is_hidden: bool,
    pub activation_requirements: Option<Value>,
}

/// One trading hub attached to an inhabited star.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingHubRow {
    pub id: u64,
    pub galaxy_id: u64,
    pub poi_id: u64,
    pub name: String,
    pub tax_rate: f64,
    pub services: Vec<String>,
    pub attributes: Value,
}

/// One defense installation attached to an inhabited star.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemDefenseRow {
    pub id: u64,
    pub galaxy_id: u64,
    pub poi_id: u64,
    pub defense_kind: DefenseKind,
    pub level: u32,
    pub quantity: u32,
    pub health: u32,
    pub max_health: u32,
    pub is_active: bool,
}
