//! The generation stages.
//!
//! Each stage implements [`Generator`]: a name, the names of the stages it
//! depends on, and a `generate` that reads and writes rows through the store.
//! Stages communicate through the store, not through shared state; the
//! orchestrator only sequences them and collects their results.

use crate::config::GenerationConfig;
use crate::metrics::GenerationResult;
use crate::store::Store;
use crate::tables::GalaxyRow;

mod defense;
mod mineral;
mod mirror;
mod planetary;
mod precursor;
mod sector_grid;
mod star_field;
mod trading;
mod warp_gates;

pub use defense::DefenseNetworkGenerator;
pub use mineral::MineralDepositGenerator;
pub use mirror::MirrorUniverseGenerator;
pub use planetary::PlanetarySystemGenerator;
pub use precursor::PrecursorContentGenerator;
pub use sector_grid::SectorGridGenerator;
pub use star_field::StarFieldGenerator;
pub use trading::TradingInfrastructureGenerator;
pub use warp_gates::WarpGateNetworkGenerator;

/// Stage names, used for dependency wiring and RNG stream tags.
pub mod stages {
    pub const STAR_FIELD: &str = "star_field";
    pub const PLANETARY_SYSTEMS: &str = "planetary_systems";
    pub const SECTOR_GRID: &str = "sector_grid";
    pub const WARP_GATE_NETWORK: &str = "warp_gate_network";
    pub const MINERAL_DEPOSITS: &str = "mineral_deposits";
    pub const DEFENSE_NETWORK: &str = "defense_network";
    pub const TRADING_INFRASTRUCTURE: &str = "trading_infrastructure";
    pub const PRECURSOR_CONTENT: &str = "precursor_content";
    pub const MIRROR_UNIVERSE: &str = "mirror_universe";
}

/// One stage of the generation pipeline.
pub trait Generator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Names of stages that must run before this one.
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    fn generate(
        &self,
        store: &mut dyn Store,
        galaxy: &GalaxyRow,
        config: &GenerationConfig,
    ) -> GenerationResult;
}
