//! Warp gate network generation.
//!
//! Two networks share one canonical dedup set:
//! - core: active gates between core stars within the tier's adjacency
//!   threshold, up to 6 per star;
//! - outer: dormant hidden gates between frontier stars within the outer
//!   max distance, up to 2 per star, requiring sensor level 3 to activate.
//!
//! After both insert, a fraction of the final active gates is flipped hidden
//! so explorers still have something to find in the core.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use serde_json::json;

use starforge_logic::lanes::{collect_gate_pairs, GatePair, PairKey};
use starforge_logic::spatial::{IndexedPoint, NeighborFinder};

use crate::bulk;
use crate::config::GenerationConfig;
use crate::generators::{stages, Generator};
use crate::metrics::{GenerationMetrics, GenerationResult};
use crate::store::{PoiFilter, Store};
use crate::tables::{GalaxyRow, GateKind, GateStatus, PoiType, Region, WarpGateRow};

/// Gate inserts run in wider chunks than row inserts; the rows are narrow.
const GATE_CHUNK_SIZE: usize = 1000;

pub struct WarpGateNetworkGenerator;

impl Generator for WarpGateNetworkGenerator {
    fn name(&self) -> &'static str {
        stages::WARP_GATE_NETWORK
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[stages::STAR_FIELD]
    }

    fn generate(
        &self,
        store: &mut dyn Store,
        galaxy: &GalaxyRow,
        config: &GenerationConfig,
    ) -> GenerationResult {
        let mut metrics = GenerationMetrics::start();
        let mut rng = config.stage_rng(stages::WARP_GATE_NETWORK);
        let mut seen: HashSet<PairKey> = HashSet::new();

        // Core active network.
        let core_stars = star_points(store, galaxy.id, Region::Core);
        let adjacency = config.gate_adjacency();
        let finder = NeighborFinder::build(&core_stars, adjacency * 2.0);
        let core_pairs = collect_gate_pairs(
            &core_stars,
            &finder,
            adjacency,
            config.max_gates_per_star,
            &mut seen,
        );
        let core_rows: Vec<WarpGateRow> = core_pairs
            .iter()
            .map(|p| gate_row(galaxy.id, p, GateStatus::Active, false, None))
            .collect();
        let core_inserted = match bulk::insert_gates_ignoring(store, core_rows, GATE_CHUNK_SIZE) {
            Ok(n) => n,
            Err(e) => return GenerationResult::failure(metrics, e.to_string()),
        };
        metrics.set_count("core_gates_created", core_inserted as u64);

        // Outer dormant network.
        let outer_stars = star_points(store, galaxy.id, Region::Outer);
        let outer_finder =
            NeighborFinder::build(&outer_stars, config.outer_gate_max_distance * 2.0);
        let outer_pairs = collect_gate_pairs(
            &outer_stars,
            &outer_finder,
            config.outer_gate_max_distance,
            config.outer_max_gates_per_star,
            &mut seen,
        );
        let requirement = json!({
            "type": "sensor_level",
            "value": 3,
            "description": "Dormant gate. Requires sensor level 3 to detect and activate.",
        });
        let outer_rows: Vec<WarpGateRow> = outer_pairs
            .iter()
            .map(|p| gate_row(galaxy.id, p, GateStatus::Dormant, true, Some(requirement.clone())))
            .collect();
        let outer_inserted = match bulk::insert_gates_ignoring(store, outer_rows, GATE_CHUNK_SIZE) {
            Ok(n) => n,
            Err(e) => return GenerationResult::failure(metrics, e.to_string()),
        };
        metrics.set_count("outer_gates_created", outer_inserted as u64);

        // Flip a fraction of the final active network hidden.
        let active_gates: Vec<u64> = store
            .gates(galaxy.id)
            .into_iter()
            .filter(|g| g.status == GateStatus::Active && !g.is_hidden)
            .map(|g| g.id)
            .collect();
        let hidden_target =
            (active_gates.len() as f64 * config.hidden_gate_fraction).ceil() as usize;
        let flipped: Vec<u64> = active_gates
            .choose_multiple(&mut rng, hidden_target.min(active_gates.len()))
            .copied()
            .collect();
        let hidden = store.hide_gates(&flipped);
        metrics.set_count("gates_hidden", hidden as u64);

        metrics.set_count("gates_created", (core_inserted + outer_inserted) as u64);
        GenerationResult::success(metrics)
    }
}

fn star_points(store: &dyn Store, galaxy_id: u64, region: Region) -> Vec<IndexedPoint> {
    store
        .pois(
            galaxy_id,
            &PoiFilter::default().of_type(PoiType::Star).in_region(region),
        )
        .into_iter()
        .map(|p| IndexedPoint {
            id: p.id,
            x: p.x,
            y: p.y,
        })
        .collect()
}

fn gate_row(
    galaxy_id: u64,
    pair: &GatePair,
    status: GateStatus,
    hidden: bool,
    activation_requirements: Option<serde_json::Value>,
) -> WarpGateRow {
    WarpGateRow {
        id: 0,
        galaxy_id,
        source_poi_id: pair.source_id,
        destination_poi_id: pair.dest_id,
        source_x: pair.source_x,
        source_y: pair.source_y,
        dest_x: pair.dest_x,
        dest_y: pair.dest_y,
        distance: pair.distance,
        status,
        gate_kind: GateKind::Standard,
        is_hidden: hidden,
        activation_requirements,
    }
}
