//! Precursor content.
//!
//! Two artifacts per galaxy:
//! - a hidden precursor gate on a random frontier star, self-referencing
//!   until the mirror universe exists, requiring sensor level 5;
//! - a derelict precursor vessel in interstellar void, at least 20 units
//!   from every star, falling back to the galaxy center when no isolated
//!   spot is found.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;

use starforge_logic::sectors;

use crate::config::GenerationConfig;
use crate::generators::{stages, Generator};
use crate::metrics::{GenerationMetrics, GenerationResult};
use crate::store::{OnConflict, PoiFilter, Store};
use crate::tables::{GalaxyRow, GateKind, GateStatus, PoiRow, PoiType, Region, WarpGateRow};

const MIN_DISTANCE_FROM_STARS: f64 = 20.0;
const PLACEMENT_ATTEMPTS: usize = 100;

pub struct PrecursorContentGenerator;

impl Generator for PrecursorContentGenerator {
    fn name(&self) -> &'static str {
        stages::PRECURSOR_CONTENT
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[
            stages::STAR_FIELD,
            stages::SECTOR_GRID,
            stages::WARP_GATE_NETWORK,
        ]
    }

    fn generate(
        &self,
        store: &mut dyn Store,
        galaxy: &GalaxyRow,
        config: &GenerationConfig,
    ) -> GenerationResult {
        let mut metrics = GenerationMetrics::start();
        if !config.include_precursors {
            metrics.set_count("precursor_gate_placed", 0);
            metrics.set_count("precursor_ship_placed", 0);
            return GenerationResult::success(metrics);
        }
        let mut rng = config.stage_rng(stages::PRECURSOR_CONTENT);

        let gate_placed = match place_precursor_gate(store, galaxy, &mut rng) {
            Ok(placed) => placed,
            Err(e) => return GenerationResult::failure(metrics, e),
        };
        metrics.set_count("precursor_gate_placed", gate_placed as u64);

        let ship_placed = place_precursor_ship(store, galaxy, config, &mut rng);
        metrics.set_count("precursor_ship_placed", ship_placed as u64);

        GenerationResult::success(metrics)
    }
}

fn place_precursor_gate(
    store: &mut dyn Store,
    galaxy: &GalaxyRow,
    rng: &mut impl Rng,
) -> Result<bool, String> {
    let outer_stars = store.pois(
        galaxy.id,
        &PoiFilter::default()
            .of_type(PoiType::Star)
            .in_region(Region::Outer),
    );
    let Some(host) = outer_stars.choose(rng) else {
        return Ok(false);
    };

    let row = WarpGateRow {
        id: 0,
        galaxy_id: galaxy.id,
        source_poi_id: host.id,
        // Self-referencing until the mirror universe is generated.
        destination_poi_id: host.id,
        source_x: host.x,
        source_y: host.y,
        dest_x: host.x,
        dest_y: host.y,
        distance: 0.0,
        status: GateStatus::Precursor,
        gate_kind: GateKind::MirrorPortal,
        is_hidden: true,
        activation_requirements: Some(json!({
            "type": "sensor_level",
            "value": 5,
            "description": "Ancient precursor gate. Requires sensor level 5 to detect and activate.",
        })),
    };
    store
        .insert_gates(vec![row], OnConflict::Ignore)
        .map_err(|e| e.to_string())?;
    store
        .merge_poi_attribute(host.id, "has_precursor_gate", json!(true))
        .map_err(|e| e.to_string())?;
    Ok(true)
}

fn place_precursor_ship(
    store: &mut dyn Store,
    galaxy: &GalaxyRow,
    config: &GenerationConfig,
    rng: &mut impl Rng,
) -> bool {
    let stars = store.pois(galaxy.id, &PoiFilter::default().of_type(PoiType::Star));

    // 10% margin from the edges.
    let min_x = galaxy.width * 0.1;
    let max_x = galaxy.width * 0.9;
    let min_y = galaxy.height * 0.1;
    let max_y = galaxy.height * 0.9;

    let mut position = None;
    for _ in 0..PLACEMENT_ATTEMPTS {
        let x = rng.gen_range(min_x..=max_x).round();
        let y = rng.gen_range(min_y..=max_y).round();
        let isolated = stars.iter().all(|s| {
            ((s.x - x).powi(2) + (s.y - y).powi(2)).sqrt() >= MIN_DISTANCE_FROM_STARS
        });
        if isolated {
            position = Some((x, y));
            break;
        }
    }
    // No isolated spot found: the galaxy center is as good as anywhere.
    let (x, y) = position.unwrap_or(((galaxy.width / 2.0).round(), (galaxy.height / 2.0).round()));

    // The sector grid already exists; assign the wreck at insert so sector
    // coverage stays total.
    let grid_size = config.grid_size();
    let sector_width = galaxy.width / grid_size as f64;
    let sector_height = galaxy.height / grid_size as f64;
    let cell = sectors::grid_cell_for(x, y, sector_width, sector_height, grid_size);
    let sector_id = store
        .sectors(galaxy.id)
        .into_iter()
        .find(|s| (s.grid_x, s.grid_y) == cell)
        .map(|s| s.id);

    store.insert_pois(vec![PoiRow {
        id: 0,
        galaxy_id: galaxy.id,
        parent_poi_id: None,
        orbital_index: None,
        poi_type: PoiType::Derelict,
        name: "Ancient Precursor Vessel".to_string(),
        x,
        y,
        region: Region::Outer,
        sector_id,
        is_inhabited: false,
        is_hidden: true,
        is_fortified: false,
        attributes: json!({
            "precursor": true,
            "discovery_sensor_level": 4,
            "rewards": {
                "credits": 1_000_000,
                "technology": "precursor_drive",
                "plans": ["precursor_shield", "precursor_weapon"],
            },
            "lore": "A vessel from an ancient civilization that once ruled this galaxy.",
        }),
        mineral_deposits: None,
    }]);
    true
}
