//! Star field generation.
//!
//! Phase 1: civilized core — spiral placement inside the centered core
//! square, every star inhabited. Phase 2: frontier — rejection sampling over
//! the full galaxy with the core excluded, nothing inhabited. Stars carry
//! stellar class and size attributes from region-specific weighted tables.
//! Coordinates are rounded to whole units before storage.

use log::warn;
use rand::Rng;
use serde_json::json;

use starforge_logic::geometry::Point;
use starforge_logic::naming;
use starforge_logic::points::{PlacementStrategy, RejectionConfig, SpiralConfig};

use crate::bulk;
use crate::config::GenerationConfig;
use crate::generators::{stages, Generator};
use crate::metrics::{GenerationMetrics, GenerationResult};
use crate::store::Store;
use crate::tables::{GalaxyRow, PoiRow, PoiType, Region};

pub struct StarFieldGenerator;

impl Generator for StarFieldGenerator {
    fn name(&self) -> &'static str {
        stages::STAR_FIELD
    }

    fn generate(
        &self,
        store: &mut dyn Store,
        galaxy: &GalaxyRow,
        config: &GenerationConfig,
    ) -> GenerationResult {
        let mut metrics = GenerationMetrics::start();
        let mut rng = config.stage_rng(stages::STAR_FIELD);

        let core_bounds = config.core_bounds();
        let outer_bounds = config.outer_bounds();

        // Phase 1: core.
        let core_strategy = PlacementStrategy::Spiral(SpiralConfig {
            min_spacing: config.core_min_spacing,
            ..SpiralConfig::default()
        });
        let core_points = core_strategy.place(config.tier.core_stars(), &core_bounds, &mut rng);
        report_underfull("core", config.tier.core_stars(), core_points.len());
        metrics.set_count("core_stars_requested", config.tier.core_stars() as u64);
        metrics.set_count("core_stars_placed", core_points.len() as u64);

        let core_rows = build_star_rows(galaxy.id, &core_points, Region::Core, true, &mut rng);
        bulk::insert_pois(store, core_rows, config.chunk_size);

        // Phase 2: frontier.
        let outer_strategy = PlacementStrategy::Rejection(RejectionConfig {
            min_spacing: config.outer_min_spacing,
            exclusion: Some(core_bounds),
            ..RejectionConfig::default()
        });
        let outer_points = outer_strategy.place(config.tier.outer_stars(), &outer_bounds, &mut rng);
        report_underfull("outer", config.tier.outer_stars(), outer_points.len());
        metrics.set_count("outer_stars_requested", config.tier.outer_stars() as u64);
        metrics.set_count("outer_stars_placed", outer_points.len() as u64);

        let outer_rows = build_star_rows(galaxy.id, &outer_points, Region::Outer, false, &mut rng);
        bulk::insert_pois(store, outer_rows, config.chunk_size);

        metrics.set_count(
            "stars_placed",
            (core_points.len() + outer_points.len()) as u64,
        );
        GenerationResult::success(metrics)
    }
}

fn report_underfull(region: &str, requested: usize, placed: usize) {
    if placed < requested {
        warn!(
            "{region} star placement underfull: {placed}/{requested} \
             (attempt budget exhausted)"
        );
    }
}

fn build_star_rows(
    galaxy_id: u64,
    points: &[Point],
    region: Region,
    inhabited: bool,
    rng: &mut impl Rng,
) -> Vec<PoiRow> {
    let classes: &[(&str, u32)] = match region {
        Region::Core => &naming::STELLAR_CLASSES_CORE,
        Region::Outer => &naming::STELLAR_CLASSES_OUTER,
    };

    points
        .iter()
        .map(|p| PoiRow {
            id: 0,
            galaxy_id,
            parent_poi_id: None,
            orbital_index: None,
            poi_type: PoiType::Star,
            name: naming::star_name(rng),
            x: p.x.round(),
            y: p.y.round(),
            region,
            sector_id: None,
            is_inhabited: inhabited,
            is_hidden: false,
            is_fortified: false,
            attributes: json!({
                "stellar_class": naming::weighted_pick(classes, rng),
                "stellar_size": naming::weighted_pick(&naming::STELLAR_SIZES, rng),
            }),
            mineral_deposits: None,
        })
        .collect()
}
