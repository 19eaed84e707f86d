//! Defense network generation.
//!
//! Every inhabited star gets the fortress package (orbital cannons, space
//! lasers, ground missiles, a planetary shield, a fighter port) and is
//! marked fortified.

use crate::bulk;
use crate::config::GenerationConfig;
use crate::generators::{stages, Generator};
use crate::metrics::{GenerationMetrics, GenerationResult};
use crate::store::{PoiFilter, Store};
use crate::tables::{DefenseKind, GalaxyRow, PoiType, SystemDefenseRow};

pub struct DefenseNetworkGenerator;

impl Generator for DefenseNetworkGenerator {
    fn name(&self) -> &'static str {
        stages::DEFENSE_NETWORK
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

        let inhabited = store.pois(
            galaxy.id,
            &PoiFilter::default().of_type(PoiType::Star).inhabited(true),
        );
        metrics.set_count("inhabited_stars", inhabited.len() as u64);

        if inhabited.is_empty() {
            metrics.set_count("defenses_created", 0);
            return GenerationResult::success(metrics);
        }

        let mut rows = Vec::with_capacity(inhabited.len() * DefenseKind::FORTRESS_PACKAGE.len());
        for star in &inhabited {
            for kind in DefenseKind::FORTRESS_PACKAGE {
                let base_health = kind.base_health();
                rows.push(SystemDefenseRow {
                    id: 0,
                    galaxy_id: galaxy.id,
                    poi_id: star.id,
                    defense_kind: kind,
                    level: 1,
                    quantity: kind.fortress_quantity(),
                    health: base_health,
                    max_health: base_health,
                    is_active: true,
                });
            }
        }

        let inserted = bulk::insert_defenses(store, rows, config.chunk_size);
        metrics.set_count("defenses_created", inserted as u64);
        metrics.set_count("systems_fortified", inhabited.len() as u64);

        let star_ids: Vec<u64> = inhabited.iter().map(|s| s.id).collect();
        store.mark_fortified(&star_ids);

        GenerationResult::success(metrics)
    }
}
