//! Trading infrastructure generation.
//!
//! Every inhabited core star gets a premium trading hub with the full
//! service payload and the core tax rate.

use serde_json::json;

use starforge_logic::naming;

use crate::bulk;
use crate::config::GenerationConfig;
use crate::generators::{stages, Generator};
use crate::metrics::{GenerationMetrics, GenerationResult};
use crate::store::{PoiFilter, Store};
use crate::tables::{GalaxyRow, PoiType, Region, TradingHubRow};

const CORE_TAX_RATE: f64 = 0.05;

const CORE_SERVICES: [&str; 5] = ["shipyard", "salvage", "upgrades", "plans", "cartography"];

pub struct TradingInfrastructureGenerator;

impl Generator for TradingInfrastructureGenerator {
    fn name(&self) -> &'static str {
        stages::TRADING_INFRASTRUCTURE
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
        let mut rng = config.stage_rng(stages::TRADING_INFRASTRUCTURE);

        let core_stars = store.pois(
            galaxy.id,
            &PoiFilter::default()
                .of_type(PoiType::Star)
                .in_region(Region::Core)
                .inhabited(true),
        );
        metrics.set_count("core_stars", core_stars.len() as u64);

        let rows: Vec<TradingHubRow> = core_stars
            .iter()
            .map(|star| TradingHubRow {
                id: 0,
                galaxy_id: galaxy.id,
                poi_id: star.id,
                name: naming::hub_name(&star.name, &mut rng),
                tax_rate: CORE_TAX_RATE,
                services: CORE_SERVICES.iter().map(|s| s.to_string()).collect(),
                attributes: json!({
                    "region": "core",
                    "premium": true,
                }),
            })
            .collect();

        let inserted = bulk::insert_hubs(store, rows, config.chunk_size);
        metrics.set_count("hubs_created", inserted as u64);
        GenerationResult::success(metrics)
    }
}
