//! Mineral deposit generation.
//!
//! 95% of frontier bodies (planets, moons, belts; not stars) get 1–3
//! deposits drawn from the mineral catalog. The frontier carries a 2×
//! richness multiplier on deposit size, and the richness tier follows the
//! multiplied size.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Map, Value};

use starforge_logic::bodies::{richness_tier, MINERALS};

use crate::bulk;
use crate::config::GenerationConfig;
use crate::generators::{stages, Generator};
use crate::metrics::{GenerationMetrics, GenerationResult};
use crate::store::{PoiFilter, Store};
use crate::tables::{GalaxyRow, PoiType, Region};

const DEPOSIT_CHANCE: f64 = 0.95;
const RICHNESS_MULTIPLIER: f64 = 2.0;

pub struct MineralDepositGenerator;

impl Generator for MineralDepositGenerator {
    fn name(&self) -> &'static str {
        stages::MINERAL_DEPOSITS
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[stages::PLANETARY_SYSTEMS]
    }

    fn generate(
        &self,
        store: &mut dyn Store,
        galaxy: &GalaxyRow,
        config: &GenerationConfig,
    ) -> GenerationResult {
        let mut metrics = GenerationMetrics::start();
        let mut rng = config.stage_rng(stages::MINERAL_DEPOSITS);

        let mineable = store.pois(
            galaxy.id,
            &PoiFilter::default()
                .in_region(Region::Outer)
                .excluding_type(PoiType::Star),
        );
        metrics.set_count("mineable_bodies", mineable.len() as u64);

        let mut updates: Vec<(u64, Value)> = Vec::new();
        for body in &mineable {
            if body.poi_type == PoiType::Derelict || !rng.gen_bool(DEPOSIT_CHANCE) {
                continue;
            }
            updates.push((body.id, generate_deposits(&mut rng)));
        }
        metrics.set_count("bodies_with_deposits", updates.len() as u64);

        let touched = bulk::set_mineral_deposits(store, updates, config.chunk_size);
        metrics.set_count("deposits_written", touched as u64);
        GenerationResult::success(metrics)
    }
}

fn generate_deposits(rng: &mut impl Rng) -> Value {
    let mut deposits = Map::new();
    let deposit_count = rng.gen_range(1..=3);
    for _ in 0..deposit_count {
        // Re-rolling an already drawn mineral just overwrites it; bodies may
        // end with fewer than the rolled count.
        let (name, symbol) = MINERALS.choose(rng).copied().unwrap_or(MINERALS[0]);
        let base_size = rng.gen_range(100..=1000);
        let size = (base_size as f64 * RICHNESS_MULTIPLIER) as u32;
        deposits.insert(
            name.to_string(),
            json!({
                "symbol": symbol,
                "size": size,
                "richness": richness_tier(size),
            }),
        );
    }
    Value::Object(deposits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn deposits_carry_richness_tiers() {
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..50 {
            let deposits = generate_deposits(&mut rng);
            let map = deposits.as_object().unwrap();
            assert!(!map.is_empty() && map.len() <= 3);
            for deposit in map.values() {
                let size = deposit["size"].as_u64().unwrap();
                assert!((200..=2000).contains(&size));
                assert_eq!(deposit["richness"], richness_tier(size as u32));
            }
        }
    }
}
