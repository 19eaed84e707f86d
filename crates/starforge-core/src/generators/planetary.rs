//! Planetary system generation for frontier stars.
//!
//! Each outer star gets 3–7 planets, moons for the giant types, and possibly
//! an asteroid belt. Children inherit the star's map coordinates; orbital
//! distance lives in the attribute payload. Stars are processed in chunks
//! with a persist step per chunk, so planet ids are available for their moons
//! without holding every row in memory at once.

use serde_json::json;

use starforge_logic::bodies;

use crate::bulk;
use crate::config::GenerationConfig;
use crate::generators::{stages, Generator};
use crate::metrics::{GenerationMetrics, GenerationResult};
use crate::store::{PoiFilter, Store};
use crate::tables::{GalaxyRow, PoiRow, PoiType, Region};

pub struct PlanetarySystemGenerator;

impl Generator for PlanetarySystemGenerator {
    fn name(&self) -> &'static str {
        stages::PLANETARY_SYSTEMS
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
        let mut rng = config.stage_rng(stages::PLANETARY_SYSTEMS);

        let outer_stars = store.pois(
            galaxy.id,
            &PoiFilter::default()
                .of_type(PoiType::Star)
                .in_region(Region::Outer),
        );
        metrics.set_count("stars_processed", outer_stars.len() as u64);

        let mut planets_created = 0u64;
        let mut moons_created = 0u64;
        let mut belts_created = 0u64;

        for star_chunk in outer_stars.chunks(config.chunk_size) {
            let mut planet_rows = Vec::new();
            // (index into planet_rows, planet name, moon count)
            let mut moon_specs: Vec<(usize, String, u32)> = Vec::new();

            for star in star_chunk {
                let planet_total = bodies::planet_count(&mut rng);
                let add_belt = bodies::rolls_belt(planet_total, &mut rng);

                for i in 1..=planet_total {
                    let kind = bodies::planet_kind(i, planet_total);
                    let name = bodies::planet_name(&star.name, i);
                    let moons = bodies::moon_count(kind);
                    if moons > 0 {
                        moon_specs.push((planet_rows.len(), name.clone(), moons));
                    }
                    planet_rows.push(PoiRow {
                        id: 0,
                        galaxy_id: galaxy.id,
                        parent_poi_id: Some(star.id),
                        orbital_index: Some(i as u32),
                        poi_type: kind.into(),
                        name,
                        x: star.x,
                        y: star.y,
                        region: Region::Outer,
                        sector_id: None,
                        is_inhabited: false,
                        is_hidden: false,
                        is_fortified: false,
                        attributes: json!({
                            "orbital_distance": bodies::orbital_distance(i),
                            "size": bodies::planet_size(kind),
                        }),
                        mineral_deposits: None,
                    });
                }

                if add_belt {
                    let belt_index = bodies::belt_index(planet_total);
                    planet_rows.push(PoiRow {
                        id: 0,
                        galaxy_id: galaxy.id,
                        parent_poi_id: Some(star.id),
                        orbital_index: Some(belt_index as u32),
                        poi_type: PoiType::AsteroidBelt,
                        name: format!("{} Asteroid Belt", star.name),
                        x: star.x,
                        y: star.y,
                        region: Region::Outer,
                        sector_id: None,
                        is_inhabited: false,
                        is_hidden: false,
                        is_fortified: false,
                        attributes: json!({
                            "orbital_distance": belt_index * 10,
                            "density": bodies::belt_density(belt_index),
                        }),
                        mineral_deposits: None,
                    });
                    belts_created += 1;
                }
            }

            planets_created += (planet_rows.len() as u64) - belts_in(&planet_rows);
            let parents: Vec<(u64, f64, f64)> = planet_rows
                .iter()
                .map(|r| (r.galaxy_id, r.x, r.y))
                .collect();
            let planet_ids = bulk::insert_pois(store, planet_rows, config.chunk_size);

            // Moons reference freshly assigned planet ids.
            let mut moon_rows = Vec::new();
            for (planet_slot, planet_name, moon_count) in moon_specs {
                let planet_id = planet_ids[planet_slot];
                let (galaxy_id, x, y) = parents[planet_slot];
                for m in 1..=moon_count as usize {
                    moon_rows.push(PoiRow {
                        id: 0,
                        galaxy_id,
                        parent_poi_id: Some(planet_id),
                        orbital_index: Some(m as u32),
                        poi_type: PoiType::Moon,
                        name: bodies::moon_name(&planet_name, m),
                        x,
                        y,
                        region: Region::Outer,
                        sector_id: None,
                        is_inhabited: false,
                        is_hidden: false,
                        is_fortified: false,
                        attributes: json!({
                            "orbital_distance": bodies::moon_orbital_distance(m),
                            "size": bodies::moon_size(m),
                        }),
                        mineral_deposits: None,
                    });
                }
            }
            moons_created += moon_rows.len() as u64;
            bulk::insert_pois(store, moon_rows, config.chunk_size);
        }

        metrics.set_count("planets_created", planets_created);
        metrics.set_count("moons_created", moons_created);
        metrics.set_count("belts_created", belts_created);
        GenerationResult::success(metrics)
    }
}

fn belts_in(rows: &[PoiRow]) -> u64 {
    rows.iter()
        .filter(|r| r.poi_type == PoiType::AsteroidBelt)
        .count() as u64
}
