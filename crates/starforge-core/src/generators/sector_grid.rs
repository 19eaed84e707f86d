//! Sector grid overlay.
//!
//! Creates the tier's grid of equal sectors, then assigns every POI in the
//! galaxy to the sector containing its coordinates. Assignment is total:
//! boundary coordinates clamp into the last row/column.

use std::collections::HashMap;

use starforge_logic::sectors;

use crate::bulk;
use crate::config::GenerationConfig;
use crate::generators::{stages, Generator};
use crate::metrics::{GenerationMetrics, GenerationResult};
use crate::store::{PoiFilter, Store};
use crate::tables::{GalaxyRow, SectorRow};

pub struct SectorGridGenerator;

impl Generator for SectorGridGenerator {
    fn name(&self) -> &'static str {
        stages::SECTOR_GRID
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
        let grid_size = config.grid_size();
        let sector_width = galaxy.width / grid_size as f64;
        let sector_height = galaxy.height / grid_size as f64;

        let mut rows = Vec::with_capacity((grid_size * grid_size) as usize);
        for y in 0..grid_size {
            for x in 0..grid_size {
                let bounds = sectors::cell_bounds(x, y, sector_width, sector_height);
                rows.push(SectorRow {
                    id: 0,
                    galaxy_id: galaxy.id,
                    name: sectors::sector_name(x, y),
                    grid_x: x,
                    grid_y: y,
                    x_min: bounds.x_min,
                    x_max: bounds.x_max,
                    y_min: bounds.y_min,
                    y_max: bounds.y_max,
                    danger_level: 0,
                });
            }
        }

        let sector_ids = store.insert_sectors(rows);
        metrics.set_count("sectors_created", sector_ids.len() as u64);
        metrics.set_count("grid_size", grid_size as u64);

        // Map grid cell to sector id for assignment.
        let cell_to_sector: HashMap<(u32, u32), u64> = store
            .sectors(galaxy.id)
            .into_iter()
            .map(|s| ((s.grid_x, s.grid_y), s.id))
            .collect();

        let updates: Vec<(u64, u64)> = store
            .pois(galaxy.id, &PoiFilter::default())
            .into_iter()
            .filter_map(|poi| {
                let cell =
                    sectors::grid_cell_for(poi.x, poi.y, sector_width, sector_height, grid_size);
                cell_to_sector.get(&cell).map(|sector_id| (poi.id, *sector_id))
            })
            .collect();

        let assigned = bulk::assign_sectors(store, updates, config.chunk_size);
        metrics.set_count("pois_assigned", assigned as u64);
        GenerationResult::success(metrics)
    }
}
