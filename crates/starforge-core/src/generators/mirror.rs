//! Mirror universe generation.
//!
//! Builds a parallel galaxy with the same tier and seed as the prime, links
//! the prime's precursor gate to it, and creates a visible return gate on
//! the mirror side. The mirror's gate network is denser and hides more of
//! itself. Idempotent: when the prime already has a mirror, the stage
//! reports the existing mirror id and writes nothing.

use log::info;
use rand::seq::SliceRandom;
use serde_json::json;

use crate::config::GenerationConfig;
use crate::generators::{stages, Generator};
use crate::metrics::{GenerationMetrics, GenerationResult};
use crate::orchestrator::run_structural_stages;
use crate::store::{OnConflict, PoiFilter, Store};
use crate::tables::{
    now_ms, GalaxyRow, GalaxyStatus, GateKind, GateStatus, PoiType, Region, WarpGateRow,
};

pub struct MirrorUniverseGenerator;

impl Generator for MirrorUniverseGenerator {
    fn name(&self) -> &'static str {
        stages::MIRROR_UNIVERSE
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[stages::PRECURSOR_CONTENT]
    }

    fn generate(
        &self,
        store: &mut dyn Store,
        galaxy: &GalaxyRow,
        config: &GenerationConfig,
    ) -> GenerationResult {
        let mut metrics = GenerationMetrics::start();
        let mut data = serde_json::Map::new();

        if !config.include_mirror {
            data.insert("skipped".into(), json!(true));
            return GenerationResult::success_with(metrics, data);
        }

        // Idempotence: an existing mirror wins, nothing is rebuilt.
        if let Some(existing) = store.mirror_of(galaxy.id) {
            info!(
                "galaxy {}: mirror already exists as galaxy {}",
                galaxy.id, existing.id
            );
            data.insert("mirror_galaxy_id".into(), json!(existing.id));
            data.insert("already_existed".into(), json!(true));
            metrics.set_count("mirror_created", 0);
            return GenerationResult::success_with(metrics, data);
        }

        let mirror_id = store.insert_galaxy(GalaxyRow {
            id: 0,
            name: format!("{} (Mirror)", galaxy.name),
            tier: galaxy.tier,
            width: galaxy.width,
            height: galaxy.height,
            // Same seed: the mirror shares the prime's structure.
            seed: galaxy.seed,
            status: GalaxyStatus::Draft,
            mirror_of: Some(galaxy.id),
            mirror_galaxy_id: None,
            generation_started_at: Some(now_ms()),
            generation_completed_at: None,
        });

        let mut prime = galaxy.clone();
        prime.mirror_galaxy_id = Some(mirror_id);
        if let Err(e) = store.update_galaxy(&prime) {
            return GenerationResult::failure(metrics, e.to_string());
        }

        let mirror_config = config.mirror_config();
        match run_structural_stages(store, mirror_id, &mirror_config) {
            Ok(stage_reports) => {
                for report in &stage_reports {
                    metrics.increment("mirror_stage_ms", report.elapsed_ms);
                }
            }
            Err(e) => return GenerationResult::failure(metrics, e.to_string()),
        }

        let gates_linked = match link_precursor_gate(store, galaxy, mirror_id, &mirror_config) {
            Ok(linked) => linked,
            Err(e) => return GenerationResult::failure(metrics, e),
        };
        metrics.set_count("gates_linked", gates_linked as u64);
        metrics.set_count("mirror_created", 1);

        data.insert("mirror_galaxy_id".into(), json!(mirror_id));
        data.insert("already_existed".into(), json!(false));
        GenerationResult::success_with(metrics, data)
    }
}

/// Rewrite the prime's self-referencing precursor gate to point into the
/// mirror, and add the visible return gate on the mirror side.
fn link_precursor_gate(
    store: &mut dyn Store,
    prime: &GalaxyRow,
    mirror_id: u64,
    mirror_config: &GenerationConfig,
) -> Result<usize, String> {
    let portal = store
        .gates(prime.id)
        .into_iter()
        .find(|g| g.gate_kind == GateKind::MirrorPortal && g.status == GateStatus::Precursor);
    let Some(mut portal) = portal else {
        // Prime was generated without precursor content; nothing to link.
        return Ok(0);
    };

    let mirror_stars = store.pois(
        mirror_id,
        &PoiFilter::default()
            .of_type(PoiType::Star)
            .in_region(Region::Outer),
    );
    let mut rng = mirror_config.stage_rng(stages::MIRROR_UNIVERSE);
    let Some(anchor) = mirror_stars.choose(&mut rng) else {
        return Ok(0);
    };

    portal.destination_poi_id = anchor.id;
    portal.dest_x = anchor.x;
    portal.dest_y = anchor.y;
    portal.status = GateStatus::Active;
    portal.gate_kind = GateKind::MirrorEntry;
    store.update_gate(&portal).map_err(|e| e.to_string())?;

    let return_gate = WarpGateRow {
        id: 0,
        galaxy_id: mirror_id,
        source_poi_id: anchor.id,
        destination_poi_id: portal.source_poi_id,
        source_x: anchor.x,
        source_y: anchor.y,
        dest_x: portal.source_x,
        dest_y: portal.source_y,
        distance: 0.0,
        status: GateStatus::Active,
        gate_kind: GateKind::MirrorReturn,
        is_hidden: false,
        activation_requirements: None,
    };
    store
        .insert_gates(vec![return_gate], OnConflict::Ignore)
        .map_err(|e| e.to_string())?;
    Ok(2)
}
