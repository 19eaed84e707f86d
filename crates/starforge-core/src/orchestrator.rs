//! Pipeline orchestration.
//!
//! Validates the generator dependency graph, resolves a deterministic
//! execution order, runs stages in sequence, and finalizes the galaxy
//! record. The first stage failure aborts the run; rows written by earlier
//! stages are preserved, and the galaxy is marked failed.

use std::collections::{BTreeMap, HashSet};

use log::{error, info};
use serde_json::{Map, Value};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::generators::{
    stages, DefenseNetworkGenerator, Generator, MineralDepositGenerator, MirrorUniverseGenerator,
    PlanetarySystemGenerator, PrecursorContentGenerator, SectorGridGenerator, StarFieldGenerator,
    TradingInfrastructureGenerator, WarpGateNetworkGenerator,
};
use crate::store::{GalaxyCounts, Store};
use crate::tables::{now_ms, GalaxyRow, GalaxyStatus};

use starforge_logic::naming;

/// Result of one stage within a pipeline run.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub name: String,
    pub success: bool,
    pub error: Option<String>,
    pub elapsed_ms: u64,
    pub counts: BTreeMap<String, u64>,
    pub data: Map<String, Value>,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub galaxy_id: u64,
    pub success: bool,
    pub failed_stage: Option<String>,
    pub stages: Vec<StageReport>,
    pub counts: GalaxyCounts,
}

/// Sequences generators over one galaxy.
pub struct Orchestrator {
    generators: Vec<Box<dyn Generator>>,
}

impl Orchestrator {
    pub fn new(generators: Vec<Box<dyn Generator>>) -> Self {
        Self { generators }
    }

    /// All nine stages.
    pub fn with_default_pipeline() -> Self {
        let mut generators = structural_generators();
        generators.push(Box::new(PrecursorContentGenerator));
        generators.push(Box::new(MirrorUniverseGenerator));
        Self::new(generators)
    }

    pub fn stage_count(&self) -> usize {
        self.generators.len()
    }

    /// Resolve a topological execution order. Among ready stages,
    /// registration order wins, so the order is deterministic.
    pub fn resolve_order(&self) -> Result<Vec<usize>, GenerationError> {
        let names: Vec<&str> = self.generators.iter().map(|g| g.name()).collect();
        for g in &self.generators {
            for dep in g.dependencies() {
                if !names.contains(dep) {
                    return Err(GenerationError::UnknownDependency {
                        generator: g.name().to_string(),
                        dependency: dep.to_string(),
                    });
                }
            }
        }

        let mut order = Vec::with_capacity(self.generators.len());
        let mut done: HashSet<&str> = HashSet::new();
        while order.len() < self.generators.len() {
            let ready = self.generators.iter().enumerate().find(|(i, g)| {
                !order.contains(i) && g.dependencies().iter().all(|d| done.contains(d))
            });
            match ready {
                Some((i, g)) => {
                    done.insert(g.name());
                    order.push(i);
                }
                None => {
                    let remaining: Vec<String> = self
                        .generators
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !order.contains(i))
                        .map(|(_, g)| g.name().to_string())
                        .collect();
                    return Err(GenerationError::CyclicDependency { remaining });
                }
            }
        }
        Ok(order)
    }

    /// Create the galaxy record for a run, drawing a name when the config
    /// has none.
    pub fn create_galaxy(&self, store: &mut dyn Store, config: &GenerationConfig) -> u64 {
        let name = config.name.clone().unwrap_or_else(|| {
            let mut rng = config.stage_rng("galaxy_name");
            format!("{} Galaxy", naming::star_name(&mut rng))
        });
        let (width, height) = config.dimensions();
        store.insert_galaxy(GalaxyRow {
            id: 0,
            name,
            tier: config.tier,
            width,
            height,
            seed: config.seed,
            status: GalaxyStatus::Draft,
            mirror_of: None,
            mirror_galaxy_id: None,
            generation_started_at: None,
            generation_completed_at: None,
        })
    }

    /// Create a galaxy and run the full pipeline against it.
    pub fn generate(
        &self,
        store: &mut dyn Store,
        config: &GenerationConfig,
    ) -> Result<PipelineReport, GenerationError> {
        let galaxy_id = self.create_galaxy(store, config);
        self.run(store, galaxy_id, config, &mut |_, _, _| {})
    }

    /// Run the pipeline against an existing galaxy record. `observer` is
    /// called before each stage with (index, total, stage name).
    pub fn run(
        &self,
        store: &mut dyn Store,
        galaxy_id: u64,
        config: &GenerationConfig,
        observer: &mut dyn FnMut(usize, usize, &str),
    ) -> Result<PipelineReport, GenerationError> {
        // Graph errors surface before any stage touches the store.
        let order = self.resolve_order()?;

        let mut galaxy = store
            .galaxy(galaxy_id)
            .ok_or(GenerationError::UnknownGalaxy(galaxy_id))?;
        galaxy.status = GalaxyStatus::Generating;
        galaxy.generation_started_at = Some(now_ms());
        store.update_galaxy(&galaxy)?;
        info!(
            "galaxy {galaxy_id}: starting generation ({} stages, tier {})",
            order.len(),
            galaxy.tier.as_str()
        );

        let total = order.len();
        let mut reports = Vec::with_capacity(total);
        let mut failed_stage = None;

        for (position, index) in order.into_iter().enumerate() {
            let generator = &self.generators[index];
            let name = generator.name();
            observer(position, total, name);
            info!("galaxy {galaxy_id}: stage {}/{total} '{name}'", position + 1);

            // Stages may have updated the galaxy row (mirror linkage).
            let current = store
                .galaxy(galaxy_id)
                .ok_or(GenerationError::UnknownGalaxy(galaxy_id))?;
            let result = generator.generate(store, &current, config);
            let success = result.is_success();
            reports.push(StageReport {
                name: name.to_string(),
                success,
                error: result.error.clone(),
                elapsed_ms: result.metrics.elapsed_ms(),
                counts: result.metrics.counts().clone(),
                data: result.data,
            });

            if !success {
                error!(
                    "galaxy {galaxy_id}: stage '{name}' failed: {}",
                    result.error.as_deref().unwrap_or("unknown error")
                );
                failed_stage = Some(name.to_string());
                break;
            }
        }

        let mut galaxy = store
            .galaxy(galaxy_id)
            .ok_or(GenerationError::UnknownGalaxy(galaxy_id))?;
        if failed_stage.is_none() {
            galaxy.status = GalaxyStatus::Active;
            galaxy.generation_completed_at = Some(now_ms());
            info!("galaxy {galaxy_id}: generation complete");
        } else {
            galaxy.status = GalaxyStatus::Failed;
        }
        store.update_galaxy(&galaxy)?;

        Ok(PipelineReport {
            galaxy_id,
            success: failed_stage.is_none(),
            failed_stage,
            stages: reports,
            counts: store.counts(galaxy_id),
        })
    }
}

/// The seven structural stages, in registration order.
pub(crate) fn structural_generators() -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(StarFieldGenerator),
        Box::new(PlanetarySystemGenerator),
        Box::new(SectorGridGenerator),
        Box::new(WarpGateNetworkGenerator),
        Box::new(MineralDepositGenerator),
        Box::new(DefenseNetworkGenerator),
        Box::new(TradingInfrastructureGenerator),
    ]
}

/// Run the structural stages against an existing galaxy, for the mirror
/// pass. Fails with the first failing stage.
pub(crate) fn run_structural_stages(
    store: &mut dyn Store,
    galaxy_id: u64,
    config: &GenerationConfig,
) -> Result<Vec<StageReport>, GenerationError> {
    let orchestrator = Orchestrator::new(structural_generators());
    let report = orchestrator.run(store, galaxy_id, config, &mut |_, _, _| {})?;
    if let Some(stage) = report.failed_stage {
        let message = report
            .stages
            .iter()
            .rev()
            .find_map(|s| s.error.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(GenerationError::StageFailure { stage, message });
    }
    Ok(report.stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{GenerationMetrics, GenerationResult};

    struct FakeStage {
        name: &'static str,
        deps: &'static [&'static str],
    }

    impl Generator for FakeStage {
        fn name(&self) -> &'static str {
            self.name
        }

        fn dependencies(&self) -> &'static [&'static str] {
            self.deps
        }

        fn generate(
            &self,
            _store: &mut dyn Store,
            _galaxy: &GalaxyRow,
            _config: &GenerationConfig,
        ) -> GenerationResult {
            GenerationResult::success(GenerationMetrics::start())
        }
    }

    fn stage(name: &'static str, deps: &'static [&'static str]) -> Box<dyn Generator> {
        Box::new(FakeStage { name, deps })
    }

    #[test]
    fn diamond_dependencies_resolve() {
        // d depends on b and c, both depend on a.
        let orchestrator = Orchestrator::new(vec![
            stage("d", &["b", "c"]),
            stage("b", &["a"]),
            stage("c", &["a"]),
            stage("a", &[]),
        ]);
        let order = orchestrator.resolve_order().unwrap();
        // a (index 3) first, d (index 0) last; b and c keep registration order.
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn ready_stages_keep_registration_order() {
        let orchestrator = Orchestrator::new(vec![
            stage("a", &[]),
            stage("b", &[]),
            stage("c", &["a", "b"]),
        ]);
        assert_eq!(orchestrator.resolve_order().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn cycle_is_detected() {
        let orchestrator = Orchestrator::new(vec![stage("a", &["b"]), stage("b", &["a"])]);
        let err = orchestrator.resolve_order().unwrap_err();
        assert!(matches!(err, GenerationError::CyclicDependency { .. }));
    }

    #[test]
    fn unknown_dependency_is_detected() {
        let orchestrator = Orchestrator::new(vec![stage("a", &["ghost"])]);
        let err = orchestrator.resolve_order().unwrap_err();
        match err {
            GenerationError::UnknownDependency { generator, dependency } => {
                assert_eq!(generator, "a");
                assert_eq!(dependency, "ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_pipeline_order_is_valid() {
        let orchestrator = Orchestrator::with_default_pipeline();
        let order = orchestrator.resolve_order().unwrap();
        assert_eq!(order.len(), 9);
        // star_field has no dependencies and registers first.
        assert_eq!(order[0], 0);
        // mirror_universe depends on precursor_content and runs last.
        assert_eq!(*order.last().unwrap(), 8);
    }

    #[test]
    fn default_pipeline_names() {
        let orchestrator = Orchestrator::with_default_pipeline();
        let names: Vec<&str> = orchestrator.generators.iter().map(|g| g.name()).collect();
        assert_eq!(
            names,
            vec![
                stages::STAR_FIELD,
                stages::PLANETARY_SYSTEMS,
                stages::SECTOR_GRID,
                stages::WARP_GATE_NETWORK,
                stages::MINERAL_DEPOSITS,
                stages::DEFENSE_NETWORK,
                stages::TRADING_INFRASTRUCTURE,
                stages::PRECURSOR_CONTENT,
                stages::MIRROR_UNIVERSE,
            ]
        );
    }
}
