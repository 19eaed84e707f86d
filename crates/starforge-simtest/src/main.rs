//! Starforge Headless Generation Harness
//!
//! Validates the generation pipeline and its pure logic without a real
//! database. Runs entirely in-process against the in-memory store — no DB,
//! no networking.
//!
//! Usage:
//!   cargo run -p starforge-simtest
//!   cargo run -p starforge-simtest -- --verbose

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use starforge_core::config::GenerationConfig;
use starforge_core::orchestrator::{Orchestrator, PipelineReport};
use starforge_core::snapshot::{load_galaxy, save_galaxy};
use starforge_core::store::{MemoryStore, PoiFilter, Store};
use starforge_core::tables::{GalaxyStatus, GateKind, GateStatus, PoiType, Region};
use starforge_logic::lanes::canonical_key;
use starforge_logic::naming;
use starforge_logic::points::{PlacementStrategy, RejectionConfig, SpiralConfig};
use starforge_logic::spatial::{find_neighbors_brute, IndexedPoint, SpatialIndex};
use starforge_logic::tiers::SizeTier;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Starforge Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Tier tables
    results.extend(validate_tiers(verbose));

    // 2. Point placement sweep
    results.extend(validate_placement(verbose));

    // 3. Spatial index agreement
    results.extend(validate_spatial(verbose));

    // 4. Naming tables
    results.extend(validate_naming(verbose));

    // 5. Full small-tier pipeline
    results.extend(validate_pipeline(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Tier tables ──────────────────────────────────────────────────────

fn validate_tiers(_verbose: bool) -> Vec<TestResult> {
    println!("--- Size Tiers ---");
    let mut results = Vec::new();

    let tiers = [
        SizeTier::Small,
        SizeTier::Medium,
        SizeTier::Large,
        SizeTier::Massive,
    ];

    let mut consistent = true;
    for tier in tiers {
        let core = tier.core_bounds();
        let outer = tier.outer_bounds();
        if core.x_min <= outer.x_min || core.x_max >= outer.x_max {
            consistent = false;
        }
        if tier.core_size() * 2.0 != tier.outer_size() {
            consistent = false;
        }
        if tier.total_stars() != tier.core_stars() + tier.outer_stars() {
            consistent = false;
        }
    }
    results.push(TestResult {
        name: "tier_geometry_consistent".into(),
        passed: consistent,
        detail: "core centered inside outer, counts sum".into(),
    });

    results.push(TestResult {
        name: "tier_star_counts".into(),
        passed: SizeTier::Small.total_stars() == 250
            && SizeTier::Medium.total_stars() == 750
            && SizeTier::Large.total_stars() == 1250
            && SizeTier::Massive.total_stars() == 2500,
        detail: "250/750/1250/2500 stars per tier".into(),
    });

    results.push(TestResult {
        name: "tier_massive_internal".into(),
        passed: !SizeTier::public_tiers().contains(&SizeTier::Massive),
        detail: format!("{} public tiers, massive excluded", SizeTier::public_tiers().len()),
    });

    results.push(TestResult {
        name: "tier_gate_adjacency".into(),
        passed: SizeTier::Small.gate_adjacency() == 33.0
            && SizeTier::Medium.gate_adjacency() == 100.0
            && SizeTier::Large.gate_adjacency() == 166.0
            && SizeTier::Massive.gate_adjacency() == 333.0,
        detail: "adjacency = floor(size / 15)".into(),
    });

    results
}

// ── 2. Point placement ──────────────────────────────────────────────────

fn min_pairwise(points: &[starforge_logic::geometry::Point]) -> f64 {
    let mut min = f64::INFINITY;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            min = min.min(points[i].distance_to(&points[j]));
        }
    }
    min
}

fn validate_placement(verbose: bool) -> Vec<TestResult> {
    println!("--- Point Placement ---");
    let mut results = Vec::new();

    // Spiral across the core bounds of every tier, several seeds each.
    let mut spiral_ok = true;
    let mut worst_fill = 1.0f64;
    for tier in [SizeTier::Small, SizeTier::Medium, SizeTier::Large] {
        let bounds = tier.core_bounds();
        for seed in 0..5u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let points = PlacementStrategy::Spiral(SpiralConfig::default()).place(
                tier.core_stars(),
                &bounds,
                &mut rng,
            );
            let fill = points.len() as f64 / tier.core_stars() as f64;
            worst_fill = worst_fill.min(fill);
            if fill < 0.9 || (points.len() > 1 && min_pairwise(&points) < 15.0) {
                spiral_ok = false;
            }
            if !points.iter().all(|p| bounds.contains(p)) {
                spiral_ok = false;
            }
        }
    }
    results.push(TestResult {
        name: "placement_spiral_sweep".into(),
        passed: spiral_ok,
        detail: format!("3 tiers × 5 seeds, worst fill {:.0}%", worst_fill * 100.0),
    });

    // Rejection with core exclusion across seeds.
    let mut rejection_ok = true;
    for seed in 0..5u64 {
        let tier = SizeTier::Small;
        let cfg = RejectionConfig {
            exclusion: Some(tier.core_bounds()),
            ..RejectionConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let points = PlacementStrategy::Rejection(cfg).place(
            tier.outer_stars(),
            &tier.outer_bounds(),
            &mut rng,
        );
        if points.is_empty() || points.iter().any(|p| tier.core_bounds().contains(p)) {
            rejection_ok = false;
        }
        if points.len() > 1 && min_pairwise(&points) < 25.0 {
            rejection_ok = false;
        }
    }
    results.push(TestResult {
        name: "placement_rejection_sweep".into(),
        passed: rejection_ok,
        detail: "5 seeds, exclusion and spacing honored".into(),
    });

    if verbose {
        let mut rng = StdRng::seed_from_u64(0);
        let points = PlacementStrategy::Spiral(SpiralConfig::default()).place(
            100,
            &SizeTier::Small.core_bounds(),
            &mut rng,
        );
        println!(
            "  spiral sample: {} points, min spacing {:.1}",
            points.len(),
            min_pairwise(&points)
        );
    }

    results
}

// ── 3. Spatial index ────────────────────────────────────────────────────

fn validate_spatial(_verbose: bool) -> Vec<TestResult> {
    println!("--- Spatial Index ---");
    let mut results = Vec::new();

    let mut rng = StdRng::seed_from_u64(5);
    let points: Vec<IndexedPoint> = {
        use rand::Rng;
        (0..500u64)
            .map(|id| IndexedPoint {
                id,
                x: rng.gen_range(0.0..2500.0),
                y: rng.gen_range(0.0..2500.0),
            })
            .collect()
    };

    let index = SpatialIndex::build(&points, 332.0);
    let mut agree = true;
    for probe in points.iter().step_by(7) {
        let grid = index.find_neighbors(probe.x, probe.y, 166.0, Some(probe.id));
        let brute = find_neighbors_brute(&points, probe.x, probe.y, 166.0, Some(probe.id));
        if grid != brute {
            agree = false;
            break;
        }
    }
    results.push(TestResult {
        name: "spatial_grid_matches_brute".into(),
        passed: agree,
        detail: "500 points, 72 probes, identical ordered results".into(),
    });

    let ordered = index.find_neighbors(1250.0, 1250.0, 400.0, None);
    let sorted = ordered.windows(2).all(|w| w[0].distance <= w[1].distance);
    results.push(TestResult {
        name: "spatial_results_ordered".into(),
        passed: sorted && !ordered.is_empty(),
        detail: format!("{} neighbors, ascending by distance", ordered.len()),
    });

    results
}

// ── 4. Naming tables ────────────────────────────────────────────────────

fn validate_naming(_verbose: bool) -> Vec<TestResult> {
    println!("--- Naming ---");
    let mut results = Vec::new();

    let core_total: u32 = naming::STELLAR_CLASSES_CORE.iter().map(|(_, w)| w).sum();
    let outer_total: u32 = naming::STELLAR_CLASSES_OUTER.iter().map(|(_, w)| w).sum();
    let size_total: u32 = naming::STELLAR_SIZES.iter().map(|(_, w)| w).sum();
    results.push(TestResult {
        name: "naming_weights_sum_100".into(),
        passed: core_total == 100 && outer_total == 100 && size_total == 100,
        detail: format!("core={core_total} outer={outer_total} sizes={size_total}"),
    });

    let mut rng = StdRng::seed_from_u64(3);
    let names: Vec<String> = (0..200).map(|_| naming::star_name(&mut rng)).collect();
    let distinct: HashSet<&String> = names.iter().collect();
    results.push(TestResult {
        name: "naming_star_variety".into(),
        passed: names.iter().all(|n| !n.is_empty()) && distinct.len() > 100,
        detail: format!("{} distinct names in 200 draws", distinct.len()),
    });

    let hub = naming::hub_name("Vega", &mut rng);
    results.push(TestResult {
        name: "naming_hub_format".into(),
        passed: hub.contains("Vega"),
        detail: format!("sample: {hub}"),
    });

    results
}

// ── 5. Full pipeline ────────────────────────────────────────────────────

fn run_small(seed: u64) -> (MemoryStore, PipelineReport) {
    let mut store = MemoryStore::new();
    let config = GenerationConfig::from_tier(SizeTier::Small, seed);
    let orchestrator = Orchestrator::with_default_pipeline();
    let report = orchestrator
        .generate(&mut store, &config)
        .expect("pipeline run");
    (store, report)
}

fn validate_pipeline(verbose: bool) -> Vec<TestResult> {
    println!("--- Small Galaxy Pipeline ---");
    let mut results = Vec::new();

    let config = GenerationConfig::from_tier(SizeTier::Small, 42);
    let (store, report) = run_small(42);
    let galaxy_id = report.galaxy_id;

    results.push(TestResult {
        name: "pipeline_success".into(),
        passed: report.success && report.stages.len() == 9,
        detail: format!(
            "9 stages, failed_stage={:?}",
            report.failed_stage.as_deref()
        ),
    });

    let galaxy = store.galaxy(galaxy_id).expect("galaxy row");
    results.push(TestResult {
        name: "pipeline_galaxy_active".into(),
        passed: galaxy.status == GalaxyStatus::Active
            && galaxy.generation_completed_at.is_some(),
        detail: format!("galaxy '{}' active", galaxy.name),
    });

    let counts = store.counts(galaxy_id);
    let stars_ok = counts.stars <= SizeTier::Small.total_stars()
        && counts.stars > SizeTier::Small.total_stars() / 2;
    results.push(TestResult {
        name: "pipeline_star_counts".into(),
        passed: stars_ok,
        detail: format!(
            "{} stars placed of {} requested",
            counts.stars,
            SizeTier::Small.total_stars()
        ),
    });

    results.push(TestResult {
        name: "pipeline_bodies_generated".into(),
        passed: counts.planets > 0 && counts.moons > 0 && counts.belts > 0,
        detail: format!(
            "{} planets, {} moons, {} belts",
            counts.planets, counts.moons, counts.belts
        ),
    });

    let grid = config.grid_size() as usize;
    results.push(TestResult {
        name: "pipeline_sector_grid".into(),
        passed: counts.sectors == grid * grid,
        detail: format!("{} sectors ({grid}×{grid})", counts.sectors),
    });

    // Every POI sits in a sector, the late-placed derelict included.
    let unassigned = store
        .pois(galaxy_id, &PoiFilter::default())
        .iter()
        .filter(|p| p.sector_id.is_none())
        .count();
    results.push(TestResult {
        name: "pipeline_sector_totality".into(),
        passed: unassigned == 0,
        detail: format!("{unassigned} POIs without a sector"),
    });

    // Gate network: deduped, thresholds honored.
    let gates = store.gates(galaxy_id);
    let mut seen = HashSet::new();
    let mut dup = 0usize;
    let mut over_distance = 0usize;
    for g in gates.iter().filter(|g| g.gate_kind == GateKind::Standard) {
        if !seen.insert(canonical_key(g.source_x, g.source_y, g.dest_x, g.dest_y)) {
            dup += 1;
        }
        let limit = match g.status {
            GateStatus::Active => config.gate_adjacency(),
            _ => config.outer_gate_max_distance,
        };
        if g.distance > limit + 2.0 {
            over_distance += 1;
        }
    }
    results.push(TestResult {
        name: "pipeline_gate_network".into(),
        passed: !gates.is_empty() && dup == 0 && over_distance == 0,
        detail: format!(
            "{} gates ({} active, {} dormant), {} dups, {} over threshold",
            counts.gates, counts.active_gates, counts.dormant_gates, dup, over_distance
        ),
    });

    results.push(TestResult {
        name: "pipeline_hidden_gates".into(),
        passed: counts.hidden_gates > 0,
        detail: format!("{} hidden gates", counts.hidden_gates),
    });

    // Defense and trading coverage.
    let inhabited = counts.inhabited_stars;
    results.push(TestResult {
        name: "pipeline_defense_coverage".into(),
        passed: counts.defenses == inhabited * 5 && counts.fortified_systems == inhabited,
        detail: format!(
            "{} defenses over {} inhabited stars",
            counts.defenses, inhabited
        ),
    });
    results.push(TestResult {
        name: "pipeline_trading_coverage".into(),
        passed: counts.trading_hubs == inhabited,
        detail: format!("{} hubs for {} inhabited stars", counts.trading_hubs, inhabited),
    });

    // Precursor artifacts and the mirror link.
    let derelicts = store.pois(galaxy_id, &PoiFilter::default().of_type(PoiType::Derelict));
    let entry_gates = gates
        .iter()
        .filter(|g| g.gate_kind == GateKind::MirrorEntry && g.status == GateStatus::Active)
        .count();
    results.push(TestResult {
        name: "pipeline_precursor_content".into(),
        passed: derelicts.len() == 1 && entry_gates == 1,
        detail: format!(
            "{} derelict, {} mirror entry gates",
            derelicts.len(),
            entry_gates
        ),
    });

    let mirror = store.mirror_of(galaxy_id);
    let mirror_ok = match &mirror {
        Some(m) => {
            let mirror_counts = store.counts(m.id);
            let returns = store
                .gates(m.id)
                .iter()
                .filter(|g| g.gate_kind == GateKind::MirrorReturn)
                .count();
            m.status == GalaxyStatus::Active
                && m.seed == galaxy.seed
                && mirror_counts.stars > 0
                && returns == 1
        }
        None => false,
    };
    results.push(TestResult {
        name: "pipeline_mirror_universe".into(),
        passed: mirror_ok,
        detail: match &mirror {
            Some(m) => format!("mirror galaxy {} '{}'", m.id, m.name),
            None => "no mirror galaxy".into(),
        },
    });

    // Frontier minerals.
    let frontier_bodies: Vec<_> = store
        .pois(
            galaxy_id,
            &PoiFilter::default()
                .in_region(Region::Outer)
                .excluding_type(PoiType::Star),
        )
        .into_iter()
        .filter(|p| p.poi_type != PoiType::Derelict)
        .collect();
    let with_deposits = frontier_bodies
        .iter()
        .filter(|b| b.mineral_deposits.is_some())
        .count();
    results.push(TestResult {
        name: "pipeline_mineral_deposits".into(),
        passed: with_deposits * 10 > frontier_bodies.len() * 8,
        detail: format!(
            "{}/{} frontier bodies carry deposits",
            with_deposits,
            frontier_bodies.len()
        ),
    });

    // Determinism across two runs of the same seed.
    let (store2, report2) = run_small(42);
    results.push(TestResult {
        name: "pipeline_deterministic".into(),
        passed: store2.counts(report2.galaxy_id) == counts,
        detail: "same seed reproduces identical row counts".into(),
    });

    // Snapshot round trip.
    let mut bytes = Vec::new();
    let snapshot_ok = save_galaxy(&mut bytes, &store, galaxy_id).is_ok();
    let reload = load_galaxy(bytes.as_slice());
    let round_trip = snapshot_ok
        && reload
            .map(|s| s.pois.len() == counts.pois && s.gates.len() == counts.gates)
            .unwrap_or(false);
    results.push(TestResult {
        name: "pipeline_snapshot_round_trip".into(),
        passed: round_trip,
        detail: format!("{} bytes serialized", bytes.len()),
    });

    if verbose {
        println!("  stage timings:");
        for stage in &report.stages {
            println!("    {:24} {:>5} ms", stage.name, stage.elapsed_ms);
        }
    }

    results
}
