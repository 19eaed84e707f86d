//! The persistence sink.
//!
//! Generators never talk to a database directly; they go through [`Store`],
//! which exposes the handful of insert/update/query primitives the pipeline
//! needs. [`MemoryStore`] is the reference implementation and the backend for
//! tests, the simtest harness, and snapshot round-trips. A SQL-backed store
//! implements the same trait.
//!
//! Gate inserts enforce uniqueness on the canonical endpoint pair per galaxy,
//! so re-running the gate stage cannot duplicate lanes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use starforge_logic::lanes::{canonical_key, PairKey};

use crate::error::StoreError;
use crate::tables::{
    GalaxyRow, GateStatus, PoiRow, PoiType, Region, SectorRow, SystemDefenseRow, TradingHubRow,
    WarpGateRow,
};

/// Conflict behavior for gate inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// Duplicate canonical endpoints are an error.
    Error,
    /// Duplicate canonical endpoints are silently skipped.
    Ignore,
}

/// Query filter for POI lookups. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct PoiFilter {
    pub poi_type: Option<PoiType>,
    pub exclude_type: Option<PoiType>,
    pub region: Option<Region>,
    pub inhabited: Option<bool>,
}

impl PoiFilter {
    pub fn of_type(mut self, poi_type: PoiType) -> Self {
        self.poi_type = Some(poi_type);
        self
    }

    pub fn excluding_type(mut self, poi_type: PoiType) -> Self {
        self.exclude_type = Some(poi_type);
        self
    }

    pub fn in_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn inhabited(mut self, inhabited: bool) -> Self {
        self.inhabited = Some(inhabited);
        self
    }

    fn matches(&self, poi: &PoiRow) -> bool {
        self.poi_type.map_or(true, |t| poi.poi_type == t)
            && self.exclude_type.map_or(true, |t| poi.poi_type != t)
            && self.region.map_or(true, |r| poi.region == r)
            && self.inhabited.map_or(true, |i| poi.is_inhabited == i)
    }
}

/// Row counts for one galaxy, for statistics reporting.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GalaxyCounts {
    pub pois: usize,
    pub stars: usize,
    pub planets: usize,
    pub moons: usize,
    pub belts: usize,
    pub inhabited_stars: usize,
    pub fortified_systems: usize,
    pub sectors: usize,
    pub gates: usize,
    pub active_gates: usize,
    pub dormant_gates: usize,
    pub hidden_gates: usize,
    pub trading_hubs: usize,
    pub defenses: usize,
}

/// The persistence sink contract.
pub trait Store: Send {
    // ── Galaxies ────────────────────────────────────────────────────────
    fn insert_galaxy(&mut self, row: GalaxyRow) -> u64;
    fn update_galaxy(&mut self, row: &GalaxyRow) -> Result<(), StoreError>;
    fn galaxy(&self, id: u64) -> Option<GalaxyRow>;
    /// The mirror galaxy of `prime_id`, if one exists.
    fn mirror_of(&self, prime_id: u64) -> Option<GalaxyRow>;

    // ── Points of interest ──────────────────────────────────────────────
    /// Insert rows, returning assigned ids in input order.
    fn insert_pois(&mut self, rows: Vec<PoiRow>) -> Vec<u64>;
    fn pois(&self, galaxy_id: u64, filter: &PoiFilter) -> Vec<PoiRow>;
    /// Apply `(poi_id, sector_id)` assignments; returns rows touched.
    fn assign_sectors(&mut self, updates: &[(u64, u64)]) -> usize;
    /// Apply `(poi_id, deposits)` payloads; returns rows touched.
    fn set_mineral_deposits(&mut self, updates: &[(u64, Value)]) -> usize;
    fn mark_fortified(&mut self, poi_ids: &[u64]) -> usize;
    /// Merge one key into a POI's attribute object.
    fn merge_poi_attribute(&mut self, poi_id: u64, key: &str, value: Value)
        -> Result<(), StoreError>;

    // ── Sectors ─────────────────────────────────────────────────────────
    fn insert_sectors(&mut self, rows: Vec<SectorRow>) -> Vec<u64>;
    fn sectors(&self, galaxy_id: u64) -> Vec<SectorRow>;

    // ── Warp gates ──────────────────────────────────────────────────────
    /// Insert gates, enforcing canonical endpoint uniqueness per galaxy.
    /// Returns the ids of rows actually inserted.
    fn insert_gates(
        &mut self,
        rows: Vec<WarpGateRow>,
        on_conflict: OnConflict,
    ) -> Result<Vec<u64>, StoreError>;
    fn gates(&self, galaxy_id: u64) -> Vec<WarpGateRow>;
    fn update_gate(&mut self, row: &WarpGateRow) -> Result<(), StoreError>;
    fn hide_gates(&mut self, gate_ids: &[u64]) -> usize;

    // ── Trading hubs and defenses ───────────────────────────────────────
    fn insert_hubs(&mut self, rows: Vec<TradingHubRow>) -> usize;
    fn hubs(&self, galaxy_id: u64) -> Vec<TradingHubRow>;
    fn insert_defenses(&mut self, rows: Vec<SystemDefenseRow>) -> usize;
    fn defenses(&self, galaxy_id: u64) -> Vec<SystemDefenseRow>;

    fn counts(&self, galaxy_id: u64) -> GalaxyCounts;
}

/// In-memory reference store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: u64,
    galaxies: Vec<GalaxyRow>,
    pois: Vec<PoiRow>,
    sectors: Vec<SectorRow>,
    gates: Vec<WarpGateRow>,
    hubs: Vec<TradingHubRow>,
    defenses: Vec<SystemDefenseRow>,
    gate_keys: HashSet<(u64, PairKey)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn gate_key(row: &WarpGateRow) -> (u64, PairKey) {
        (
            row.galaxy_id,
            canonical_key(row.source_x, row.source_y, row.dest_x, row.dest_y),
        )
    }
}

impl Store for MemoryStore {
    fn insert_galaxy(&mut self, mut row: GalaxyRow) -> u64 {
        let id = self.next_id();
        row.id = id;
        self.galaxies.push(row);
        id
    }

    fn update_galaxy(&mut self, row: &GalaxyRow) -> Result<(), StoreError> {
        let existing = self
            .galaxies
            .iter_mut()
            .find(|g| g.id == row.id)
            .ok_or(StoreError::MissingRow {
                table: "galaxies",
                id: row.id,
            })?;
        *existing = row.clone();
        Ok(())
    }

    fn galaxy(&self, id: u64) -> Option<GalaxyRow> {
        self.galaxies.iter().find(|g| g.id == id).cloned()
    }

    fn mirror_of(&self, prime_id: u64) -> Option<GalaxyRow> {
        self.galaxies
            .iter()
            .find(|g| g.mirror_of == Some(prime_id))
            .cloned()
    }

    fn insert_pois(&mut self, rows: Vec<PoiRow>) -> Vec<u64> {
        let mut ids = Vec::with_capacity(rows.len());
        for mut row in rows {
            let id = self.next_id();
            row.id = id;
            ids.push(id);
            self.pois.push(row);
        }
        ids
    }

    fn pois(&self, galaxy_id: u64, filter: &PoiFilter) -> Vec<PoiRow> {
        self.pois
            .iter()
            .filter(|p| p.galaxy_id == galaxy_id && filter.matches(p))
            .cloned()
            .collect()
    }

    fn assign_sectors(&mut self, updates: &[(u64, u64)]) -> usize {
        let mut touched = 0;
        for &(poi_id, sector_id) in updates {
            if let Some(poi) = self.pois.iter_mut().find(|p| p.id == poi_id) {
                poi.sector_id = Some(sector_id);
                touched += 1;
            }
        }
        touched
    }

    fn set_mineral_deposits(&mut self, updates: &[(u64, Value)]) -> usize {
        let mut touched = 0;
        for (poi_id, deposits) in updates {
            if let Some(poi) = self.pois.iter_mut().find(|p| p.id == *poi_id) {
                poi.mineral_deposits = Some(deposits.clone());
                touched += 1;
            }
        }
        touched
    }

    fn mark_fortified(&mut self, poi_ids: &[u64]) -> usize {
        let ids: HashSet<u64> = poi_ids.iter().copied().collect();
        let mut touched = 0;
        for poi in self.pois.iter_mut().filter(|p| ids.contains(&p.id)) {
            poi.is_fortified = true;
            touched += 1;
        }
        touched
    }

    fn merge_poi_attribute(
        &mut self,
        poi_id: u64,
        key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let poi = self
            .pois
            .iter_mut()
            .find(|p| p.id == poi_id)
            .ok_or(StoreError::MissingRow {
                table: "points_of_interest",
                id: poi_id,
            })?;
        if !poi.attributes.is_object() {
            poi.attributes = Value::Object(serde_json::Map::new());
        }
        if let Some(map) = poi.attributes.as_object_mut() {
            map.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn insert_sectors(&mut self, rows: Vec<SectorRow>) -> Vec<u64> {
        let mut ids = Vec::with_capacity(rows.len());
        for mut row in rows {
            let id = self.next_id();
            row.id = id;
            ids.push(id);
            self.sectors.push(row);
        }
        ids
    }

    fn sectors(&self, galaxy_id: u64) -> Vec<SectorRow> {
        self.sectors
            .iter()
            .filter(|s| s.galaxy_id == galaxy_id)
            .cloned()
            .collect()
    }

    fn insert_gates(
        &mut self,
        rows: Vec<WarpGateRow>,
        on_conflict: OnConflict,
    ) -> Result<Vec<u64>, StoreError> {
        let mut ids = Vec::with_capacity(rows.len());
        for mut row in rows {
            let key = Self::gate_key(&row);
            if !self.gate_keys.insert(key) {
                match on_conflict {
                    OnConflict::Ignore => continue,
                    OnConflict::Error => {
                        return Err(StoreError::DuplicateGate {
                            galaxy_id: row.galaxy_id,
                        })
                    }
                }
            }
            let id = self.next_id();
            row.id = id;
            ids.push(id);
            self.gates.push(row);
        }
        Ok(ids)
    }

    fn gates(&self, galaxy_id: u64) -> Vec<WarpGateRow> {
        self.gates
            .iter()
            .filter(|g| g.galaxy_id == galaxy_id)
            .cloned()
            .collect()
    }

    fn update_gate(&mut self, row: &WarpGateRow) -> Result<(), StoreError> {
        let existing = self
            .gates
            .iter_mut()
            .find(|g| g.id == row.id)
            .ok_or(StoreError::MissingRow {
                table: "warp_gates",
                id: row.id,
            })?;
        // Endpoints may move (precursor gate relinking), so the uniqueness
        // index follows the row.
        let old_key = Self::gate_key(existing);
        let new_key = Self::gate_key(row);
        *existing = row.clone();
        if old_key != new_key {
            self.gate_keys.remove(&old_key);
            self.gate_keys.insert(new_key);
        }
        Ok(())
    }

    fn hide_gates(&mut self, gate_ids: &[u64]) -> usize {
        let ids: HashSet<u64> = gate_ids.iter().copied().collect();
        let mut touched = 0;
        for gate in self.gates.iter_mut().filter(|g| ids.contains(&g.id)) {
            gate.is_hidden = true;
            touched += 1;
        }
        touched
    }

    fn insert_hubs(&mut self, rows: Vec<TradingHubRow>) -> usize {
        let count = rows.len();
        for mut row in rows {
            row.id = self.next_id();
            self.hubs.push(row);
        }
        count
    }

    fn hubs(&self, galaxy_id: u64) -> Vec<TradingHubRow> {
        self.hubs
            .iter()
            .filter(|h| h.galaxy_id == galaxy_id)
            .cloned()
            .collect()
    }

    fn insert_defenses(&mut self, rows: Vec<SystemDefenseRow>) -> usize {
        let count = rows.len();
        for mut row in rows {
            row.id = self.next_id();
            self.defenses.push(row);
        }
        count
    }

    fn defenses(&self, galaxy_id: u64) -> Vec<SystemDefenseRow> {
        self.defenses
            .iter()
            .filter(|d| d.galaxy_id == galaxy_id)
            .cloned()
            .collect()
    }

    fn counts(&self, galaxy_id: u64) -> GalaxyCounts {
        let mut counts = GalaxyCounts::default();
        for poi in self.pois.iter().filter(|p| p.galaxy_id == galaxy_id) {
            counts.pois += 1;
            match poi.poi_type {
                PoiType::Star => {
                    counts.stars += 1;
                    if poi.is_inhabited {
                        counts.inhabited_stars += 1;
                    }
                    if poi.is_fortified {
                        counts.fortified_systems += 1;
                    }
                }
                PoiType::Moon => counts.moons += 1,
                PoiType::AsteroidBelt => counts.belts += 1,
                PoiType::Derelict => {}
                _ => counts.planets += 1,
            }
        }
        counts.sectors = self
            .sectors
            .iter()
            .filter(|s| s.galaxy_id == galaxy_id)
            .count();
        for gate in self.gates.iter().filter(|g| g.galaxy_id == galaxy_id) {
            counts.gates += 1;
            match gate.status {
                GateStatus::Active => counts.active_gates += 1,
                GateStatus::Dormant => counts.dormant_gates += 1,
                GateStatus::Precursor => {}
            }
            if gate.is_hidden {
                counts.hidden_gates += 1;
            }
        }
        counts.trading_hubs = self
            .hubs
            .iter()
            .filter(|h| h.galaxy_id == galaxy_id)
            .count();
        counts.defenses = self
            .defenses
            .iter()
            .filter(|d| d.galaxy_id == galaxy_id)
            .count();
        counts
    }
}

/// A handle that implements [`Store`] over a shared inner store, taking the
/// lock once per operation. A pipeline run through this handle interleaves
/// with other callers instead of holding the store for the whole run.
pub struct SharedStore<S: Store> {
    inner: Arc<Mutex<S>>,
}

impl<S: Store> SharedStore<S> {
    pub fn new(inner: Arc<Mutex<S>>) -> Self {
        Self { inner }
    }

    // A worker that panicked while holding the lock still left valid rows;
    // poisoning is not an error state here.
    fn lock(&self) -> MutexGuard<'_, S> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<S: Store> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store> Store for SharedStore<S> {
    fn insert_galaxy(&mut self, row: GalaxyRow) -> u64 {
        self.lock().insert_galaxy(row)
    }

    fn update_galaxy(&mut self, row: &GalaxyRow) -> Result<(), StoreError> {
        self.lock().update_galaxy(row)
    }

    fn galaxy(&self, id: u64) -> Option<GalaxyRow> {
        self.lock().galaxy(id)
    }

    fn mirror_of(&self, prime_id: u64) -> Option<GalaxyRow> {
        self.lock().mirror_of(prime_id)
    }

    fn insert_pois(&mut self, rows: Vec<PoiRow>) -> Vec<u64> {
        self.lock().insert_pois(rows)
    }

    fn pois(&self, galaxy_id: u64, filter: &PoiFilter) -> Vec<PoiRow> {
        self.lock().pois(galaxy_id, filter)
    }

    fn assign_sectors(&mut self, updates: &[(u64, u64)]) -> usize {
        self.lock().assign_sectors(updates)
    }

    fn set_mineral_deposits(&mut self, updates: &[(u64, Value)]) -> usize {
        self.lock().set_mineral_deposits(updates)
    }

    fn mark_fortified(&mut self, poi_ids: &[u64]) -> usize {
        self.lock().mark_fortified(poi_ids)
    }

    fn merge_poi_attribute(
        &mut self,
        poi_id: u64,
        key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.lock().merge_poi_attribute(poi_id, key, value)
    }

    fn insert_sectors(&mut self, rows: Vec<SectorRow>) -> Vec<u64> {
        self.lock().insert_sectors(rows)
    }

    fn sectors(&self, galaxy_id: u64) -> Vec<SectorRow> {
        self.lock().sectors(galaxy_id)
    }

    fn insert_gates(
        &mut self,
        rows: Vec<WarpGateRow>,
        on_conflict: OnConflict,
    ) -> Result<Vec<u64>, StoreError> {
        self.lock().insert_gates(rows, on_conflict)
    }

    fn gates(&self, galaxy_id: u64) -> Vec<WarpGateRow> {
        self.lock().gates(galaxy_id)
    }

    fn update_gate(&mut self, row: &WarpGateRow) -> Result<(), StoreError> {
        self.lock().update_gate(row)
    }

    fn hide_gates(&mut self, gate_ids: &[u64]) -> usize {
        self.lock().hide_gates(gate_ids)
    }

    fn insert_hubs(&mut self, rows: Vec<TradingHubRow>) -> usize {
        self.lock().insert_hubs(rows)
    }

    fn hubs(&self, galaxy_id: u64) -> Vec<TradingHubRow> {
        self.lock().hubs(galaxy_id)
    }

    fn insert_defenses(&mut self, rows: Vec<SystemDefenseRow>) -> usize {
        self.lock().insert_defenses(rows)
    }

    fn defenses(&self, galaxy_id: u64) -> Vec<SystemDefenseRow> {
        self.lock().defenses(galaxy_id)
    }

    fn counts(&self, galaxy_id: u64) -> GalaxyCounts {
        self.lock().counts(galaxy_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::GateKind;
    use starforge_logic::tiers::SizeTier;

    fn galaxy() -> GalaxyRow {
        GalaxyRow {
            id: 0,
            name: "Test".into(),
            tier: SizeTier::Small,
            width: 500.0,
            height: 500.0,
            seed: 1,
            status: crate::tables::GalaxyStatus::Draft,
            mirror_of: None,
            mirror_galaxy_id: None,
            generation_started_at: None,
            generation_completed_at: None,
        }
    }

    fn gate(galaxy_id: u64, sx: f64, sy: f64, dx: f64, dy: f64) -> WarpGateRow {
        WarpGateRow {
            id: 0,
            galaxy_id,
            source_poi_id: 1,
            destination_poi_id: 2,
            source_x: sx,
            source_y: sy,
            dest_x: dx,
            dest_y: dy,
            distance: 0.0,
            status: GateStatus::Active,
            gate_kind: GateKind::Standard,
            is_hidden: false,
            activation_requirements: None,
        }
    }

    #[test]
    fn gate_inserts_deduplicate_reversed_endpoints() {
        let mut store = MemoryStore::new();
        let gid = store.insert_galaxy(galaxy());
        let first = store
            .insert_gates(vec![gate(gid, 0.0, 0.0, 10.0, 0.0)], OnConflict::Ignore)
            .unwrap();
        assert_eq!(first.len(), 1);
        // Same lane, endpoints swapped.
        let second = store
            .insert_gates(vec![gate(gid, 10.0, 0.0, 0.0, 0.0)], OnConflict::Ignore)
            .unwrap();
        assert!(second.is_empty());
        assert_eq!(store.gates(gid).len(), 1);
    }

    #[test]
    fn gate_conflict_errors_without_ignore() {
        let mut store = MemoryStore::new();
        let gid = store.insert_galaxy(galaxy());
        store
            .insert_gates(vec![gate(gid, 0.0, 0.0, 10.0, 0.0)], OnConflict::Error)
            .unwrap();
        let err = store
            .insert_gates(vec![gate(gid, 0.0, 0.0, 10.0, 0.0)], OnConflict::Error)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateGate { .. }));
    }

    #[test]
    fn same_endpoints_allowed_in_different_galaxies() {
        let mut store = MemoryStore::new();
        let a = store.insert_galaxy(galaxy());
        let b = store.insert_galaxy(galaxy());
        store
            .insert_gates(vec![gate(a, 0.0, 0.0, 10.0, 0.0)], OnConflict::Error)
            .unwrap();
        store
            .insert_gates(vec![gate(b, 0.0, 0.0, 10.0, 0.0)], OnConflict::Error)
            .unwrap();
        assert_eq!(store.gates(a).len(), 1);
        assert_eq!(store.gates(b).len(), 1);
    }

    #[test]
    fn update_gate_moves_uniqueness_key() {
        let mut store = MemoryStore::new();
        let gid = store.insert_galaxy(galaxy());
        let ids = store
            .insert_gates(vec![gate(gid, 0.0, 0.0, 0.0, 0.0)], OnConflict::Error)
            .unwrap();
        let mut moved = store.gates(gid).remove(0);
        assert_eq!(moved.id, ids[0]);
        moved.dest_x = 50.0;
        store.update_gate(&moved).unwrap();
        // The old self-referencing key is free again.
        store
            .insert_gates(vec![gate(gid, 0.0, 0.0, 0.0, 0.0)], OnConflict::Error)
            .unwrap();
    }

    #[test]
    fn shared_store_releases_the_lock_between_operations() {
        let inner = Arc::new(Mutex::new(MemoryStore::new()));
        let mut shared = SharedStore::new(Arc::clone(&inner));
        let gid = shared.insert_galaxy(galaxy());
        // The inner handle is free between shared operations; this would
        // deadlock if the handle kept the lock.
        assert!(inner.lock().unwrap().galaxy(gid).is_some());
        assert_eq!(shared.counts(gid).pois, 0);
    }

    #[test]
    fn missing_galaxy_update_is_an_error() {
        let mut store = MemoryStore::new();
        let mut row = galaxy();
        row.id = 99;
        assert!(matches!(
            store.update_galaxy(&row),
            Err(StoreError::MissingRow { .. })
        ));
    }
}
