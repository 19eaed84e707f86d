//! Versioned binary snapshots of a single galaxy.
//!
//! Serializes every row belonging to one galaxy (including its mirror's
//! linkage on the galaxy row, but not the mirror's own rows) with bincode,
//! behind a format version check.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::store::{MemoryStore, PoiFilter, Store};
use crate::tables::{GalaxyRow, PoiRow, SectorRow, SystemDefenseRow, TradingHubRow, WarpGateRow};

/// Increment when the snapshot layout changes.
const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to reconstruct one galaxy.
#[derive(Debug, Serialize, Deserialize)]
pub struct GalaxySnapshot {
    pub version: u32,
    pub galaxy: GalaxyRow,
    pub pois: Vec<PoiRow>,
    pub sectors: Vec<SectorRow>,
    pub gates: Vec<WarpGateRow>,
    pub hubs: Vec<TradingHubRow>,
    pub defenses: Vec<SystemDefenseRow>,
}

/// Capture a galaxy's rows from the store.
pub fn snapshot_galaxy(store: &dyn Store, galaxy_id: u64) -> Result<GalaxySnapshot, SnapshotError> {
    let galaxy = store
        .galaxy(galaxy_id)
        .ok_or(SnapshotError::UnknownGalaxy(galaxy_id))?;
    Ok(GalaxySnapshot {
        version: SNAPSHOT_VERSION,
        galaxy,
        pois: store.pois(galaxy_id, &PoiFilter::default()),
        sectors: store.sectors(galaxy_id),
        gates: store.gates(galaxy_id),
        hubs: store.hubs(galaxy_id),
        defenses: store.defenses(galaxy_id),
    })
}

/// Write a galaxy snapshot to `writer`.
pub fn save_galaxy<W: Write>(
    writer: W,
    store: &dyn Store,
    galaxy_id: u64,
) -> Result<(), SnapshotError> {
    let snapshot = snapshot_galaxy(store, galaxy_id)?;
    bincode::serialize_into(writer, &snapshot)?;
    Ok(())
}

/// Read a galaxy snapshot from `reader`, checking the format version.
pub fn load_galaxy<R: Read>(reader: R) -> Result<GalaxySnapshot, SnapshotError> {
    let snapshot: GalaxySnapshot = bincode::deserialize_from(reader)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: snapshot.version,
        });
    }
    Ok(snapshot)
}

impl MemoryStore {
    /// Import a snapshot's rows, reassigning ids and rewriting references.
    /// Returns the new galaxy id.
    pub fn import_snapshot(&mut self, snapshot: GalaxySnapshot) -> u64 {
        use std::collections::HashMap;

        let mut galaxy = snapshot.galaxy;
        let old_galaxy_id = galaxy.id;
        galaxy.id = 0;
        let galaxy_id = self.insert_galaxy(galaxy);

        // Sectors first; POIs reference them.
        let mut sector_ids: HashMap<u64, u64> = HashMap::new();
        let old_sector_ids: Vec<u64> = snapshot.sectors.iter().map(|s| s.id).collect();
        let rows: Vec<SectorRow> = snapshot
            .sectors
            .into_iter()
            .map(|mut s| {
                s.id = 0;
                s.galaxy_id = galaxy_id;
                s
            })
            .collect();
        for (old, new) in old_sector_ids.iter().zip(self.insert_sectors(rows)) {
            sector_ids.insert(*old, new);
        }

        // POIs in insertion order; parents were inserted before children in
        // the original run, so ids stay resolvable in one pass.
        let mut poi_ids: HashMap<u64, u64> = HashMap::new();
        for mut poi in snapshot.pois {
            let old_id = poi.id;
            poi.id = 0;
            poi.galaxy_id = galaxy_id;
            poi.parent_poi_id = poi.parent_poi_id.and_then(|p| poi_ids.get(&p).copied());
            poi.sector_id = poi.sector_id.and_then(|s| sector_ids.get(&s).copied());
            let new_ids = self.insert_pois(vec![poi]);
            poi_ids.insert(old_id, new_ids[0]);
        }

        let map_poi = |poi_ids: &HashMap<u64, u64>, id: u64| poi_ids.get(&id).copied().unwrap_or(id);
        for mut gate in snapshot.gates {
            gate.id = 0;
            // Mirror-linked gates may reference POIs outside this galaxy;
            // those ids pass through unmapped.
            if gate.galaxy_id == old_galaxy_id {
                gate.galaxy_id = galaxy_id;
            }
            gate.source_poi_id = map_poi(&poi_ids, gate.source_poi_id);
            gate.destination_poi_id = map_poi(&poi_ids, gate.destination_poi_id);
            let _ = self.insert_gates(vec![gate], crate::store::OnConflict::Ignore);
        }

        for mut hub in snapshot.hubs {
            hub.id = 0;
            hub.galaxy_id = galaxy_id;
            hub.poi_id = map_poi(&poi_ids, hub.poi_id);
            self.insert_hubs(vec![hub]);
        }
        for mut defense in snapshot.defenses {
            defense.id = 0;
            defense.galaxy_id = galaxy_id;
            defense.poi_id = map_poi(&poi_ids, defense.poi_id);
            self.insert_defenses(vec![defense]);
        }

        galaxy_id
    }
}
