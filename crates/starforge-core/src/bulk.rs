//! Chunked bulk writes.
//!
//! Generators build rows in memory and hand them to the store in chunks so a
//! large galaxy never holds one giant insert. The default chunk is 500 rows;
//! hot paths (planets, gates) pass larger chunks. Input vectors are drained
//! chunk by chunk, so peak memory is the chunk, not the whole batch, on the
//! store side.

use serde_json::Value;

use crate::error::StoreError;
use crate::store::{OnConflict, Store};
use crate::tables::{PoiRow, SystemDefenseRow, TradingHubRow, WarpGateRow};

pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Split `rows` into chunks and feed each to `write`, summing results.
fn chunked<T, R>(
    mut rows: Vec<T>,
    chunk_size: usize,
    mut write: impl FnMut(Vec<T>) -> R,
) -> Vec<R> {
    let chunk_size = chunk_size.max(1);
    let mut results = Vec::new();
    while !rows.is_empty() {
        let take = rows.len().min(chunk_size);
        let chunk: Vec<T> = rows.drain(..take).collect();
        results.push(write(chunk));
    }
    results
}

/// Insert POIs in chunks, returning assigned ids in input order.
pub fn insert_pois(store: &mut dyn Store, rows: Vec<PoiRow>, chunk_size: usize) -> Vec<u64> {
    chunked(rows, chunk_size, |chunk| store.insert_pois(chunk))
        .into_iter()
        .flatten()
        .collect()
}

/// Insert gates in chunks with insert-or-ignore semantics, returning the
/// number of rows actually inserted.
pub fn insert_gates_ignoring(
    store: &mut dyn Store,
    rows: Vec<WarpGateRow>,
    chunk_size: usize,
) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for result in chunked(rows, chunk_size, |chunk| {
        store.insert_gates(chunk, OnConflict::Ignore)
    }) {
        inserted += result?.len();
    }
    Ok(inserted)
}

pub fn insert_hubs(store: &mut dyn Store, rows: Vec<TradingHubRow>, chunk_size: usize) -> usize {
    chunked(rows, chunk_size, |chunk| store.insert_hubs(chunk))
        .into_iter()
        .sum()
}

pub fn insert_defenses(
    store: &mut dyn Store,
    rows: Vec<SystemDefenseRow>,
    chunk_size: usize,
) -> usize {
    chunked(rows, chunk_size, |chunk| store.insert_defenses(chunk))
        .into_iter()
        .sum()
}

/// Apply sector assignments in chunks, returning rows touched.
pub fn assign_sectors(store: &mut dyn Store, updates: Vec<(u64, u64)>, chunk_size: usize) -> usize {
    chunked(updates, chunk_size, |chunk| store.assign_sectors(&chunk))
        .into_iter()
        .sum()
}

/// Apply mineral deposit payloads in chunks, returning rows touched.
pub fn set_mineral_deposits(
    store: &mut dyn Store,
    updates: Vec<(u64, Value)>,
    chunk_size: usize,
) -> usize {
    chunked(updates, chunk_size, |chunk| {
        store.set_mineral_deposits(&chunk)
    })
    .into_iter()
    .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_covers_all_rows() {
        let rows: Vec<u32> = (0..1234).collect();
        let mut chunks = Vec::new();
        let results = chunked(rows, 500, |chunk| {
            chunks.push(chunk.len());
            chunk.len()
        });
        assert_eq!(chunks, vec![500, 500, 234]);
        assert_eq!(results.iter().sum::<usize>(), 1234);
    }

    #[test]
    fn empty_input_writes_nothing() {
        let rows: Vec<u32> = Vec::new();
        let mut calls = 0;
        chunked(rows, 500, |_| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn exact_multiple_has_no_trailing_chunk() {
        let rows: Vec<u32> = (0..1000).collect();
        let mut chunks = Vec::new();
        chunked(rows, 500, |chunk| chunks.push(chunk.len()));
        assert_eq!(chunks, vec![500, 500]);
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let rows: Vec<u32> = (0..3).collect();
        let mut chunks = Vec::new();
        chunked(rows, 0, |chunk| chunks.push(chunk.len()));
        assert_eq!(chunks, vec![1, 1, 1]);
    }
}
