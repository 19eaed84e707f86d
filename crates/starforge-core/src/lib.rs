//! Galaxy generation pipeline for Starforge.
//!
//! This crate turns the pure algorithms in `starforge-logic` into a staged
//! generation pipeline: generators write rows through the [`store::Store`]
//! trait, the [`orchestrator::Orchestrator`] sequences them by declared
//! dependencies, and the [`jobs`] layer runs large generations on a worker
//! thread behind a poll protocol.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bulk`] | Chunked bulk-insert helpers over the store trait |
//! | [`config`] | Generation parameters, mirror overrides, per-stage RNG streams |
//! | [`error`] | Store, generation, and snapshot error types |
//! | [`generators`] | The nine pipeline stages (star field through mirror universe) |
//! | [`jobs`] | Background dispatch, complexity threshold, poll state machine |
//! | [`metrics`] | Per-stage timing and row counts |
//! | [`orchestrator`] | Dependency resolution and pipeline execution |
//! | [`progress`] | TTL'd progress records shared between worker and pollers |
//! | [`snapshot`] | Versioned bincode export/import of one galaxy's rows |
//! | [`store`] | The persistence sink trait and the in-memory reference store |
//! | [`tables`] | Row types for galaxies, POIs, sectors, gates, hubs, defenses |

pub mod bulk;
pub mod config;
pub mod error;
pub mod generators;
pub mod jobs;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod snapshot;
pub mod store;
pub mod tables;
