//! Pure galaxy generation algorithms for Starforge.
//!
//! This crate contains all placement and synthesis logic that is independent
//! of any database, engine, or runtime. Functions take plain data plus an
//! explicit RNG and return results, making them unit-testable, deterministic
//! under a fixed seed, and portable across backends.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bodies`] | Planet/moon/belt synthesis tables and mineral richness tiers |
//! | [`geometry`] | Points, rectangular bounds, distance helpers |
//! | [`lanes`] | Canonical warp-lane pair keys and deduplicated pair collection |
//! | [`naming`] | Name pools and weighted stellar attribute tables |
//! | [`points`] | Spiral and rejection-sampling point placement strategies |
//! | [`sectors`] | Sector grid math and Greek-letter row naming |
//! | [`spatial`] | Uniform-grid spatial index with brute-force small-input path |
//! | [`tiers`] | Galaxy size tiers (dimensions, star counts, grid sizes) |

pub mod bodies;
pub mod geometry;
pub mod lanes;
pub mod naming;
pub mod points;
pub mod sectors;
pub mod spatial;
pub mod tiers;
