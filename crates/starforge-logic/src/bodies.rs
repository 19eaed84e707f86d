//! Planetary body synthesis tables.
//!
//! Outer-region stars get 3–7 planets. Planet type follows orbital position
//! (inner orbits rocky, outermost two giants, the middle band cycling through
//! a fixed type list), moon counts and sizes follow planet type, and systems
//! with five or more planets may carry an asteroid belt. Children inherit
//! their star's map coordinates; orbital distance is an attribute, not a
//! position.
//!
//! Also holds the mineral catalog and deposit richness tiers.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Planetary body types produced by system synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanetKind {
    Terrestrial,
    Lava,
    GasGiant,
    IceGiant,
    SuperEarth,
    Ocean,
}

const MIDDLE_BAND: [PlanetKind; 5] = [
    PlanetKind::Terrestrial,
    PlanetKind::GasGiant,
    PlanetKind::IceGiant,
    PlanetKind::SuperEarth,
    PlanetKind::Ocean,
];

const ROMAN_NUMERALS: [&str; 13] = [
    "", "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

pub const MOON_SIZES: [&str; 2] = ["tiny", "small"];
pub const BELT_DENSITIES: [&str; 3] = ["sparse", "moderate", "dense"];

/// Draw a planet count for one system.
pub fn planet_count(rng: &mut impl Rng) -> usize {
    rng.gen_range(3..=7)
}

/// Half of systems carry a belt, provided they are large enough.
pub fn rolls_belt(planet_total: usize, rng: &mut impl Rng) -> bool {
    planet_total >= 5 && rng.gen_bool(0.5)
}

/// Planet type by 1-based orbital position.
pub fn planet_kind(orbital_index: usize, planet_total: usize) -> PlanetKind {
    if orbital_index <= 2 {
        // Inner orbits are rocky.
        return if orbital_index % 2 == 0 {
            PlanetKind::Terrestrial
        } else {
            PlanetKind::Lava
        };
    }
    if orbital_index >= planet_total.saturating_sub(1) {
        // Outermost two orbits are giants.
        return if orbital_index % 2 == 0 {
            PlanetKind::IceGiant
        } else {
            PlanetKind::GasGiant
        };
    }
    MIDDLE_BAND[orbital_index % MIDDLE_BAND.len()]
}

/// Moon count by planet type.
pub fn moon_count(kind: PlanetKind) -> u32 {
    match kind {
        PlanetKind::GasGiant => 4,
        PlanetKind::IceGiant => 3,
        PlanetKind::SuperEarth => 1,
        _ => 0,
    }
}

/// Size attribute by planet type.
pub fn planet_size(kind: PlanetKind) -> &'static str {
    match kind {
        PlanetKind::GasGiant => "massive",
        PlanetKind::IceGiant | PlanetKind::SuperEarth => "large",
        PlanetKind::Terrestrial | PlanetKind::Ocean | PlanetKind::Lava => "medium",
    }
}

/// Orbital distance attribute for the planet at 1-based `orbital_index`.
pub fn orbital_distance(orbital_index: usize) -> u32 {
    (orbital_index * 10 + orbital_index % 6) as u32
}

/// Orbital distance attribute for the moon at 1-based `moon_index`.
pub fn moon_orbital_distance(moon_index: usize) -> u32 {
    (moon_index * 2 + moon_index % 3) as u32
}

pub fn moon_size(moon_index: usize) -> &'static str {
    MOON_SIZES[moon_index % MOON_SIZES.len()]
}

/// Belt orbital slot for a system with `planet_total` planets. The belt
/// sits one orbit past the outermost planet so orbital indices stay unique
/// among a star's children.
pub fn belt_index(planet_total: usize) -> usize {
    planet_total + 1
}

pub fn belt_density(belt_index: usize) -> &'static str {
    BELT_DENSITIES[belt_index % BELT_DENSITIES.len()]
}

/// "StarName II"-style planet name. Positions past XII fall back to digits.
pub fn planet_name(star_name: &str, orbital_index: usize) -> String {
    match ROMAN_NUMERALS.get(orbital_index) {
        Some(numeral) => format!("{star_name} {numeral}"),
        None => format!("{star_name} {orbital_index}"),
    }
}

/// "Planet-a", "Planet-b" moon names by 1-based moon index.
pub fn moon_name(planet_name: &str, moon_index: usize) -> String {
    let letter = (b'a' + (moon_index as u8 - 1).min(25)) as char;
    format!("{planet_name}-{letter}")
}

// ── Minerals ────────────────────────────────────────────────────────────

/// The mineral catalog: (name, symbol). Order matches ascending rarity.
pub const MINERALS: [(&str, &str); 26] = [
    ("Water Ice", "H2O"),
    ("Carbon", "C"),
    ("Iron Ore", "Fe"),
    ("Silicates", "SiO2"),
    ("Nickel", "Ni"),
    ("Titanium", "Ti"),
    ("Copper", "Cu"),
    ("Aluminum", "Al"),
    ("Lithium", "Li"),
    ("Platinum", "Pt"),
    ("Gold", "Au"),
    ("Palladium", "Pd"),
    ("Cobalt", "Co"),
    ("Rhodium", "Rh"),
    ("Iridium", "Ir"),
    ("Osmium", "Os"),
    ("Tritium", "T"),
    ("Antimatter Particles", "AM"),
    ("Neutronium", "Nt"),
    ("Dark Matter Crystals", "DMC"),
    ("Quantum Foam", "QF"),
    ("Exotic Matter", "EM"),
    ("Chronoton Particles", "CP"),
    ("Starcore Fragments", "SCF"),
    ("Zero-Point Energy Crystals", "ZPE"),
    ("Primordial Elements", "PE"),
];

/// Richness tier from a deposit's (already multiplied) size.
pub fn richness_tier(size: u32) -> &'static str {
    match size {
        s if s >= 1500 => "legendary",
        s if s >= 1000 => "abundant",
        s if s >= 500 => "rich",
        s if s >= 200 => "moderate",
        _ => "trace",
    }
}
