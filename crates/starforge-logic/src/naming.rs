//! Name pools and weighted attribute tables.
//!
//! Star names mix three styles: catalog designations ("Antares Gamma IV"),
//! fictional syllable compounds ("Zorath"), and mythological names. Trading
//! hub names wrap the host star's name in prefix/suffix pools. Stellar class
//! and size come from weighted tables that differ between the civilized core
//! and the frontier.

use rand::seq::SliceRandom;
use rand::Rng;

/// Weighted selection over a static table. Weights need not sum to anything
/// in particular.
pub fn weighted_pick<'a, T: ?Sized>(table: &'a [(&'a T, u32)], rng: &mut impl Rng) -> &'a T {
    let total: u32 = table.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(1..=total.max(1));
    for &(value, weight) in table {
        if roll <= weight {
            return value;
        }
        roll -= weight;
    }
    table[table.len() - 1].0
}

// ── Stellar attribute tables ────────────────────────────────────────────

/// Core stars skew toward stable G/K main-sequence systems.
pub const STELLAR_CLASSES_CORE: [(&str, u32); 5] =
    [("G", 40), ("K", 30), ("F", 15), ("M", 10), ("A", 5)];

/// The frontier carries the full range, including hot O/B giants.
pub const STELLAR_CLASSES_OUTER: [(&str, u32); 7] = [
    ("O", 5),
    ("B", 15),
    ("A", 20),
    ("F", 20),
    ("G", 20),
    ("K", 15),
    ("M", 5),
];

pub const STELLAR_SIZES: [(&str, u32); 5] = [
    ("dwarf", 10),
    ("main_sequence", 40),
    ("subgiant", 25),
    ("giant", 20),
    ("supergiant", 5),
];

// ── Star names ──────────────────────────────────────────────────────────

const NAME_STYLES: [(&str, u32); 3] = [("catalog", 3), ("fictional", 5), ("mythological", 2)];

const CATALOG_STARS: [&str; 20] = [
    "Altair", "Vega", "Rigel", "Deneb", "Sirius", "Procyon", "Antares", "Arcturus", "Capella",
    "Pollux", "Castor", "Spica", "Bellatrix", "Aldebaran", "Fomalhaut", "Canopus", "Mizar",
    "Alnilam", "Regulus", "Betelgeuse",
];

const CATALOG_LETTERS: [&str; 12] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu",
];

const CATALOG_NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

const SYLLABLES: [&str; 19] = [
    "zor", "ath", "vel", "dra", "mor", "lek", "quor", "pho", "xin", "tal", "gar", "nov", "ser",
    "ith", "ran", "ul", "var", "nyx", "thar",
];

const MYTHOLOGICAL_NAMES: [&str; 48] = [
    "Erebus", "Nyx", "Thanatos", "Hypnos", "Ares", "Athena", "Zephyrus", "Kronos", "Gaia",
    "Selene", "Persephone", "Hecate", "Eos", "Nike", "Nemesis", "Helios", "Oceanus", "Tethys",
    "Phoebe", "Rhea", "Artemis", "Apollo", "Hermes", "Fenrir", "Jormungandr", "Odin", "Frigg",
    "Balder", "Loki", "Tyr", "Skadi", "Ymir", "Freya", "Vidar", "Njord", "Ra", "Anubis", "Osiris",
    "Isis", "Horus", "Thoth", "Bastet", "Sekhmet", "Morrigan", "Brigid", "Danu", "Lugh", "Tiamat",
];

/// Generate a star name in one of the three pooled styles.
pub fn star_name(rng: &mut impl Rng) -> String {
    match weighted_pick(&NAME_STYLES, rng) {
        "catalog" => format!(
            "{} {} {}",
            pick(&CATALOG_STARS, rng),
            pick(&CATALOG_LETTERS, rng),
            pick(&CATALOG_NUMERALS, rng),
        ),
        "fictional" => {
            let parts = rng.gen_range(2..=3);
            let mut name = String::new();
            for _ in 0..parts {
                name.push_str(pick(&SYLLABLES, rng));
            }
            capitalize(&name)
        }
        _ => pick(&MYTHOLOGICAL_NAMES, rng).to_string(),
    }
}

// ── Trading hub names ───────────────────────────────────────────────────

const HUB_PREFIXES: [&str; 6] = ["Central", "Prime", "Grand", "Imperial", "Federal", "Core"];

const HUB_SUFFIXES: [&str; 5] = [
    "Trading Post",
    "Commerce Hub",
    "Market Station",
    "Exchange",
    "Emporium",
];

/// "Prime Vega Exchange"-style hub name around the host star.
pub fn hub_name(star_name: &str, rng: &mut impl Rng) -> String {
    format!(
        "{} {} {}",
        pick(&HUB_PREFIXES, rng),
        star_name,
        pick(&HUB_SUFFIXES, rng),
    )
}

fn pick<'a>(pool: &'a [&'a str], rng: &mut impl Rng) -> &'a str {
    // Pools are non-empty constants.
    pool.choose(rng).copied().unwrap_or(pool[0])
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn weighted_pick_respects_weights() {
        let table: [(&str, u32); 2] = [("common", 90), ("rare", 10)];
        let mut rng = StdRng::seed_from_u64(1);
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for _ in 0..1000 {
            *counts.entry(weighted_pick(&table, &mut rng)).or_default() += 1;
        }
        assert!(counts["common"] > 700);
        assert!(counts["rare"] > 10);
    }

    #[test]
    fn weighted_pick_covers_all_entries() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut seen: HashMap<&str, u32> = HashMap::new();
        for _ in 0..2000 {
            *seen
                .entry(weighted_pick(&STELLAR_CLASSES_OUTER, &mut rng))
                .or_default() += 1;
        }
        assert_eq!(seen.len(), STELLAR_CLASSES_OUTER.len());
    }

    #[test]
    fn star_names_are_nonempty_and_capitalized() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let name = star_name(&mut rng);
            assert!(!name.is_empty());
            assert!(name.chars().next().is_some_and(|c| c.is_uppercase()));
        }
    }

    #[test]
    fn hub_name_wraps_star_name() {
        let mut rng = StdRng::seed_from_u64(4);
        let name = hub_name("Vega", &mut rng);
        assert!(name.contains("Vega"));
        assert!(HUB_PREFIXES.iter().any(|p| name.starts_with(p)));
        assert!(HUB_SUFFIXES.iter().any(|s| name.ends_with(s)));
    }

    #[test]
    fn star_names_deterministic_under_seed() {
        let gen = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10).map(|_| star_name(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(gen(11), gen(11));
    }
}
