//! Sector grid math.
//!
//! The galaxy is divided into a `grid × grid` overlay of equal rectangular
//! sectors. Rows are named after Greek letters (wrapping with a numeric
//! suffix past Omega), columns are 1-based, so the sector at grid (2, 0) is
//! "Alpha-3". Every coordinate inside the galaxy maps to exactly one sector;
//! points on the outer boundary clamp into the last row/column.

use crate::geometry::Bounds;

const GREEK_LETTERS: [&str; 24] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi", "Rho", "Sigma", "Tau", "Upsilon", "Phi", "Chi",
    "Psi", "Omega",
];

/// Row label for grid row `y`: Greek letter, wrapping with a numeric suffix.
pub fn row_name(grid_y: u32) -> String {
    let letter = GREEK_LETTERS[grid_y as usize % GREEK_LETTERS.len()];
    if grid_y as usize >= GREEK_LETTERS.len() {
        format!("{}-{}", letter, grid_y as usize / GREEK_LETTERS.len())
    } else {
        letter.to_string()
    }
}

/// Display name for the sector at `(grid_x, grid_y)`, e.g. "Gamma-4".
pub fn sector_name(grid_x: u32, grid_y: u32) -> String {
    format!("{}-{}", row_name(grid_y), grid_x + 1)
}

/// The rectangle covered by the sector at `(grid_x, grid_y)`.
pub fn cell_bounds(grid_x: u32, grid_y: u32, sector_width: f64, sector_height: f64) -> Bounds {
    Bounds::new(
        grid_x as f64 * sector_width,
        grid_y as f64 * sector_height,
        (grid_x + 1) as f64 * sector_width,
        (grid_y + 1) as f64 * sector_height,
    )
}

/// The grid cell containing `(x, y)`, clamped to the last valid index so
/// boundary coordinates always resolve.
pub fn grid_cell_for(
    x: f64,
    y: f64,
    sector_width: f64,
    sector_height: f64,
    grid_size: u32,
) -> (u32, u32) {
    let max_index = grid_size.saturating_sub(1);
    let gx = ((x / sector_width).floor().max(0.0) as u32).min(max_index);
    let gy = ((y / sector_height).floor().max(0.0) as u32).min(max_index);
    (gx, gy)
}
