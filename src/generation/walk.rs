//! Random walk generators
//!
//! Two families: surface walkers that move a terrain height along the x axis,
//! and cave walkers that wander through solid rock clearing cells until a
//! target fraction of the map is open.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::settings::clear_target;
use crate::tilemap::{MapGrid, Tile};

const CARDINAL: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

const ALL_DIRECTIONS: [(i64, i64); 8] = [
    (-1, 0), (1, 0), (0, -1), (0, 1),
    (-1, -1), (1, -1), (-1, 1), (1, 1),
];

/// Surface heights stay inside [lo, hi], one row away from floor and ceiling
/// when the map is tall enough.
fn surface_bounds(height: usize) -> (usize, usize) {
    let lo = 1usize.min(height.saturating_sub(1));
    let hi = height.saturating_sub(2).max(lo);
    (lo, hi)
}

/// Step the surface down, up, or leave it, staying within bounds.
fn step_height(rng: &mut ChaCha8Rng, current: usize, lo: usize, hi: usize) -> Option<usize> {
    match rng.gen_range(0..3) {
        0 if current > lo => Some(current - 1),
        1 if current < hi => Some(current + 1),
        _ => None,
    }
}

/// Terrain whose height drifts by at most one row per column.
pub fn random_walk_top(mut grid: MapGrid, seed: u64) -> MapGrid {
    if grid.height == 0 {
        return grid;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (lo, hi) = surface_bounds(grid.height);
    let mut surface = rng.gen_range(lo..=hi);

    for x in 0..grid.width {
        if let Some(next) = step_height(&mut rng, surface, lo, hi) {
            surface = next;
        }
        grid.fill_column(x, surface);
    }

    grid
}

/// Like [`random_walk_top`], but every flat section is at least
/// `min_section_width` columns wide.
pub fn random_walk_top_smoothed(mut grid: MapGrid, seed: u64, min_section_width: usize) -> MapGrid {
    if grid.height == 0 {
        return grid;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (lo, hi) = surface_bounds(grid.height);
    let mut surface = rng.gen_range(lo..=hi);
    let mut section_width = 0;

    for x in 0..grid.width {
        if section_width >= min_section_width {
            if let Some(next) = step_height(&mut rng, surface, lo, hi) {
                surface = next;
                section_width = 0;
            }
        }
        section_width += 1;
        grid.fill_column(x, surface);
    }

    grid
}

/// Carve a cave out of solid rock with a walker that moves in the four
/// cardinal directions.
pub fn random_walk_cave(width: usize, height: usize, seed: u64, clear_ratio: f64) -> MapGrid {
    carve_cave(width, height, seed, clear_ratio, &CARDINAL)
}

/// Cave walker that may also step diagonally, giving rounder caverns.
pub fn random_walk_cave_custom(width: usize, height: usize, seed: u64, clear_ratio: f64) -> MapGrid {
    carve_cave(width, height, seed, clear_ratio, &ALL_DIRECTIONS)
}

fn carve_cave(
    width: usize,
    height: usize,
    seed: u64,
    clear_ratio: f64,
    directions: &[(i64, i64)],
) -> MapGrid {
    let mut grid = MapGrid::solid(width, height);
    if width < 3 || height < 3 {
        return grid;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    // The border is never carved, so the target can't exceed the interior
    let interior = (width - 2) * (height - 2);
    let target = clear_target(width, height, clear_ratio).min(interior);

    let (max_x, max_y) = ((width - 2) as i64, (height - 2) as i64);
    let mut x = rng.gen_range(1..=max_x);
    let mut y = rng.gen_range(1..=max_y);
    let mut cleared = 0;

    while cleared < target {
        if grid.at(x as usize, y as usize).is_wall() {
            grid.put(x as usize, y as usize, Tile::Empty);
            cleared += 1;
            continue;
        }

        // Re-roll moves that would leave the interior
        let (dx, dy) = directions[rng.gen_range(0..directions.len())];
        let (nx, ny) = (x + dx, y + dy);
        if (1..=max_x).contains(&nx) && (1..=max_y).contains(&ny) {
            x = nx;
            y = ny;
        }
    }

    grid
}
