//! Cellular automata caves
//!
//! A seeded random fill is smoothed by majority rule over either the
//! 4-cell (von Neumann) or 8-cell (Moore) neighborhood:
//! 1. More wall neighbors than the threshold makes a wall
//! 2. Fewer makes open space
//! 3. Exactly the threshold leaves the cell as it was
//!
//! Every pass reads the previous generation and writes a new one, so the
//! result doesn't depend on scan order.
//!
//! The number of cells a pass would flip ([`unstable_cells`]) can go up from
//! one pass to the next. What never goes up is [`smoothing_energy`] measured
//! over consecutive generations: the tie rule acts as a self weight, which
//! makes the update a symmetric threshold network. Smoothing therefore ends in
//! a fixed point or in a two-generation cycle.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::tilemap::{MapGrid, Tile};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighborhood {
    VonNeumann,
    Moore,
}

impl Neighborhood {
    /// Half the neighborhood size; ties keep the current tile.
    fn threshold(self) -> usize {
        match self {
            Neighborhood::VonNeumann => 2,
            Neighborhood::Moore => 4,
        }
    }

    fn wall_count(self, grid: &MapGrid, x: usize, y: usize) -> usize {
        match self {
            Neighborhood::VonNeumann => grid.von_neumann_count(x, y, &Tile::Wall),
            Neighborhood::Moore => grid.moore_count(x, y, &Tile::Wall),
        }
    }
}

/// Seeded random fill at `fill_ratio` wall density.
pub fn random_fill(width: usize, height: usize, seed: u64, fill_ratio: f64, edges_are_walls: bool) -> MapGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut grid = MapGrid::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let wall = (edges_are_walls && grid.is_edge(x, y)) || rng.gen::<f64>() < fill_ratio;
            if wall {
                grid.put(x, y, Tile::Wall);
            }
        }
    }

    grid
}

/// The tile the majority rule assigns to `(x, y)`.
fn next_tile(grid: &MapGrid, x: usize, y: usize, neighborhood: Neighborhood, edges_are_walls: bool) -> Tile {
    if edges_are_walls && grid.is_edge(x, y) {
        return Tile::Wall;
    }
    let walls = neighborhood.wall_count(grid, x, y);
    let threshold = neighborhood.threshold();
    if walls > threshold {
        Tile::Wall
    } else if walls < threshold {
        Tile::Empty
    } else {
        *grid.at(x, y)
    }
}

/// Run `passes` smoothing passes.
pub fn smooth(mut grid: MapGrid, neighborhood: Neighborhood, edges_are_walls: bool, passes: usize) -> MapGrid {
    for _ in 0..passes {
        let mut next = grid.clone();
        for y in 0..grid.height {
            for x in 0..grid.width {
                next.put(x, y, next_tile(&grid, x, y, neighborhood, edges_are_walls));
            }
        }
        if next == grid {
            // Stable: further passes can't change anything
            break;
        }
        grid = next;
    }
    grid
}

pub fn smooth_von_neumann(grid: MapGrid, edges_are_walls: bool, passes: usize) -> MapGrid {
    smooth(grid, Neighborhood::VonNeumann, edges_are_walls, passes)
}

pub fn smooth_moore(grid: MapGrid, edges_are_walls: bool, passes: usize) -> MapGrid {
    smooth(grid, Neighborhood::Moore, edges_are_walls, passes)
}

/// Number of cells the next pass would change. Zero means the grid is a
/// fixed point of the rule.
pub fn unstable_cells(grid: &MapGrid, neighborhood: Neighborhood, edges_are_walls: bool) -> usize {
    grid.iter()
        .filter(|&(x, y, &tile)| next_tile(grid, x, y, neighborhood, edges_are_walls) != tile)
        .count()
}

/// Energy of the step from `previous` to `current`, doubled so it stays
/// integral. For `next = smooth(current, .., 1)`,
/// `smoothing_energy(current, next) <= smoothing_energy(previous, current)`,
/// strictly lower whenever `next` differs from `previous` away from forced
/// edge walls.
pub fn smoothing_energy(previous: &MapGrid, current: &MapGrid, neighborhood: Neighborhood) -> i64 {
    let wall = |grid: &MapGrid, x, y| i64::from(grid.at(x, y).is_wall());
    let threshold = 2 * neighborhood.threshold() as i64 + 1;

    let mut energy = 0;
    for (x, y, _) in current.iter() {
        let field = wall(previous, x, y) + neighborhood.wall_count(previous, x, y) as i64;
        energy -= 2 * wall(current, x, y) * field;
        energy += threshold * (wall(current, x, y) + wall(previous, x, y));
    }
    energy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_density() {
        let grid = random_fill(100, 100, 4, 0.45, false);
        let ratio = grid.ratio(&Tile::Wall);
        assert!((ratio - 0.45).abs() < 0.03, "wall ratio {ratio}");
    }

    #[test]
    fn test_fill_edges() {
        let grid = random_fill(12, 9, 4, 0.0, true);
        assert_eq!(grid.count(&Tile::Wall), 2 * 12 + 2 * 7);
    }

    #[test]
    fn test_smoothing_converges() {
        for neighborhood in [Neighborhood::Moore, Neighborhood::VonNeumann] {
            for seed in 0..5 {
                let start = random_fill(60, 40, seed, 0.45, true);
                let before = unstable_cells(&start, neighborhood, true);
                let after = unstable_cells(&smooth(start.clone(), neighborhood, true, 5), neighborhood, true);
                assert!(
                    after < before,
                    "{:?} seed {}: {} unstable cells before, {} after",
                    neighborhood, seed, before, after
                );
            }
        }
    }

    /// Generations 0..=passes of single-pass smoothing.
    fn generations(start: MapGrid, neighborhood: Neighborhood, edges: bool, passes: usize) -> Vec<MapGrid> {
        let mut history = vec![start];
        for _ in 0..passes {
            let last = history[history.len() - 1].clone();
            history.push(smooth(last, neighborhood, edges, 1));
        }
        history
    }

    #[test]
    fn test_one_more_pass_is_never_rougher() {
        for neighborhood in [Neighborhood::Moore, Neighborhood::VonNeumann] {
            for edges in [true, false] {
                for seed in 0..30 {
                    let start = random_fill(60, 40, seed, 0.45, edges);
                    let history = generations(start.clone(), neighborhood, edges, 9);

                    for n in 1..=8 {
                        assert_eq!(smooth(start.clone(), neighborhood, edges, n), history[n]);
                        let after_n = smoothing_energy(&history[n - 1], &history[n], neighborhood);
                        let after_next = smoothing_energy(&history[n], &history[n + 1], neighborhood);
                        assert!(
                            after_next <= after_n,
                            "{:?} edges={} seed {}: energy {} after {} passes, {} after {}",
                            neighborhood, edges, seed, after_n, n, after_next, n + 1
                        );
                        if history[n + 1] != history[n - 1] {
                            assert!(after_next < after_n);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_settles_into_fixed_point_or_two_cycle() {
        for neighborhood in [Neighborhood::Moore, Neighborhood::VonNeumann] {
            for seed in 0..5 {
                let settled = smooth(random_fill(40, 40, seed, 0.5, true), neighborhood, true, 200);
                let history = generations(settled.clone(), neighborhood, true, 3);
                assert_eq!(history[2], settled);

                // Once settled the energy stops moving
                let first = smoothing_energy(&history[0], &history[1], neighborhood);
                let second = smoothing_energy(&history[1], &history[2], neighborhood);
                let third = smoothing_energy(&history[2], &history[3], neighborhood);
                assert_eq!((first, second), (second, third));
            }
        }
    }

    #[test]
    fn test_moore_majority() {
        // A lone wall in open space disappears, a lone hole in rock fills in
        let mut open = MapGrid::allocate(5, 5, false);
        open.put(2, 2, Tile::Wall);
        assert_eq!(smooth_moore(open, false, 1).count(&Tile::Wall), 0);

        let mut rock = MapGrid::solid(5, 5);
        rock.put(2, 2, Tile::Empty);
        assert_eq!(smooth_moore(rock, true, 1).count(&Tile::Empty), 0);
    }

    #[test]
    fn test_von_neumann_tie_keeps_tile() {
        // Center has exactly two wall neighbors: left and right
        let mut grid = MapGrid::allocate(3, 3, false);
        grid.put(0, 1, Tile::Wall);
        grid.put(2, 1, Tile::Wall);
        assert_eq!(next_tile(&grid, 1, 1, Neighborhood::VonNeumann, false), Tile::Empty);
        grid.put(1, 1, Tile::Wall);
        assert_eq!(next_tile(&grid, 1, 1, Neighborhood::VonNeumann, false), Tile::Wall);
    }

    #[test]
    fn test_edges_stay_walls() {
        let grid = smooth_von_neumann(random_fill(20, 20, 2, 0.1, true), true, 4);
        for (x, y, &tile) in grid.iter() {
            if grid.is_edge(x, y) {
                assert_eq!(tile, Tile::Wall);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = smooth_moore(random_fill(30, 30, 77, 0.48, true), true, 3);
        let b = smooth_moore(random_fill(30, 30, 77, 0.48, true), true, 3);
        assert_eq!(a, b);
    }
}
