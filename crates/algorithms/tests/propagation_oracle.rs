//! Cross-checks of the propagation engines against brute-force oracles and
//! their structural invariants on grids large enough to exercise every sweep.

use approx::assert_relative_eq;
use std::collections::VecDeque;
use std::f64::consts::SQRT_2;

use gridsweep_algorithms::cost::{cost_accumulation, cost_allocation, CostAccumulationParams};
use gridsweep_algorithms::distance::euclidean_allocation;
use gridsweep_algorithms::hydrology::{priority_flood, PriorityFloodParams};
use gridsweep_core::raster::d8;
use gridsweep_core::Raster;

// ─── Euclidean allocation vs. brute force ───────────────────────────────

fn seed_raster(rows: usize, cols: usize, seeds: &[(usize, usize, f64)]) -> Raster<f64> {
    let mut raster = Raster::new(rows, cols);
    for &(row, col, label) in seeds {
        raster.set(row, col, label).unwrap();
    }
    raster
}

fn oracle_min_sq_dist(seeds: &[(usize, usize, f64)], row: usize, col: usize) -> f64 {
    seeds
        .iter()
        .map(|&(sr, sc, _)| {
            let dr = sr as f64 - row as f64;
            let dc = sc as f64 - col as f64;
            dr * dr + dc * dc
        })
        .fold(f64::INFINITY, f64::min)
}

fn check_against_oracle(rows: usize, cols: usize, seeds: &[(usize, usize, f64)]) {
    let raster = seed_raster(rows, cols, seeds);
    let result = euclidean_allocation(&raster).unwrap();

    for row in 0..rows {
        for col in 0..cols {
            let expected = oracle_min_sq_dist(seeds, row, col);
            let got = result.distance.get(row, col).unwrap();
            assert_eq!(
                got, expected,
                "squared distance at ({}, {}): got {}, oracle {}",
                row, col, got, expected
            );

            // The allocated seed must itself sit at the oracle distance.
            let label = result.allocation.get(row, col).unwrap();
            let (sr, sc, _) = seeds
                .iter()
                .find(|&&(_, _, l)| l == label)
                .unwrap_or_else(|| panic!("unknown label {} at ({}, {})", label, row, col));
            let dr = *sr as f64 - row as f64;
            let dc = *sc as f64 - col as f64;
            assert_eq!(
                dr * dr + dc * dc,
                expected,
                "allocation at ({}, {}) points to a non-nearest seed",
                row,
                col
            );
        }
    }
}

#[test]
fn euclidean_matches_oracle_single_seed() {
    check_against_oracle(50, 50, &[(25, 24, 1.0)]);
}

#[test]
fn euclidean_matches_oracle_two_seeds() {
    check_against_oracle(31, 23, &[(4, 3, 1.0), (26, 19, 2.0)]);
}

#[test]
fn euclidean_matches_oracle_seed_lattice() {
    // A seed every eight cells in each axis keeps distances short while the
    // Voronoi regions still tile the whole grid.
    let mut seeds = Vec::new();
    let mut label = 0.0;
    for row in (3..50).step_by(8) {
        for col in (5..50).step_by(8) {
            label += 1.0;
            seeds.push((row, col, label));
        }
    }
    check_against_oracle(50, 50, &seeds);
}

#[test]
fn euclidean_distance_is_rotation_invariant() {
    // A point-symmetric seed pattern: the distance field must equal its own
    // 180-degree rotation.
    let (rows, cols) = (21, 21);
    let seeds = [(3, 4, 1.0), (17, 16, 2.0), (10, 10, 3.0)];
    let raster = seed_raster(rows, cols, &seeds);
    let result = euclidean_allocation(&raster).unwrap();

    for row in 0..rows {
        for col in 0..cols {
            let here = result.distance.get(row, col).unwrap();
            let mirrored = result
                .distance
                .get(rows - 1 - row, cols - 1 - col)
                .unwrap();
            assert_eq!(
                here, mirrored,
                "distance not symmetric at ({}, {})",
                row, col
            );
        }
    }
}

// ─── Cost accumulation invariants ───────────────────────────────────────

#[test]
fn uniform_cost_converges_to_octile_distance() {
    let (rows, cols) = (21, 21);
    let (sr, sc) = (10, 10);
    let cost = Raster::filled(rows, cols, 1.0);
    let mut sources = Raster::new(rows, cols);
    sources.set(sr, sc, 1.0).unwrap();

    let result = cost_accumulation(&cost, &sources, CostAccumulationParams::default()).unwrap();
    assert!(result.convergence.is_converged());

    for row in 0..rows {
        for col in 0..cols {
            let dr = (row as isize - sr as isize).unsigned_abs() as f64;
            let dc = (col as isize - sc as isize).unsigned_abs() as f64;
            let octile = dr.max(dc) - dr.min(dc) + dr.min(dc) * SQRT_2;
            assert_relative_eq!(
                result.accumulated.get(row, col).unwrap(),
                octile,
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn backlink_chains_descend_to_a_source() {
    let (rows, cols) = (20, 20);
    let mut cost = Raster::new(rows, cols);
    for row in 0..rows {
        for col in 0..cols {
            let friction = 0.5 + ((row * 13 + col * 7) % 11) as f64 * 0.3;
            cost.set(row, col, friction).unwrap();
        }
    }
    let mut sources = Raster::new(rows, cols);
    sources.set(2, 3, 1.0).unwrap();

    let result = cost_accumulation(&cost, &sources, CostAccumulationParams::default()).unwrap();
    assert!(result.convergence.is_converged());

    for row in 0..rows {
        for col in 0..cols {
            let mut r = row;
            let mut c = col;
            let mut accum = result.accumulated.get(r, c).unwrap();
            let mut steps = 0;

            loop {
                let code = result.backlink.get(r, c).unwrap();
                if code == 0 {
                    assert_eq!((r, c), (2, 3), "chain ended away from the source");
                    assert_eq!(accum, 0.0);
                    break;
                }
                let di = d8::from_code(code)
                    .unwrap_or_else(|| panic!("bad backlink code {} at ({}, {})", code, r, c));
                r = (r as isize + d8::DIRECTIONS[di].d_row) as usize;
                c = (c as isize + d8::DIRECTIONS[di].d_col) as usize;

                let next = result.accumulated.get(r, c).unwrap();
                assert!(
                    next < accum,
                    "accumulated cost rose from {} to {} along the chain from ({}, {})",
                    accum,
                    next,
                    row,
                    col
                );
                accum = next;

                steps += 1;
                assert!(steps <= rows * cols, "chain from ({}, {}) did not terminate", row, col);
            }
        }
    }
}

#[test]
fn allocation_splits_the_grid_between_sources() {
    let (rows, cols) = (9, 17);
    let cost = Raster::filled(rows, cols, 2.0);
    let mut sources = Raster::new(rows, cols);
    sources.set(4, 0, 10.0).unwrap();
    sources.set(4, 16, 20.0).unwrap();

    let acc = cost_accumulation(&cost, &sources, CostAccumulationParams::default()).unwrap();
    let allocation = cost_allocation(&sources, &acc.backlink).unwrap();

    for row in 0..rows {
        for col in 0..4 {
            assert_eq!(allocation.get(row, col).unwrap(), 10.0, "({}, {})", row, col);
        }
        for col in 13..cols {
            assert_eq!(allocation.get(row, col).unwrap(), 20.0, "({}, {})", row, col);
        }
    }
}

// ─── Priority flood invariants ──────────────────────────────────────────

fn bumpy_dem(rows: usize, cols: usize) -> Raster<f64> {
    let mut dem = Raster::new(rows, cols);
    for row in 0..rows {
        for col in 0..cols {
            dem.set(row, col, ((row * 31 + col * 17) % 13) as f64).unwrap();
        }
    }
    // Carve a few deep pits.
    dem.set(7, 9, -5.0).unwrap();
    dem.set(15, 4, -2.0).unwrap();
    dem.set(3, 20, -9.0).unwrap();
    dem
}

/// Every valid cell must be reachable from the boundary by a path along
/// which the filled surface never decreases; reversed, that is exactly a
/// non-increasing drainage path from the cell out of the grid.
fn assert_everything_drains(filled: &Raster<f64>) {
    let (rows, cols) = filled.shape();
    let mut reachable = vec![false; rows * cols];
    let mut queue = VecDeque::new();

    for row in 0..rows {
        for col in 0..cols {
            if row == 0 || row == rows - 1 || col == 0 || col == cols - 1 {
                reachable[row * cols + col] = true;
                queue.push_back((row, col));
            }
        }
    }

    while let Some((row, col)) = queue.pop_front() {
        let here = filled.get(row, col).unwrap();
        for dir in &d8::DIRECTIONS {
            let nr = row as isize + dir.d_row;
            let nc = col as isize + dir.d_col;
            if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                continue;
            }
            let (nr, nc) = (nr as usize, nc as usize);
            if reachable[nr * cols + nc] {
                continue;
            }
            if filled.get(nr, nc).unwrap() >= here {
                reachable[nr * cols + nc] = true;
                queue.push_back((nr, nc));
            }
        }
    }

    for row in 0..rows {
        for col in 0..cols {
            assert!(
                reachable[row * cols + col],
                "cell ({}, {}) has no non-increasing path to the boundary",
                row,
                col
            );
        }
    }
}

#[test]
fn filled_surface_drains_everywhere() {
    let dem = bumpy_dem(24, 30);
    let filled = priority_flood(&dem, PriorityFloodParams::default()).unwrap();

    for row in 0..24 {
        for col in 0..30 {
            assert!(
                filled.get(row, col).unwrap() >= dem.get(row, col).unwrap(),
                "cell ({}, {}) was lowered",
                row,
                col
            );
        }
    }
    assert_everything_drains(&filled);
}

#[test]
fn filling_is_idempotent_on_rough_terrain() {
    let dem = bumpy_dem(24, 30);
    let once = priority_flood(&dem, PriorityFloodParams::default()).unwrap();
    let twice = priority_flood(&once, PriorityFloodParams::default()).unwrap();

    for row in 0..24 {
        for col in 0..30 {
            assert_eq!(
                once.get(row, col).unwrap(),
                twice.get(row, col).unwrap(),
                "refill changed cell ({}, {})",
                row,
                col
            );
        }
    }
}

// ─── Composition across engines ─────────────────────────────────────────

#[test]
fn cost_paths_respect_a_nodata_wall() {
    let (rows, cols) = (7, 11);
    let mut cost = Raster::filled(rows, cols, 1.0);
    // Wall with a single gap at row 5.
    for row in 0..rows {
        if row != 5 {
            cost.set(row, 5, f64::NAN).unwrap();
        }
    }
    let mut sources = Raster::new(rows, cols);
    sources.set(3, 1, 4.0).unwrap();

    let acc = cost_accumulation(&cost, &sources, CostAccumulationParams::default()).unwrap();
    assert!(acc.convergence.is_converged());

    // Everything right of the wall must route through the gap, so its
    // accumulated cost exceeds the straight-line octile distance.
    let through_gap = acc.accumulated.get(3, 8).unwrap();
    let unobstructed = 7.0; // straight east along row 3 if the wall were open
    assert!(
        through_gap > unobstructed,
        "path through the gap ({}) cannot beat the straight line ({})",
        through_gap,
        unobstructed
    );

    let allocation = cost_allocation(&sources, &acc.backlink).unwrap();
    assert_eq!(allocation.get(3, 8).unwrap(), 4.0);
    assert!(allocation.get(0, 5).unwrap().is_nan(), "wall cells stay unresolved");
}
