//! Squared-Euclidean distance and allocation transform
//!
//! Two-pass raster sweep that propagates, for every cell, the squared
//! Euclidean distance to the nearest seed cell together with that seed's
//! label. Each cell carries a rectilinear offset pair (Rx, Ry) recording the
//! displacement to its currently assigned seed, so a neighbor's squared
//! distance can be extended by one step with the expansion
//! `(d + 1)^2 = d^2 + 2d + 1` instead of being recomputed. With the forward
//! and backward passes covering all eight directions the result is the exact
//! squared Euclidean distance, not a chamfer approximation.
//!
//! Reference:
//! Danielsson, P.-E. (1980). Euclidean distance mapping.
//! Computer Graphics and Image Processing, 14(3), 227-248.

use ndarray::Array2;

use gridsweep_core::raster::d8;
use gridsweep_core::raster::Raster;
use gridsweep_core::{Algorithm, Error, ExecutionContext, Result};

/// Neighbors visited in the forward (top-down, left-right) pass: W, NW, N, NE.
const FORWARD: [usize; 4] = [5, 6, 7, 0];
/// Neighbors visited in the backward (bottom-up, right-left) pass: E, SE, S, SW.
const BACKWARD: [usize; 4] = [1, 2, 3, 4];

/// Output of the distance/allocation transform.
#[derive(Debug, Clone)]
pub struct EuclideanAllocationResult {
    /// Squared Euclidean distance, in cell units, to the nearest seed.
    /// No-data where the input is no-data or no seed is reachable.
    pub distance: Raster<f64>,
    /// Label of the nearest seed (the seed cell's own input value).
    pub allocation: Raster<f64>,
}

/// Euclidean allocation algorithm
#[derive(Debug, Clone, Default)]
pub struct EuclideanAllocation;

impl Algorithm for EuclideanAllocation {
    type Input = Raster<f64>;
    type Output = EuclideanAllocationResult;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Euclidean Allocation"
    }

    fn description(&self) -> &'static str {
        "Squared distance and nearest-seed label for every cell, by two-pass sweep"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        euclidean_allocation(&input)
    }
}

/// Compute the squared-Euclidean distance transform and seed allocation.
///
/// Cells with a nonzero, non-no-data value in `seed` are seeds; the value is
/// the label propagated through the allocation grid. No-data cells are
/// excluded from propagation entirely and stay no-data in both outputs.
pub fn euclidean_allocation(seed: &Raster<f64>) -> Result<EuclideanAllocationResult> {
    euclidean_allocation_with(seed, &ExecutionContext::default())
}

/// [`euclidean_allocation`] with progress reporting and cancellation.
pub fn euclidean_allocation_with(
    seed: &Raster<f64>,
    ctx: &ExecutionContext,
) -> Result<EuclideanAllocationResult> {
    let (rows, cols) = seed.shape();

    let mut dist = vec![f64::INFINITY; rows * cols];
    let mut alloc = vec![f64::NAN; rows * cols];
    let mut rx = vec![0i64; rows * cols];
    let mut ry = vec![0i64; rows * cols];

    for row in 0..rows {
        for col in 0..cols {
            let value = unsafe { seed.get_unchecked(row, col) };
            let idx = row * cols + col;
            if seed.is_nodata(value) {
                dist[idx] = f64::NAN;
            } else if value != 0.0 {
                dist[idx] = 0.0;
                alloc[idx] = value;
            }
        }
    }

    // Forward pass: top-down, left-right, relaxing from the already-visited
    // half of the neighborhood.
    for row in 0..rows {
        ctx.checkpoint()?;
        for col in 0..cols {
            relax_cell(
                row, col, &FORWARD, rows, cols, &mut dist, &mut alloc, &mut rx, &mut ry,
            );
        }
        ctx.report(
            "Euclidean allocation: forward pass",
            ((row + 1) * 100 / rows) as u8,
        );
    }

    // Backward pass: bottom-up, right-left, remaining four directions.
    for row in (0..rows).rev() {
        ctx.checkpoint()?;
        for col in (0..cols).rev() {
            relax_cell(
                row, col, &BACKWARD, rows, cols, &mut dist, &mut alloc, &mut rx, &mut ry,
            );
        }
        ctx.report(
            "Euclidean allocation: backward pass",
            ((rows - row) * 100 / rows) as u8,
        );
    }

    // Cells no seed can reach resolve to no-data.
    for d in &mut dist {
        if d.is_infinite() {
            *d = f64::NAN;
        }
    }

    let mut distance = seed.with_same_meta::<f64>(rows, cols);
    distance.set_nodata(Some(f64::NAN));
    *distance.data_mut() =
        Array2::from_shape_vec((rows, cols), dist).map_err(|e| Error::Other(e.to_string()))?;

    let mut allocation = seed.with_same_meta::<f64>(rows, cols);
    allocation.set_nodata(Some(f64::NAN));
    *allocation.data_mut() =
        Array2::from_shape_vec((rows, cols), alloc).map_err(|e| Error::Other(e.to_string()))?;

    Ok(EuclideanAllocationResult {
        distance,
        allocation,
    })
}

/// Relax one cell against the given half-neighborhood.
///
/// Adopts the best strict improvement: the neighbor's squared distance plus
/// the correction term derived from its (Rx, Ry) offsets. Equal candidates
/// never overwrite, so ties resolve to the first direction in `dirs`.
#[allow(clippy::too_many_arguments)]
fn relax_cell(
    row: usize,
    col: usize,
    dirs: &[usize; 4],
    rows: usize,
    cols: usize,
    dist: &mut [f64],
    alloc: &mut [f64],
    rx: &mut [i64],
    ry: &mut [i64],
) {
    let idx = row * cols + col;
    let z = dist[idx];
    // Seeds stay at zero; no-data cells never participate.
    if z == 0.0 || z.is_nan() {
        return;
    }

    let mut z_min = f64::INFINITY;
    let mut best: Option<(usize, usize)> = None;

    for &di in dirs {
        let d = &d8::DIRECTIONS[di];
        let nr = row as isize + d.d_row;
        let nc = col as isize + d.d_col;
        if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
            continue;
        }
        let nidx = nr as usize * cols + nc as usize;
        let zn = dist[nidx];
        if zn.is_nan() {
            continue;
        }

        let h = if d.d_row == 0 {
            2.0 * rx[nidx] as f64 + 1.0
        } else if d.d_col == 0 {
            2.0 * ry[nidx] as f64 + 1.0
        } else {
            2.0 * (rx[nidx] + ry[nidx] + 1) as f64
        };

        let candidate = zn + h;
        if candidate < z_min {
            z_min = candidate;
            best = Some((di, nidx));
        }
    }

    if let Some((di, nidx)) = best {
        if z_min < z {
            let d = &d8::DIRECTIONS[di];
            dist[idx] = z_min;
            rx[idx] = rx[nidx] + d.d_col.abs() as i64;
            ry[idx] = ry[nidx] + d.d_row.abs() as i64;
            alloc[idx] = alloc[nidx];
        }
    }
}
