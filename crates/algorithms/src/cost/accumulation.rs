//! Cost-distance accumulation over a friction surface
//!
//! Computes the least accumulated cost from every cell to the nearest source
//! cell, together with a backlink grid that records the D8 step back along
//! each least-cost path. Instead of a priority queue, the engine relaxes the
//! grid with five complementary directional scans repeated to a fixed point:
//! each scan covers four of the eight directions in a traversal order that
//! lets cost flow with the scan, and together the scans cover every
//! direction. The scan patterns are load-bearing: they determine which fixed
//! point is reached on asymmetric cost surfaces and must not be reordered.
//!
//! Travel may optionally be made direction-dependent (anisotropic): a force
//! direction and strength scale each step by how closely it aligns with the
//! force, e.g. to model prevailing wind.

use ndarray::Array2;
use tracing::debug;

use gridsweep_core::raster::d8;
use gridsweep_core::raster::Raster;
use gridsweep_core::{Algorithm, Error, ExecutionContext, Result};

/// Direction subsets for the five scans, as indices into [`d8::DIRECTIONS`].
const SWEEP_DIRS: [[usize; 4]; 5] = [
    [1, 2, 3, 4], // E, SE, S, SW   — rows top-down, cols left-right
    [5, 6, 7, 0], // W, NW, N, NE   — rows bottom-up, cols right-left
    [4, 5, 6, 7], // SW, W, NW, N   — cols right-left, rows bottom-up
    [2, 3, 4, 5], // SE, S, SW, W   — rows top-down (short), cols right-left
    [3, 4, 5, 6], // S, SW, W, NW   — cols right-left, rows top-down (short)
];

/// Direction-dependent travel scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anisotropy {
    /// Azimuth the force pushes toward, in degrees (0 = north, clockwise).
    pub direction: f64,
    /// Force strength in [-100, 100]. 0 and 1 leave travel isotropic.
    pub strength: f64,
}

impl Anisotropy {
    /// Per-direction cost divisors: travel aligned with the force direction
    /// is scaled by `strength`, travel against it is left unscaled, with a
    /// linear ramp over the angular difference in between.
    fn multipliers(&self) -> Result<[f64; 8]> {
        if !self.strength.is_finite() || self.strength.abs() > 100.0 {
            return Err(Error::invalid_parameter(
                "anisotropy.strength",
                self.strength,
                "force strength must lie in [-100, 100]",
            ));
        }
        if !self.direction.is_finite() {
            return Err(Error::invalid_parameter(
                "anisotropy.direction",
                self.direction,
                "force direction must be finite",
            ));
        }
        if self.strength == 0.0 || self.strength == 1.0 {
            return Ok([1.0; 8]);
        }

        let force = self.direction.rem_euclid(360.0);
        let mut multipliers = [1.0; 8];
        for (i, dir) in d8::DIRECTIONS.iter().enumerate() {
            let mut delta = (dir.azimuth - force).abs();
            if delta > 180.0 {
                delta = 360.0 - delta;
            }
            multipliers[i] = 1.0 + (180.0 - delta) / 180.0 * (self.strength - 1.0);
        }
        Ok(multipliers)
    }
}

/// Parameters for cost accumulation
#[derive(Debug, Clone)]
pub struct CostAccumulationParams {
    /// Optional direction-dependent travel scaling.
    pub anisotropy: Option<Anisotropy>,
    /// Upper bound on relaxation cycles before giving up.
    pub max_cycles: usize,
}

impl CostAccumulationParams {
    /// Default bound on relaxation cycles.
    pub const DEFAULT_MAX_CYCLES: usize = 1024;
}

impl Default for CostAccumulationParams {
    fn default() -> Self {
        Self {
            anisotropy: None,
            max_cycles: Self::DEFAULT_MAX_CYCLES,
        }
    }
}

/// Whether the fixed-point iteration actually settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// A full cycle made no update.
    Converged { cycles: usize },
    /// The cycle bound was hit while updates were still occurring; the
    /// accumulated surface may not be final.
    IterationLimit { cycles: usize },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    pub fn cycles(&self) -> usize {
        match self {
            Convergence::Converged { cycles } | Convergence::IterationLimit { cycles } => *cycles,
        }
    }
}

/// Output of cost accumulation.
#[derive(Debug, Clone)]
pub struct CostAccumulationResult {
    /// Least accumulated cost to the nearest source; 0 at sources, no-data
    /// where the cost surface is no-data or no source is reachable.
    pub accumulated: Raster<f64>,
    /// D8 bit code of the step back toward the source; 0 at sources, -1
    /// (no-data) where never reached.
    pub backlink: Raster<i32>,
    pub convergence: Convergence,
}

/// Cost accumulation algorithm
#[derive(Debug, Clone, Default)]
pub struct CostAccumulation;

impl Algorithm for CostAccumulation {
    /// (cost surface, source grid)
    type Input = (Raster<f64>, Raster<f64>);
    type Output = CostAccumulationResult;
    type Params = CostAccumulationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Cost Accumulation"
    }

    fn description(&self) -> &'static str {
        "Least accumulated cost from every cell to the nearest source over a friction surface"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        cost_accumulation(&input.0, &input.1, params)
    }
}

/// Compute the accumulated-cost surface and backlink grid.
///
/// Cells with value > 0 in `sources` start at accumulated cost 0. The cost
/// of stepping between two cells is the mean of their friction values times
/// the step length (1 orthogonal, sqrt(2) diagonal), optionally divided by
/// the anisotropic multiplier for the travel direction.
pub fn cost_accumulation(
    cost: &Raster<f64>,
    sources: &Raster<f64>,
    params: CostAccumulationParams,
) -> Result<CostAccumulationResult> {
    cost_accumulation_with(cost, sources, params, &ExecutionContext::default())
}

/// [`cost_accumulation`] with progress reporting and cancellation.
pub fn cost_accumulation_with(
    cost: &Raster<f64>,
    sources: &Raster<f64>,
    params: CostAccumulationParams,
    ctx: &ExecutionContext,
) -> Result<CostAccumulationResult> {
    cost.expect_same_shape(sources)?;

    let multipliers = match &params.anisotropy {
        Some(anisotropy) => anisotropy.multipliers()?,
        None => [1.0; 8],
    };
    // The anisotropic iteration checks each scan for quiescence on its own;
    // the isotropic iteration checks the cycle as a whole.
    let anisotropic = multipliers.iter().any(|&m| m != 1.0);
    let max_cycles = params.max_cycles;

    let (rows, cols) = cost.shape();
    let mut accum = vec![f64::INFINITY; rows * cols];
    let mut backlink = vec![-1i32; rows * cols];

    let mut source_count = 0usize;
    for row in 0..rows {
        for col in 0..cols {
            let idx = row * cols + col;
            let friction = unsafe { cost.get_unchecked(row, col) };
            if cost.is_nodata(friction) {
                accum[idx] = f64::NAN;
                continue;
            }
            let source = unsafe { sources.get_unchecked(row, col) };
            if !sources.is_nodata(source) && source > 0.0 {
                accum[idx] = 0.0;
                backlink[idx] = 0;
                source_count += 1;
            }
        }
    }

    if source_count == 0 {
        return Err(Error::Algorithm(
            "no source cells found for cost accumulation".into(),
        ));
    }

    let mut cycles = 0usize;
    let mut sweep_count = 0usize;
    let short_rows = rows.saturating_sub(1);

    let convergence = loop {
        if cycles >= max_cycles {
            break Convergence::IterationLimit { cycles };
        }
        cycles += 1;
        let mut did = false;

        sweep_count += 1;
        let label = format!("Cost accumulation: sweep {}", sweep_count);
        did |= sweep(
            (0..rows).flat_map(|r| (0..cols).map(move |c| (r, c))),
            &SWEEP_DIRS[0],
            cols.max(1),
            rows * cols,
            cost,
            &mut accum,
            &mut backlink,
            &multipliers,
            ctx,
            &label,
        )?;
        if !did {
            break Convergence::Converged { cycles };
        }
        if anisotropic {
            did = false;
        }

        sweep_count += 1;
        let label = format!("Cost accumulation: sweep {}", sweep_count);
        did |= sweep(
            (0..rows).rev().flat_map(|r| (0..cols).rev().map(move |c| (r, c))),
            &SWEEP_DIRS[1],
            cols.max(1),
            rows * cols,
            cost,
            &mut accum,
            &mut backlink,
            &multipliers,
            ctx,
            &label,
        )?;
        if !did {
            break Convergence::Converged { cycles };
        }
        if anisotropic {
            did = false;
        }

        sweep_count += 1;
        let label = format!("Cost accumulation: sweep {}", sweep_count);
        did |= sweep(
            (0..cols).rev().flat_map(|c| (0..rows).rev().map(move |r| (r, c))),
            &SWEEP_DIRS[2],
            rows.max(1),
            rows * cols,
            cost,
            &mut accum,
            &mut backlink,
            &multipliers,
            ctx,
            &label,
        )?;
        if !did {
            break Convergence::Converged { cycles };
        }
        if anisotropic {
            did = false;
        }

        sweep_count += 1;
        let label = format!("Cost accumulation: sweep {}", sweep_count);
        did |= sweep(
            (0..short_rows).flat_map(|r| (0..cols).rev().map(move |c| (r, c))),
            &SWEEP_DIRS[3],
            cols.max(1),
            short_rows * cols,
            cost,
            &mut accum,
            &mut backlink,
            &multipliers,
            ctx,
            &label,
        )?;
        if !did {
            break Convergence::Converged { cycles };
        }
        if anisotropic {
            did = false;
        }

        sweep_count += 1;
        let label = format!("Cost accumulation: sweep {}", sweep_count);
        did |= sweep(
            (0..cols).rev().flat_map(|c| (0..short_rows).map(move |r| (r, c))),
            &SWEEP_DIRS[4],
            short_rows.max(1),
            short_rows * cols,
            cost,
            &mut accum,
            &mut backlink,
            &multipliers,
            ctx,
            &label,
        )?;
        if !did {
            break Convergence::Converged { cycles };
        }

        debug!(cycle = cycles, "cost accumulation cycle made updates");
    };

    if let Convergence::IterationLimit { cycles } = convergence {
        debug!(cycles, "cost accumulation stopped at the cycle bound");
    }

    // Cells no source can reach resolve to no-data.
    for value in &mut accum {
        if value.is_infinite() {
            *value = f64::NAN;
        }
    }

    let mut accumulated = cost.with_same_meta::<f64>(rows, cols);
    accumulated.set_nodata(Some(f64::NAN));
    *accumulated.data_mut() =
        Array2::from_shape_vec((rows, cols), accum).map_err(|e| Error::Other(e.to_string()))?;

    let mut backlink_raster = cost.with_same_meta::<i32>(rows, cols);
    backlink_raster.set_nodata(Some(-1));
    *backlink_raster.data_mut() =
        Array2::from_shape_vec((rows, cols), backlink).map_err(|e| Error::Other(e.to_string()))?;

    Ok(CostAccumulationResult {
        accumulated,
        backlink: backlink_raster,
        convergence,
    })
}

/// Run one directional scan, relaxing each visited cell's neighbors in the
/// scan's direction subset. Returns whether any cell improved.
#[allow(clippy::too_many_arguments)]
fn sweep<I>(
    order: I,
    dirs: &[usize; 4],
    line_len: usize,
    total: usize,
    cost: &Raster<f64>,
    accum: &mut [f64],
    backlink: &mut [i32],
    multipliers: &[f64; 8],
    ctx: &ExecutionContext,
    label: &str,
) -> Result<bool>
where
    I: Iterator<Item = (usize, usize)>,
{
    let (rows, cols) = cost.shape();
    let mut updated = false;

    for (visited, (row, col)) in order.enumerate() {
        if visited % line_len == 0 {
            ctx.checkpoint()?;
            ctx.report(label, (visited * 100 / total) as u8);
        }

        let idx = row * cols + col;
        let base = accum[idx];
        // Infinite cells have no cost to propagate yet; NaN cells are no-data.
        if !base.is_finite() {
            continue;
        }
        let cost_here = unsafe { cost.get_unchecked(row, col) };

        for &di in dirs {
            let dir = &d8::DIRECTIONS[di];
            let nr = row as isize + dir.d_row;
            let nc = col as isize + dir.d_col;
            if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                continue;
            }
            let (nr, nc) = (nr as usize, nc as usize);
            let cost_there = unsafe { cost.get_unchecked(nr, nc) };
            if cost.is_nodata(cost_there) {
                continue;
            }

            let nidx = nr * cols + nc;
            let candidate = base + (cost_here + cost_there) / 2.0 * dir.step / multipliers[di];
            if candidate < accum[nidx] {
                accum[nidx] = candidate;
                backlink[nidx] = d8::DIRECTIONS[d8::opposite(di)].code;
                updated = true;
            }
        }
    }

    Ok(updated)
}
