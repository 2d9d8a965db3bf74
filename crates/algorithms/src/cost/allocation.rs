//! Source allocation by backlink tracing
//!
//! Resolves, for every cell, which source its least-cost path leads to by
//! retracing the backlink grid produced by cost accumulation. Each chain is
//! walked once to find its terminus, then the resolved value is written back
//! over every cell the walk visited, so cells sharing a path suffix are
//! settled together instead of being recomputed one by one.

use ndarray::Array2;

use gridsweep_core::raster::d8;
use gridsweep_core::raster::Raster;
use gridsweep_core::{Algorithm, Error, ExecutionContext, Result};

/// Cost allocation algorithm
#[derive(Debug, Clone, Default)]
pub struct CostAllocation;

impl Algorithm for CostAllocation {
    /// (source grid, backlink grid)
    type Input = (Raster<f64>, Raster<i32>);
    type Output = Raster<f64>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Cost Allocation"
    }

    fn description(&self) -> &'static str {
        "Assign every cell the source its least-cost path leads back to"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        cost_allocation(&input.0, &input.1)
    }
}

/// Resolve every cell to the source value at the end of its backlink chain.
///
/// Cells with value > 0 in `sources` resolve to themselves. A chain ending
/// anywhere other than a source (a grid edge, a pit, a cell the accumulation
/// never reached) resolves to no-data. Cells whose backlink is no-data are
/// left as no-data.
pub fn cost_allocation(sources: &Raster<f64>, backlink: &Raster<i32>) -> Result<Raster<f64>> {
    cost_allocation_with(sources, backlink, &ExecutionContext::default())
}

/// [`cost_allocation`] with progress reporting and cancellation.
pub fn cost_allocation_with(
    sources: &Raster<f64>,
    backlink: &Raster<i32>,
    ctx: &ExecutionContext,
) -> Result<Raster<f64>> {
    sources.expect_same_shape(backlink)?;
    let (rows, cols) = sources.shape();

    let mut out = vec![f64::NAN; rows * cols];
    for row in 0..rows {
        for col in 0..cols {
            let value = unsafe { sources.get_unchecked(row, col) };
            if !sources.is_nodata(value) && value > 0.0 {
                out[row * cols + col] = value;
            }
        }
    }

    // Arena of coordinates visited by the current walk; the step bound keeps
    // a malformed (cyclic) backlink grid from hanging the traverse.
    let mut chain: Vec<(usize, usize)> = Vec::new();
    let max_steps = rows * cols;

    for row in 0..rows {
        ctx.checkpoint()?;
        for col in 0..cols {
            let link = unsafe { backlink.get_unchecked(row, col) };
            if backlink.is_nodata(link) || !out[row * cols + col].is_nan() {
                continue;
            }

            chain.clear();
            let (mut r, mut c) = (row, col);
            let resolved = loop {
                chain.push((r, c));
                if chain.len() > max_steps {
                    break f64::NAN;
                }

                let code = unsafe { backlink.get_unchecked(r, c) };
                if code <= 0 {
                    // Terminus: a source's own label, or no-data at a dead end.
                    break out[r * cols + c];
                }
                let Some(di) = d8::from_code(code) else {
                    break f64::NAN;
                };

                let dir = &d8::DIRECTIONS[di];
                let nr = r as isize + dir.d_row;
                let nc = c as isize + dir.d_col;
                if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                    break f64::NAN;
                }
                r = nr as usize;
                c = nc as usize;

                let downstream = out[r * cols + c];
                if downstream > 0.0 {
                    break downstream;
                }
            };

            for &(cr, cc) in &chain {
                out[cr * cols + cc] = resolved;
            }
        }
        ctx.report("Cost allocation", ((row + 1) * 100 / rows) as u8);
    }

    let mut output = sources.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), out).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}
