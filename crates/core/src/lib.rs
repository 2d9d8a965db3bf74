//! # GridSweep Core
//!
//! Core types and plumbing for the GridSweep propagation engines.
//!
//! This crate provides:
//! - `Raster<T>`: generic raster grid with a no-data sentinel and edge policy
//! - `GeoTransform`: cell-to-world mapping (grid resolution)
//! - `d8`: the shared D8 direction/bit-code table
//! - `Algorithm` trait for a consistent engine API
//! - `ExecutionContext`: progress reporting and cooperative cancellation

pub mod error;
pub mod execution;
pub mod raster;

pub use error::{Error, Result};
pub use execution::{CancellationToken, ExecutionContext, ProgressReporter};
pub use raster::{EdgePolicy, GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::execution::{CancellationToken, ExecutionContext, ProgressReporter};
    pub use crate::raster::{EdgePolicy, GeoTransform, Raster, RasterElement};
    pub use crate::Algorithm;
}

/// Core trait for all engines in GridSweep.
///
/// Engines are pure functions that transform input grids according to
/// parameters; nothing persists between calls.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(
        &self,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
