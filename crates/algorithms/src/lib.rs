//! # GridSweep Algorithms
//!
//! Grid-sweep propagation engines over in-memory rasters.
//!
//! ## Available Engine Categories
//!
//! - **distance**: squared-Euclidean distance/allocation transform, buffering
//! - **cost**: accumulated-cost surfaces over friction grids, source allocation
//! - **hydrology**: priority-flood depression filling
//!
//! Every engine is a pure function over its input grids: it validates shapes
//! and parameters up front, owns its scratch buffers for the duration of the
//! call, and returns fresh output rasters. The `*_with` variants accept an
//! [`ExecutionContext`](gridsweep_core::ExecutionContext) for progress
//! reporting and cooperative cancellation.

pub mod cost;
pub mod distance;
pub mod hydrology;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cost::{
        cost_accumulation, cost_allocation, Anisotropy, Convergence, CostAccumulation,
        CostAccumulationParams, CostAccumulationResult, CostAllocation,
    };
    pub use crate::distance::{
        buffer, euclidean_allocation, Buffer, BufferParams, BufferUnits, EuclideanAllocation,
        EuclideanAllocationResult,
    };
    pub use crate::hydrology::{priority_flood, PriorityFlood, PriorityFloodParams};
    pub use gridsweep_core::prelude::*;
}
