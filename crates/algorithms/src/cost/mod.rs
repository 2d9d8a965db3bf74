//! Cost-surface analysis
//!
//! Least-cost travel over a friction surface:
//! - accumulation: accumulated cost and backlinks from the nearest source
//! - allocation: resolve every cell to its source by retracing backlinks

pub(crate) mod accumulation;
mod allocation;

pub use accumulation::{
    cost_accumulation, cost_accumulation_with, Anisotropy, Convergence, CostAccumulation,
    CostAccumulationParams, CostAccumulationResult,
};
pub use allocation::{cost_allocation, cost_allocation_with, CostAllocation};
