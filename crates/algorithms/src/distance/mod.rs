//! Distance transforms
//!
//! Squared-Euclidean distance/allocation by two-pass sweep, and raster
//! buffering built on top of it.

mod buffer;
mod euclidean_allocation;

pub use buffer::{buffer, buffer_with, Buffer, BufferParams, BufferUnits};
pub use euclidean_allocation::{
    euclidean_allocation, euclidean_allocation_with, EuclideanAllocation,
    EuclideanAllocationResult,
};
