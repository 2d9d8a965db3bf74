//! Hydrological conditioning
//!
//! Depression filling for surfaces that must drain to their boundary.

mod priority_flood;

pub use priority_flood::{
    priority_flood, priority_flood_with, PriorityFlood, PriorityFloodParams,
};
