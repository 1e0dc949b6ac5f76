//! Cross-crate integration tests for the Vigil dispatch core
//!
//! This suite exercises:
//! - The full submit -> allocate -> assign -> complete dispatch flow
//! - Inventory invariants under concurrent allocation
//! - Queue durability across process restarts

pub mod test_utils;

#[cfg(test)]
mod dispatch_flow_tests;

#[cfg(test)]
mod inventory_contention_tests;

#[cfg(test)]
mod queue_durability_tests;
