//! Dispatch coordination for the Vigil dispatch core.
//!
//! The [`Coordinator`] composes the priority queue, the equipment allocator
//! and the team dispatcher into one dispatch flow: a submitted case is ranked,
//! its equipment reserved, and the nearest capable team assigned, with
//! compensation when a downstream step fails.

pub mod coordinator;
pub mod types;

pub use coordinator::{Coordinator, CoordinatorError};
pub use types::{CaseReport, CompletionReport, DispatchReport};
