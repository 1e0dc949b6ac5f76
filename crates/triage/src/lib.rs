//! Case triage for the Vigil dispatch core.
//!
//! Holds the priority queue of incident cases, ordered by severity score with
//! arrival-time tie-breaking, and persists the full ordered list as one
//! durable snapshot after every mutation.

pub mod case;
pub mod queue;
pub mod store;

pub use case::{Case, CaseStatus, PriorityLevel};
pub use queue::{PriorityQueue, QueuePlacement, QueueStats, TriageError};
pub use store::{QueueStore, StoreError};
