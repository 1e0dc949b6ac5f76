//! Rescue team registry and dispatch for the Vigil dispatch core.
//!
//! Tracks a small registry of rescue teams (location, equipment,
//! availability) and assigns or releases them against cases under equipment
//! and distance constraints.

pub mod dispatcher;
pub mod team;

pub use dispatcher::{
    Assignment, NearestTeam, ReleasedTeam, TeamCandidate, TeamDispatcher, TeamError,
};
pub use team::{Team, TeamStatus};
