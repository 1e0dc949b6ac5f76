//! Coordinator request and report payloads

use serde::{Deserialize, Serialize};
use vigil_inventory::{AllocationOutcome, AssignedItem, EquipmentRequest};
use vigil_teams::Assignment;
use vigil_triage::{CaseStatus, PriorityLevel, QueuePlacement};

/// An incoming case report from an intake collaborator.
///
/// The severity score and the equipment list come pre-computed; the
/// coordinator validates, ranks and dispatches but does not estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    /// Case identifier, also used as the mission id for allocations
    pub case_id: String,
    /// Severity score (higher = more urgent)
    pub score: i32,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    /// Number of people affected, at least 1
    pub num_people: u32,
    /// Equipment requested for the response; may be empty
    #[serde(default)]
    pub equipment: Vec<EquipmentRequest>,
}

/// What happened to a submitted case.
///
/// Allocation and team assignment are best-effort: `allocation` is absent when
/// no equipment was requested, and `team` is absent when no team could be
/// assigned, in which case `dispatch_note` carries the reason and the case
/// stays pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub case_id: String,
    pub priority_level: PriorityLevel,
    pub placement: QueuePlacement,
    pub allocation: Option<AllocationOutcome>,
    pub team: Option<Assignment>,
    pub case_status: CaseStatus,
    /// Why no team was assigned, when `team` is absent
    pub dispatch_note: Option<String>,
}

/// Result of completing a case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReport {
    pub case_id: String,
    /// Equipment returned to the ledger, empty when nothing was allocated
    pub items_returned: Vec<AssignedItem>,
    /// Team released from the case, if one was assigned
    pub team_released: Option<String>,
    pub case_status: CaseStatus,
}
