//! Dispatch Coordinator - end-to-end case handling
//!
//! Composes the priority queue, the allocation engine and the team dispatcher.
//! The cross-component flow is not one transaction; each sub-operation is
//! atomic on its own store and the coordinator compensates when a downstream
//! step fails.

use crate::types::{CaseReport, CompletionReport, DispatchReport};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use vigil_core::config::Config;
use vigil_core::{now_ms, EtaModel, Location};
use vigil_inventory::{
    AllocationError, AllocationOutcome, AllocationRecord, Allocator, EquipmentRequest,
    InventoryStatus, Ledger, LedgerError, ReleaseOutcome, StockAlert,
};
use vigil_teams::{Assignment, NearestTeam, Team, TeamDispatcher, TeamError, TeamStatus};
use vigil_triage::{
    Case, CaseStatus, PriorityQueue, QueueStats, QueueStore, TriageError,
};

/// Coordinator errors, composing the member components' errors
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Malformed case report or request payload
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Triage(#[from] TriageError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Team(#[from] TeamError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Dispatch coordinator over owned component handles.
///
/// All stores are constructed at process start and injected; there is no
/// global state. Clones of the `Arc` handles may be shared with other
/// front-ends (the allocator and ledger in particular are shared).
pub struct Coordinator {
    queue: Arc<PriorityQueue>,
    ledger: Arc<Ledger>,
    allocator: Arc<Allocator>,
    teams: Arc<TeamDispatcher>,
}

impl Coordinator {
    /// Build a coordinator over existing component handles.
    pub fn new(
        queue: Arc<PriorityQueue>,
        ledger: Arc<Ledger>,
        allocator: Arc<Allocator>,
        teams: Arc<TeamDispatcher>,
    ) -> Self {
        Self {
            queue,
            ledger,
            allocator,
            teams,
        }
    }

    /// Build every component from configuration.
    pub fn from_config(config: &Config) -> Result<Self, CoordinatorError> {
        let store = QueueStore::open(&config.queue.db_path).map_err(TriageError::from)?;
        let queue = Arc::new(PriorityQueue::open(store)?);

        let ledger = Arc::new(Ledger::from_config(&config.inventory));
        let allocator = Arc::new(Allocator::with_team_pool(
            Arc::clone(&ledger),
            config.dispatch.team_pool.clone(),
        ));

        let eta = EtaModel {
            avg_speed_kmh: config.dispatch.avg_speed_kmh,
            traffic_multiplier: config.dispatch.traffic_multiplier,
        };
        let teams = Arc::new(
            TeamDispatcher::from_config(&config.teams, eta)
                .map_err(|e| CoordinatorError::Validation(e.to_string()))?,
        );

        info!("Dispatch coordinator ready");
        Ok(Self::new(queue, ledger, allocator, teams))
    }

    /// Handle a new case report end to end.
    ///
    /// The case is validated and ranked into the queue (a failed durable
    /// write fails the whole call), requested equipment is reserved under the
    /// case id as mission id, and the nearest capable team is assigned. If no
    /// team can be assigned the reservations are rolled back and the case
    /// stays pending with the reason in `dispatch_note`.
    pub fn submit_case(&self, report: CaseReport) -> Result<DispatchReport, CoordinatorError> {
        let location = validate_report(&report)?;
        let case_id = report.case_id.clone();

        // Reject before touching the queue so a failed resubmit does not
        // overwrite the durably ranked case
        if self.allocator.mission_allocation(&case_id).is_some() {
            return Err(AllocationError::AlreadyAllocated(case_id).into());
        }

        let case = Case::new(
            &case_id,
            report.score,
            location,
            &report.description,
            report.num_people,
            now_ms(),
        );
        let priority_level = case.priority_level;
        let placement = self.queue.upsert(case)?;

        info!(
            case_id = %case_id,
            score = report.score,
            position = placement.position,
            "Case ranked into queue"
        );

        let allocation = if report.equipment.is_empty() {
            None
        } else {
            Some(self.allocator.allocate(
                &format!("REQ-{case_id}"),
                &case_id,
                &report.equipment,
                None,
            )?)
        };

        let required: Vec<String> = report
            .equipment
            .iter()
            .filter(|r| r.priority == "required")
            .map(|r| r.item.to_lowercase())
            .collect();

        match self.dispatch_team(&case_id, location, &required) {
            Ok(assignment) => {
                // Rollback both downstream steps if the status write fails
                if let Err(err) = self.queue.set_status(&case_id, CaseStatus::InProgress) {
                    self.rollback_dispatch(&case_id, allocation.is_some(), true);
                    return Err(err.into());
                }

                Ok(DispatchReport {
                    case_id,
                    priority_level,
                    placement,
                    allocation,
                    team: Some(assignment),
                    case_status: CaseStatus::InProgress,
                    dispatch_note: None,
                })
            }
            Err(err) => {
                warn!(case_id = %case_id, %err, "No team assigned, compensating");
                if allocation.is_some() {
                    self.rollback_dispatch(&case_id, true, false);
                }

                Ok(DispatchReport {
                    case_id,
                    priority_level,
                    placement,
                    allocation: None,
                    team: None,
                    case_status: CaseStatus::Pending,
                    dispatch_note: Some(err.to_string()),
                })
            }
        }
    }

    /// Complete a case: return its equipment, free its team, resolve it.
    pub fn complete_case(&self, case_id: &str) -> Result<CompletionReport, CoordinatorError> {
        let items_returned = match self.allocator.release(case_id) {
            Ok(outcome) => outcome.items_returned,
            Err(AllocationError::MissionNotFound(_)) => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let team_released = self.assigned_team(case_id).map(|team| team.id);
        if let Some(id) = &team_released {
            self.teams.release(id)?;
        }

        let case = self.queue.set_status(case_id, CaseStatus::Resolved)?;

        info!(
            case_id = %case_id,
            items = items_returned.len(),
            team = ?team_released,
            "Case completed"
        );

        Ok(CompletionReport {
            case_id: case_id.to_string(),
            items_returned,
            team_released,
            case_status: case.status,
        })
    }

    fn dispatch_team(
        &self,
        case_id: &str,
        location: Location,
        required: &[String],
    ) -> Result<Assignment, TeamError> {
        let nearest = self.teams.nearest_available(location, required)?;
        self.teams.assign(&nearest.team.id, case_id, Some(location))
    }

    /// Undo downstream steps of a failed submit. Failures here are logged,
    /// not propagated; the original error stays the caller's answer.
    fn rollback_dispatch(&self, case_id: &str, release_allocation: bool, release_team: bool) {
        if release_allocation {
            if let Err(err) = self.allocator.release(case_id) {
                warn!(case_id, %err, "Failed to roll back allocation");
            }
        }
        if release_team {
            if let Some(team) = self.assigned_team(case_id) {
                if let Err(err) = self.teams.release(&team.id) {
                    warn!(case_id, %err, "Failed to roll back team assignment");
                }
            }
        }
    }

    fn assigned_team(&self, case_id: &str) -> Option<Team> {
        self.teams
            .list_teams(None)
            .into_iter()
            .find(|t| t.assigned_to.as_deref() == Some(case_id))
    }

    // --- queue passthroughs ---

    /// Cases in priority order, optionally limited and filtered by status.
    pub fn get_queue(
        &self,
        limit: Option<usize>,
        status_filter: Option<CaseStatus>,
    ) -> Vec<Case> {
        self.queue.list(limit, status_filter)
    }

    /// One case by id.
    pub fn get_case(&self, case_id: &str) -> Option<Case> {
        self.queue.get(case_id)
    }

    /// Advance a case's lifecycle status.
    pub fn update_case_status(
        &self,
        case_id: &str,
        status: CaseStatus,
    ) -> Result<Case, CoordinatorError> {
        Ok(self.queue.set_status(case_id, status)?)
    }

    /// Aggregate queue counters.
    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    // --- inventory passthroughs ---

    /// Snapshot of every equipment item.
    pub fn inventory_status(&self) -> InventoryStatus {
        self.ledger.status_all()
    }

    /// Reserve equipment for a mission without the full dispatch flow.
    pub fn allocate(
        &self,
        request_id: &str,
        mission_id: &str,
        items: &[EquipmentRequest],
        team_id: Option<&str>,
    ) -> Result<AllocationOutcome, CoordinatorError> {
        Ok(self.allocator.allocate(request_id, mission_id, items, team_id)?)
    }

    /// Return a mission's reserved equipment to the ledger.
    pub fn release_allocation(&self, mission_id: &str) -> Result<ReleaseOutcome, CoordinatorError> {
        Ok(self.allocator.release(mission_id)?)
    }

    /// Active allocation records.
    pub fn active_allocations(&self) -> Vec<AllocationRecord> {
        self.allocator.active_allocations()
    }

    /// Drain stock alerts raised since the last call.
    pub fn take_stock_alerts(&self) -> Vec<StockAlert> {
        self.ledger.take_alerts()
    }

    // --- team passthroughs ---

    /// Teams in the registry, optionally filtered by status.
    pub fn list_teams(&self, status_filter: Option<TeamStatus>) -> Vec<Team> {
        self.teams.list_teams(status_filter)
    }

    /// Assign a specific team to a case.
    pub fn assign_team(
        &self,
        team_id: &str,
        case_id: &str,
        case_location: Option<Location>,
    ) -> Result<Assignment, CoordinatorError> {
        Ok(self.teams.assign(team_id, case_id, case_location)?)
    }

    /// Release a team back to available.
    pub fn release_team(&self, team_id: &str) -> Result<(), CoordinatorError> {
        self.teams.release(team_id)?;
        Ok(())
    }

    /// Nearest available team to a location, under equipment constraints.
    pub fn nearest_available(
        &self,
        case_location: Location,
        required_equipment: &[String],
    ) -> Result<NearestTeam, CoordinatorError> {
        Ok(self.teams.nearest_available(case_location, required_equipment)?)
    }
}

fn validate_report(report: &CaseReport) -> Result<Location, CoordinatorError> {
    if report.case_id.trim().is_empty() {
        return Err(CoordinatorError::Validation(
            "case_id must not be empty".to_string(),
        ));
    }
    if report.num_people < 1 {
        return Err(CoordinatorError::Validation(
            "num_people must be at least 1".to_string(),
        ));
    }
    Location::new(report.lat, report.lng).map_err(|e| CoordinatorError::Validation(e.to_string()))
}
