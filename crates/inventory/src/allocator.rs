//! Allocation Engine - per-mission equipment reservation
//!
//! Turns a requested equipment list into a reservation outcome against the
//! [`Ledger`](crate::Ledger), with partial-fulfillment semantics: each line is
//! fully reserved, partially reserved, or recorded as shortfall with a reason
//! code. Releasing a mission returns exactly what was reserved, no more.

use crate::ledger::{Ledger, LedgerError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};
use vigil_core::now_ms;

/// Default round-robin pool for auto-assigned team names
pub const DEFAULT_TEAM_POOL: [&str; 6] = [
    "T-Alpha",
    "T-Bravo",
    "T-Charlie",
    "T-Delta",
    "T-Echo",
    "T-Foxtrot",
];

/// Allocation errors
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A mission already holds an active allocation record.
    ///
    /// The caller must release the existing allocation first; silently
    /// overwriting it would leak the prior reservations.
    #[error("Mission {0} already has an active allocation")]
    AlreadyAllocated(String),

    /// No active allocation recorded for the mission
    #[error("Mission {0} not found in active allocations")]
    MissionNotFound(String),
}

/// One requested equipment line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentRequest {
    /// Equipment name
    pub item: String,
    /// Requested quantity
    pub quantity: u32,
    /// Request priority tag from the estimator ("required", "recommended", ...)
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_priority() -> String {
    "required".to_string()
}

/// One reserved equipment line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedItem {
    pub item: String,
    pub quantity: u32,
}

/// Reason a requested quantity could not be reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallReason {
    /// Item does not exist in the inventory
    ItemNotFound,
    /// Some stock was available but less than requested
    InsufficientStock,
    /// No stock available at all
    OutOfStock,
}

/// The portion of a request that could not be reserved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortfallItem {
    pub item: String,
    pub quantity: u32,
    pub reason: ShortfallReason,
}

/// Result of an allocation call.
///
/// `allocated` is a lenient success flag: true when at least one line was
/// fully or partially reserved. Callers must inspect `shortfall` to learn
/// what is still missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub request_id: String,
    pub mission_id: String,
    pub allocated: bool,
    pub team_id: String,
    pub equipment_assigned: Vec<AssignedItem>,
    pub shortfall: Vec<ShortfallItem>,
    /// Allocation timestamp (Unix epoch milliseconds)
    pub allocated_at: u64,
}

/// Active allocation stored per mission until release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub request_id: String,
    pub mission_id: String,
    pub team_id: String,
    pub equipment_assigned: Vec<AssignedItem>,
    pub allocated_at: u64,
}

/// Items returned to the ledger when a mission releases its allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    pub mission_id: String,
    pub items_returned: Vec<AssignedItem>,
}

/// Allocation engine over a shared equipment ledger.
pub struct Allocator {
    ledger: Arc<Ledger>,
    records: Mutex<HashMap<String, AllocationRecord>>,
    team_pool: Vec<String>,
    next_team: AtomicUsize,
}

impl Allocator {
    /// Create an allocator with the default round-robin team pool.
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self::with_team_pool(
            ledger,
            DEFAULT_TEAM_POOL.iter().map(|t| t.to_string()).collect(),
        )
    }

    /// Create an allocator with a custom round-robin team pool.
    ///
    /// An empty pool falls back to [`DEFAULT_TEAM_POOL`] so auto-assignment
    /// always has a name to hand out.
    pub fn with_team_pool(ledger: Arc<Ledger>, team_pool: Vec<String>) -> Self {
        let team_pool = if team_pool.is_empty() {
            warn!("Empty team pool configured, falling back to default pool");
            DEFAULT_TEAM_POOL.iter().map(|t| t.to_string()).collect()
        } else {
            team_pool
        };

        Self {
            ledger,
            records: Mutex::new(HashMap::new()),
            team_pool,
            next_team: AtomicUsize::new(0),
        }
    }

    fn next_team_id(&self) -> String {
        let idx = self.next_team.fetch_add(1, Ordering::Relaxed);
        self.team_pool[idx % self.team_pool.len()].clone()
    }

    /// Allocate equipment for a mission.
    ///
    /// Each requested line is processed in order: fully reserved when stock
    /// covers it, partially reserved when some stock remains, otherwise
    /// recorded as shortfall. A mission with an active allocation is rejected
    /// with [`AllocationError::AlreadyAllocated`]; release it first.
    pub fn allocate(
        &self,
        request_id: &str,
        mission_id: &str,
        items: &[EquipmentRequest],
        team_id: Option<&str>,
    ) -> Result<AllocationOutcome, AllocationError> {
        // Held for the whole call so check-then-insert on the record table
        // is atomic with respect to other allocate/release calls.
        let mut records = self.records.lock().expect("allocation lock poisoned");

        if records.contains_key(mission_id) {
            return Err(AllocationError::AlreadyAllocated(mission_id.to_string()));
        }

        let team_id = match team_id {
            Some(id) => id.to_string(),
            None => self.next_team_id(),
        };

        let mut equipment_assigned: Vec<AssignedItem> = Vec::new();
        let mut shortfall: Vec<ShortfallItem> = Vec::new();

        for request in items {
            let item = request.item.to_lowercase();
            let requested = request.quantity;

            match self.ledger.reserve(&item, requested) {
                Ok(_) => equipment_assigned.push(AssignedItem {
                    item,
                    quantity: requested,
                }),
                Err(LedgerError::ItemNotFound(_)) => shortfall.push(ShortfallItem {
                    item,
                    quantity: requested,
                    reason: ShortfallReason::ItemNotFound,
                }),
                Err(LedgerError::InsufficientStock { available, .. }) if available > 0 => {
                    // Take what remains, record the rest as shortfall
                    match self.ledger.reserve(&item, available) {
                        Ok(_) => {
                            equipment_assigned.push(AssignedItem {
                                item: item.clone(),
                                quantity: available,
                            });
                            shortfall.push(ShortfallItem {
                                item,
                                quantity: requested - available,
                                reason: ShortfallReason::InsufficientStock,
                            });
                        }
                        Err(_) => {
                            // Stock vanished between the two calls
                            shortfall.push(ShortfallItem {
                                item,
                                quantity: requested,
                                reason: ShortfallReason::OutOfStock,
                            });
                        }
                    }
                }
                Err(LedgerError::InsufficientStock { .. }) => shortfall.push(ShortfallItem {
                    item,
                    quantity: requested,
                    reason: ShortfallReason::OutOfStock,
                }),
            }
        }

        let allocated = !equipment_assigned.is_empty();
        let allocated_at = now_ms();

        let record = AllocationRecord {
            request_id: request_id.to_string(),
            mission_id: mission_id.to_string(),
            team_id: team_id.clone(),
            equipment_assigned: equipment_assigned.clone(),
            allocated_at,
        };
        records.insert(mission_id.to_string(), record);

        if shortfall.is_empty() {
            info!(mission_id, %team_id, lines = equipment_assigned.len(), "Allocation complete");
        } else {
            warn!(
                mission_id,
                %team_id,
                assigned = equipment_assigned.len(),
                short = shortfall.len(),
                "Allocation completed with shortfall"
            );
        }

        Ok(AllocationOutcome {
            request_id: request_id.to_string(),
            mission_id: mission_id.to_string(),
            allocated,
            team_id,
            equipment_assigned,
            shortfall,
            allocated_at,
        })
    }

    /// Release a mission's allocation, returning every reserved item to the
    /// ledger and deleting the record. A second release for the same mission
    /// reports [`AllocationError::MissionNotFound`].
    pub fn release(&self, mission_id: &str) -> Result<ReleaseOutcome, AllocationError> {
        let mut records = self.records.lock().expect("allocation lock poisoned");

        let record = records
            .remove(mission_id)
            .ok_or_else(|| AllocationError::MissionNotFound(mission_id.to_string()))?;
        drop(records);

        let mut items_returned = Vec::new();
        for assigned in &record.equipment_assigned {
            match self.ledger.release(&assigned.item, assigned.quantity) {
                Ok(receipt) => items_returned.push(AssignedItem {
                    item: assigned.item.clone(),
                    quantity: receipt.released_qty,
                }),
                Err(err) => warn!(
                    mission_id,
                    item = %assigned.item,
                    %err,
                    "Failed to return item on release"
                ),
            }
        }

        info!(mission_id, lines = items_returned.len(), "Mission allocation released");

        Ok(ReleaseOutcome {
            mission_id: mission_id.to_string(),
            items_returned,
        })
    }

    /// All active allocation records.
    pub fn active_allocations(&self) -> Vec<AllocationRecord> {
        let records = self.records.lock().expect("allocation lock poisoned");
        records.values().cloned().collect()
    }

    /// The active allocation for one mission, if any.
    pub fn mission_allocation(&self, mission_id: &str) -> Option<AllocationRecord> {
        let records = self.records.lock().expect("allocation lock poisoned");
        records.get(mission_id).cloned()
    }
}
