//! Shared fixtures for the integration suite

use std::path::Path;
use std::sync::Arc;
use vigil_coordinator::{CaseReport, Coordinator};
use vigil_inventory::{Allocator, EquipmentRequest, Ledger};
use vigil_teams::TeamDispatcher;
use vigil_triage::{PriorityQueue, QueueStore};

/// Coordinator over in-memory stores with the default seed data.
pub fn in_memory_coordinator() -> Coordinator {
    let store = QueueStore::open_in_memory().expect("in-memory store");
    coordinator_with_store(store)
}

/// Coordinator whose queue snapshot lives at `path`, for restart tests.
pub fn coordinator_at(path: impl AsRef<Path>) -> Coordinator {
    let store = QueueStore::open(path).expect("file-backed store");
    coordinator_with_store(store)
}

fn coordinator_with_store(store: QueueStore) -> Coordinator {
    let queue = Arc::new(PriorityQueue::open(store).expect("queue"));
    let ledger = Arc::new(Ledger::with_default_inventory());
    let allocator = Arc::new(Allocator::new(Arc::clone(&ledger)));
    let teams = Arc::new(TeamDispatcher::with_default_teams());
    Coordinator::new(queue, ledger, allocator, teams)
}

/// A plausible case report near the default team bases.
pub fn case_report(case_id: &str, score: i32) -> CaseReport {
    CaseReport {
        case_id: case_id.to_string(),
        score,
        lat: 13.7563,
        lng: 100.5018,
        description: "collapsed structure, people trapped".to_string(),
        num_people: 2,
        equipment: Vec::new(),
    }
}

/// One required equipment line.
pub fn required(item: &str, quantity: u32) -> EquipmentRequest {
    EquipmentRequest {
        item: item.to_string(),
        quantity,
        priority: "required".to_string(),
    }
}
