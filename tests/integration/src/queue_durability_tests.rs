//! Queue durability across restarts

use crate::test_utils::{case_report, coordinator_at};
use vigil_triage::{CaseStatus, PriorityQueue, QueueStore};

#[test]
fn test_queue_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.db");

    {
        let coordinator = coordinator_at(&path);
        coordinator.submit_case(case_report("V-low", 3)).unwrap();
        coordinator.submit_case(case_report("V-high", 9)).unwrap();
    }

    // Fresh process: queue order and content come back from the snapshot
    let coordinator = coordinator_at(&path);
    let ids: Vec<String> = coordinator
        .get_queue(None, None)
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["V-high", "V-low"]);
}

#[test]
fn test_status_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.db");

    {
        let coordinator = coordinator_at(&path);
        coordinator.submit_case(case_report("V-1", 8)).unwrap();
        coordinator.complete_case("V-1").unwrap();
    }

    let coordinator = coordinator_at(&path);
    assert_eq!(
        coordinator.get_case("V-1").unwrap().status,
        CaseStatus::Resolved
    );
}

#[test]
fn test_tie_break_stable_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.db");

    {
        // Raw queue access to control arrival times exactly
        let queue = PriorityQueue::open(QueueStore::open(&path).unwrap()).unwrap();
        let location = vigil_core::Location::new(13.75, 100.5).unwrap();
        queue
            .upsert(vigil_triage::Case::new("A", 87, location, "first", 1, 100))
            .unwrap();
        queue
            .upsert(vigil_triage::Case::new("B", 87, location, "second", 1, 200))
            .unwrap();
    }

    let queue = PriorityQueue::open(QueueStore::open(&path).unwrap()).unwrap();
    // Equal scores keep arrival order after reload
    assert_eq!(queue.position("A").unwrap(), 1);
    assert_eq!(queue.position("B").unwrap(), 2);
}
