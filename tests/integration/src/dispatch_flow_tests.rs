//! End-to-end dispatch flow scenarios

use crate::test_utils::{case_report, in_memory_coordinator, required};
use vigil_inventory::ShortfallReason;
use vigil_teams::TeamStatus;
use vigil_triage::CaseStatus;

#[test]
fn test_full_mission_lifecycle() {
    let coordinator = in_memory_coordinator();

    let mut report = case_report("V-100", 9);
    report.equipment = vec![required("stretcher", 2), required("first_aid_kit", 3)];

    let dispatch = coordinator.submit_case(report).unwrap();
    assert_eq!(dispatch.case_status, CaseStatus::InProgress);
    let team_id = dispatch.team.as_ref().unwrap().team_id.clone();

    // Equipment reserved and team marked en route
    let inventory = coordinator.inventory_status();
    assert_eq!(inventory.items["stretcher"].available, 13);
    assert_eq!(inventory.items["first_aid_kit"].available, 27);
    let teams = coordinator.list_teams(Some(TeamStatus::EnRoute));
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].assigned_to.as_deref(), Some("V-100"));

    let completion = coordinator.complete_case("V-100").unwrap();
    assert_eq!(completion.team_released.as_deref(), Some(team_id.as_str()));
    assert_eq!(completion.items_returned.len(), 2);

    // Everything returned
    let inventory = coordinator.inventory_status();
    assert_eq!(inventory.items["stretcher"].available, 15);
    assert_eq!(inventory.items["first_aid_kit"].available, 30);
    assert_eq!(coordinator.list_teams(Some(TeamStatus::Available)).len(), 4);
    assert_eq!(
        coordinator.get_case("V-100").unwrap().status,
        CaseStatus::Resolved
    );
}

#[test]
fn test_queue_orders_across_submissions() {
    let coordinator = in_memory_coordinator();

    coordinator.submit_case(case_report("V-minor", 3)).unwrap();
    coordinator.submit_case(case_report("V-critical", 10)).unwrap();
    coordinator.submit_case(case_report("V-serious", 6)).unwrap();

    let ids: Vec<String> = coordinator
        .get_queue(None, None)
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["V-critical", "V-serious", "V-minor"]);
}

#[test]
fn test_shortfall_is_reported_not_fatal() {
    let coordinator = in_memory_coordinator();

    // Only 2 airbag lifters exist; ask for 5
    let mut report = case_report("V-1", 8);
    report.equipment = vec![required("airbag_lifter", 5), required("stretcher", 1)];

    let dispatch = coordinator.submit_case(report).unwrap();
    let allocation = dispatch.allocation.unwrap();
    assert!(allocation.allocated);

    let short = allocation
        .shortfall
        .iter()
        .find(|s| s.item == "airbag_lifter")
        .unwrap();
    assert_eq!(short.quantity, 3);
    assert_eq!(short.reason, ShortfallReason::InsufficientStock);

    // Dispatch still proceeded with what was available
    assert!(dispatch.team.is_some());
    assert_eq!(dispatch.case_status, CaseStatus::InProgress);
}

#[test]
fn test_compensation_rolls_back_reservations() {
    let coordinator = in_memory_coordinator();

    // Send every team out first
    for i in 0..4 {
        coordinator
            .submit_case(case_report(&format!("V-{i}"), 7))
            .unwrap();
    }

    let mut report = case_report("V-stranded", 9);
    report.equipment = vec![required("stretcher", 4)];
    let dispatch = coordinator.submit_case(report).unwrap();

    assert!(dispatch.team.is_none());
    assert_eq!(dispatch.case_status, CaseStatus::Pending);
    // The stretchers went back when assignment failed
    assert_eq!(coordinator.inventory_status().items["stretcher"].available, 15);
    assert!(coordinator.active_allocations().is_empty());

    // Free a team that actually carries stretchers; the case can then
    // be dispatched again
    let stretcher_case = coordinator
        .list_teams(None)
        .into_iter()
        .find(|t| t.equipment.contains("stretcher"))
        .and_then(|t| t.assigned_to)
        .unwrap();
    coordinator.complete_case(&stretcher_case).unwrap();

    let mut retry = case_report("V-stranded", 9);
    retry.equipment = vec![required("stretcher", 4)];
    let dispatch = coordinator.submit_case(retry).unwrap();
    assert!(dispatch.team.is_some());
    assert_eq!(dispatch.case_status, CaseStatus::InProgress);
}

#[test]
fn test_equipment_constrained_team_selection() {
    let coordinator = in_memory_coordinator();

    let mut report = case_report("V-1", 9);
    report.equipment = vec![required("hydraulic_cutter", 1)];

    let dispatch = coordinator.submit_case(report).unwrap();
    // T-Alpha is the only team carrying a hydraulic cutter
    assert_eq!(dispatch.team.unwrap().team_id, "T-Alpha");
}

#[test]
fn test_stock_alerts_surface_through_coordinator() {
    let coordinator = in_memory_coordinator();

    // Drain defibrillators (5 total, threshold 2) below the alert line
    let mut report = case_report("V-1", 9);
    report.equipment = vec![required("defibrillator", 4)];
    coordinator.submit_case(report).unwrap();

    let alerts = coordinator.take_stock_alerts();
    assert!(alerts.iter().any(|a| a.item == "defibrillator"));
    // Drained once, drained again is empty
    assert!(coordinator.take_stock_alerts().is_empty());
}

#[test]
fn test_resolved_cases_stay_in_queue() {
    let coordinator = in_memory_coordinator();
    coordinator.submit_case(case_report("V-1", 8)).unwrap();
    coordinator.complete_case("V-1").unwrap();

    let resolved = coordinator.get_queue(None, Some(CaseStatus::Resolved));
    assert_eq!(resolved.len(), 1);
    assert_eq!(coordinator.queue_stats().resolved, 1);
}
