//! Team Dispatcher - registry and assignment of rescue teams
//!
//! Provides real-time tracking of team locations and availability, nearest-
//! team selection under equipment constraints, and ETA estimation from
//! great-circle distance.

use crate::team::{Team, TeamStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{info, warn};
use vigil_core::config::TeamConfig;
use vigil_core::{now_ms, EtaModel, GeoError, Location};

/// Dispatcher errors
#[derive(Debug, Error)]
pub enum TeamError {
    /// No team with the given id
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    /// Team cannot take a new assignment
    #[error("Team {team_id} is not available. Current status: {current_status}")]
    NotAvailable {
        /// Team identifier
        team_id: String,
        /// Status blocking the assignment
        current_status: TeamStatus,
        /// Case the team is currently working, if any
        current_assignment: Option<String>,
    },

    /// Status value outside the allowed enum
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// No team is currently available
    #[error("No teams currently available")]
    NoTeamsAvailable,

    /// Teams exist but none carries the required equipment
    #[error("No available teams with required equipment: {0:?}")]
    NoTeamsWithEquipment(Vec<String>),

    /// Coordinate outside the valid range
    #[error(transparent)]
    InvalidLocation(#[from] GeoError),
}

/// Result of assigning a team to a case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub team_id: String,
    pub case_id: String,
    pub team_status: TeamStatus,
    /// Distance to the case in km, when a case location was given
    pub distance_km: Option<f64>,
    /// Estimated travel time, when a case location was given
    pub eta_minutes: Option<u32>,
    pub team_location: Location,
}

/// Result of releasing a team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasedTeam {
    pub team_id: String,
    /// Case the team was working before release
    pub released_from: Option<String>,
}

/// A candidate team with its distance to the case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamCandidate {
    pub team: Team,
    pub distance_km: f64,
    pub eta_minutes: u32,
}

/// Nearest-team selection with runners-up for operator override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestTeam {
    pub team: Team,
    pub distance_km: f64,
    pub eta_minutes: u32,
    /// Up to two runners-up, sorted by distance
    pub alternatives: Vec<TeamCandidate>,
}

/// Registry of rescue teams with assignment operations.
pub struct TeamDispatcher {
    teams: RwLock<HashMap<String, Team>>,
    eta: EtaModel,
}

impl TeamDispatcher {
    /// Build a dispatcher from config seed entries.
    pub fn from_config(seed: &[TeamConfig], eta: EtaModel) -> Result<Self, GeoError> {
        let now = now_ms();
        let teams = seed
            .iter()
            .map(|c| Team::from_config(c, now).map(|t| (t.id.clone(), t)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        info!(team_count = teams.len(), "Team dispatcher initialized");

        Ok(Self {
            teams: RwLock::new(teams),
            eta,
        })
    }

    /// Build a dispatcher with the standard four-team roster.
    pub fn with_default_teams() -> Self {
        let config = vigil_core::Config::default_config();
        Self::from_config(&config.teams, EtaModel::urban_default())
            .expect("default roster has valid coordinates")
    }

    /// List teams, optionally filtered by status, sorted by id.
    pub fn list_teams(&self, status_filter: Option<TeamStatus>) -> Vec<Team> {
        let teams = self.teams.read().expect("team lock poisoned");
        let mut listed: Vec<Team> = teams
            .values()
            .filter(|t| status_filter.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.id.cmp(&b.id));
        listed
    }

    /// Get a single team by id.
    pub fn get_team(&self, id: &str) -> Result<Team, TeamError> {
        let teams = self.teams.read().expect("team lock poisoned");
        teams
            .get(id)
            .cloned()
            .ok_or_else(|| TeamError::TeamNotFound(id.to_string()))
    }

    /// Update a team's GPS position.
    pub fn update_location(&self, id: &str, lat: f64, lng: f64) -> Result<Team, TeamError> {
        let location = Location::new(lat, lng)?;
        let mut teams = self.teams.write().expect("team lock poisoned");

        let team = teams
            .get_mut(id)
            .ok_or_else(|| TeamError::TeamNotFound(id.to_string()))?;

        team.location = location;
        team.last_update = now_ms();

        info!(team_id = %id, lat, lng, "Team location updated");
        Ok(team.clone())
    }

    /// Assign a team to a case.
    ///
    /// Fails with [`TeamError::NotAvailable`] unless the team's status is
    /// `available`. When the case location is known, the assignment carries
    /// the great-circle distance and an ETA.
    pub fn assign(
        &self,
        team_id: &str,
        case_id: &str,
        case_location: Option<Location>,
    ) -> Result<Assignment, TeamError> {
        let mut teams = self.teams.write().expect("team lock poisoned");

        let team = teams
            .get_mut(team_id)
            .ok_or_else(|| TeamError::TeamNotFound(team_id.to_string()))?;

        if !team.status.is_available() {
            warn!(team_id = %team_id, status = %team.status, "Assignment rejected");
            return Err(TeamError::NotAvailable {
                team_id: team_id.to_string(),
                current_status: team.status,
                current_assignment: team.assigned_to.clone(),
            });
        }

        let (distance_km, eta_minutes) = match case_location {
            Some(case_loc) => {
                let distance = team.location.distance_km(&case_loc);
                (Some(round_km(distance)), Some(self.eta.eta_minutes(distance)))
            }
            None => (None, None),
        };

        team.status = TeamStatus::EnRoute;
        team.assigned_to = Some(case_id.to_string());
        team.eta_minutes = eta_minutes;
        team.last_update = now_ms();

        info!(
            team_id = %team_id,
            case_id = %case_id,
            eta_minutes,
            "Team dispatched"
        );

        Ok(Assignment {
            team_id: team_id.to_string(),
            case_id: case_id.to_string(),
            team_status: TeamStatus::EnRoute,
            distance_km,
            eta_minutes,
            team_location: team.location,
        })
    }

    /// Update a team's operational status.
    ///
    /// Moving to `available` clears the assignment and ETA; arriving
    /// `on_scene` forces the ETA to zero.
    pub fn update_status(&self, id: &str, status: TeamStatus) -> Result<Team, TeamError> {
        let mut teams = self.teams.write().expect("team lock poisoned");

        let team = teams
            .get_mut(id)
            .ok_or_else(|| TeamError::TeamNotFound(id.to_string()))?;

        let old_status = team.status;
        team.status = status;
        team.last_update = now_ms();

        match status {
            TeamStatus::Available => {
                team.assigned_to = None;
                team.eta_minutes = None;
            }
            TeamStatus::OnScene => {
                team.eta_minutes = Some(0);
            }
            _ => {}
        }

        info!(team_id = %id, from = %old_status, to = %status, "Team status changed");
        Ok(team.clone())
    }

    /// Release a team from its assignment (mission complete).
    pub fn release(&self, id: &str) -> Result<ReleasedTeam, TeamError> {
        let mut teams = self.teams.write().expect("team lock poisoned");

        let team = teams
            .get_mut(id)
            .ok_or_else(|| TeamError::TeamNotFound(id.to_string()))?;

        let released_from = team.assigned_to.take();
        team.status = TeamStatus::Available;
        team.eta_minutes = None;
        team.last_update = now_ms();

        info!(team_id = %id, ?released_from, "Team released");

        Ok(ReleasedTeam {
            team_id: id.to_string(),
            released_from,
        })
    }

    /// Find the nearest available team to a case location.
    ///
    /// Filters to teams carrying every item in `required_equipment`, then
    /// selects the minimum-distance team and returns up to two runners-up
    /// for operator override.
    pub fn nearest_available(
        &self,
        case_location: Location,
        required_equipment: &[String],
    ) -> Result<NearestTeam, TeamError> {
        let teams = self.teams.read().expect("team lock poisoned");

        let available: Vec<&Team> = teams.values().filter(|t| t.status.is_available()).collect();
        if available.is_empty() {
            warn!("No available teams");
            return Err(TeamError::NoTeamsAvailable);
        }

        let capable: Vec<&Team> = available
            .into_iter()
            .filter(|t| t.carries_all(required_equipment))
            .collect();
        if capable.is_empty() {
            warn!(?required_equipment, "No teams with required equipment");
            return Err(TeamError::NoTeamsWithEquipment(
                required_equipment.to_vec(),
            ));
        }

        let mut candidates: Vec<TeamCandidate> = capable
            .into_iter()
            .map(|team| {
                let distance = team.location.distance_km(&case_location);
                TeamCandidate {
                    team: team.clone(),
                    distance_km: round_km(distance),
                    eta_minutes: self.eta.eta_minutes(distance),
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let nearest = candidates.remove(0);
        candidates.truncate(2);

        info!(
            team_id = %nearest.team.id,
            distance_km = nearest.distance_km,
            "Nearest team selected"
        );

        Ok(NearestTeam {
            team: nearest.team,
            distance_km: nearest.distance_km,
            eta_minutes: nearest.eta_minutes,
            alternatives: candidates,
        })
    }
}

fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> TeamDispatcher {
        TeamDispatcher::with_default_teams()
    }

    fn case_location() -> Location {
        Location::new(13.756, 100.502).unwrap()
    }

    #[test]
    fn test_default_roster() {
        let dispatcher = dispatcher();
        let teams = dispatcher.list_teams(None);
        assert_eq!(teams.len(), 4);
        assert!(teams.iter().all(|t| t.status == TeamStatus::Available));
    }

    #[test]
    fn test_get_team() {
        let dispatcher = dispatcher();
        let team = dispatcher.get_team("T-Alpha").unwrap();
        assert_eq!(team.name, "Alpha Response Unit");
        assert!(matches!(
            dispatcher.get_team("T-Zulu"),
            Err(TeamError::TeamNotFound(_))
        ));
    }

    #[test]
    fn test_list_filtered_by_status() {
        let dispatcher = dispatcher();
        dispatcher.assign("T-Alpha", "V-1", None).unwrap();

        let available = dispatcher.list_teams(Some(TeamStatus::Available));
        assert_eq!(available.len(), 3);
        let en_route = dispatcher.list_teams(Some(TeamStatus::EnRoute));
        assert_eq!(en_route.len(), 1);
        assert_eq!(en_route[0].id, "T-Alpha");
    }

    #[test]
    fn test_assign_with_location_computes_eta() {
        let dispatcher = dispatcher();
        let assignment = dispatcher
            .assign("T-Alpha", "V-1", Some(case_location()))
            .unwrap();

        assert_eq!(assignment.team_status, TeamStatus::EnRoute);
        let distance = assignment.distance_km.unwrap();
        assert!(distance > 0.0 && distance < 10.0, "got {distance}");
        assert!(assignment.eta_minutes.unwrap() >= 1);

        let team = dispatcher.get_team("T-Alpha").unwrap();
        assert_eq!(team.assigned_to.as_deref(), Some("V-1"));
        assert_eq!(team.eta_minutes, assignment.eta_minutes);
    }

    #[test]
    fn test_assign_without_location() {
        let dispatcher = dispatcher();
        let assignment = dispatcher.assign("T-Bravo", "V-2", None).unwrap();
        assert!(assignment.distance_km.is_none());
        assert!(assignment.eta_minutes.is_none());
    }

    #[test]
    fn test_assign_busy_team_fails() {
        let dispatcher = dispatcher();
        dispatcher.assign("T-Alpha", "V-1", None).unwrap();

        let err = dispatcher.assign("T-Alpha", "V-2", None).unwrap_err();
        match err {
            TeamError::NotAvailable {
                current_status,
                current_assignment,
                ..
            } => {
                assert_eq!(current_status, TeamStatus::EnRoute);
                assert_eq!(current_assignment.as_deref(), Some("V-1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_status_update_side_effects() {
        let dispatcher = dispatcher();
        dispatcher
            .assign("T-Alpha", "V-1", Some(case_location()))
            .unwrap();

        // Arriving on scene zeroes the ETA but keeps the assignment
        let team = dispatcher
            .update_status("T-Alpha", TeamStatus::OnScene)
            .unwrap();
        assert_eq!(team.eta_minutes, Some(0));
        assert_eq!(team.assigned_to.as_deref(), Some("V-1"));

        // Going available clears assignment and ETA
        let team = dispatcher
            .update_status("T-Alpha", TeamStatus::Available)
            .unwrap();
        assert!(team.assigned_to.is_none());
        assert!(team.eta_minutes.is_none());
    }

    #[test]
    fn test_release_reports_previous_assignment() {
        let dispatcher = dispatcher();
        dispatcher.assign("T-Charlie", "V-9", None).unwrap();

        let released = dispatcher.release("T-Charlie").unwrap();
        assert_eq!(released.released_from.as_deref(), Some("V-9"));

        let team = dispatcher.get_team("T-Charlie").unwrap();
        assert_eq!(team.status, TeamStatus::Available);
        assert!(team.assigned_to.is_none());
    }

    #[test]
    fn test_update_location() {
        let dispatcher = dispatcher();
        let team = dispatcher.update_location("T-Delta", 13.70, 100.49).unwrap();
        assert!((team.location.lat - 13.70).abs() < 1e-9);

        assert!(matches!(
            dispatcher.update_location("T-Delta", 95.0, 0.0),
            Err(TeamError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_nearest_available_picks_closest() {
        let dispatcher = dispatcher();
        let nearest = dispatcher
            .nearest_available(case_location(), &[])
            .unwrap();

        // T-Delta at (13.7500, 100.5100) is closest to (13.756, 100.502)
        assert_eq!(nearest.team.id, "T-Delta");
        assert_eq!(nearest.alternatives.len(), 2);
        assert!(nearest.distance_km <= nearest.alternatives[0].distance_km);
        assert!(
            nearest.alternatives[0].distance_km <= nearest.alternatives[1].distance_km
        );
    }

    #[test]
    fn test_nearest_available_equipment_filter() {
        let dispatcher = dispatcher();
        let nearest = dispatcher
            .nearest_available(case_location(), &["hydraulic_cutter".to_string()])
            .unwrap();

        // Only T-Alpha carries a hydraulic cutter
        assert_eq!(nearest.team.id, "T-Alpha");
        assert!(nearest.alternatives.is_empty());
    }

    #[test]
    fn test_nearest_available_no_capable_team() {
        let dispatcher = dispatcher();
        let err = dispatcher
            .nearest_available(case_location(), &["crane".to_string()])
            .unwrap_err();
        assert!(matches!(err, TeamError::NoTeamsWithEquipment(_)));
    }

    #[test]
    fn test_nearest_available_none_free() {
        let dispatcher = dispatcher();
        for id in ["T-Alpha", "T-Bravo", "T-Charlie", "T-Delta"] {
            dispatcher.assign(id, "V-1", None).unwrap();
        }

        assert!(matches!(
            dispatcher.nearest_available(case_location(), &[]),
            Err(TeamError::NoTeamsAvailable)
        ));
    }

    #[test]
    fn test_busy_team_excluded_from_nearest() {
        let dispatcher = dispatcher();
        dispatcher.assign("T-Delta", "V-1", None).unwrap();

        let nearest = dispatcher
            .nearest_available(case_location(), &[])
            .unwrap();
        // With T-Delta out, T-Alpha is the closest remaining team
        assert_eq!(nearest.team.id, "T-Alpha");
    }
}
