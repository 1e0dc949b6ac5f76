//! Team model
//!
//! A team is assignable only when its status is `available`; `assigned_to`
//! is set exactly while the team is working a case.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use vigil_core::config::TeamConfig;
use vigil_core::Location;

/// Operational status of a rescue team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    /// Ready for a new assignment
    Available,
    /// Travelling to an assigned case
    EnRoute,
    /// Working at the incident site
    OnScene,
    /// Heading back to base after a mission
    Returning,
}

impl TeamStatus {
    /// True when the team can take a new assignment.
    pub fn is_available(&self) -> bool {
        matches!(self, TeamStatus::Available)
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TeamStatus::Available => "available",
            TeamStatus::EnRoute => "en_route",
            TeamStatus::OnScene => "on_scene",
            TeamStatus::Returning => "returning",
        };
        f.write_str(s)
    }
}

impl FromStr for TeamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(TeamStatus::Available),
            "en_route" => Ok(TeamStatus::EnRoute),
            "on_scene" => Ok(TeamStatus::OnScene),
            "returning" => Ok(TeamStatus::Returning),
            other => Err(format!(
                "Invalid status '{other}'. Must be one of: available, en_route, on_scene, returning"
            )),
        }
    }
}

/// One rescue team in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique team identifier
    pub id: String,
    /// Human-readable team name
    pub name: String,
    /// Crew size
    pub personnel: u32,
    /// Primary vehicle
    pub vehicle: String,
    /// Equipment carried, by name
    pub equipment: BTreeSet<String>,
    /// Current position
    pub location: Location,
    /// Operational status
    pub status: TeamStatus,
    /// Case currently assigned, if any
    pub assigned_to: Option<String>,
    /// Estimated minutes to the assigned case, if en route
    pub eta_minutes: Option<u32>,
    /// Last registry update (Unix epoch milliseconds)
    pub last_update: u64,
}

impl Team {
    /// Build a team from a config seed entry.
    pub fn from_config(config: &TeamConfig, now: u64) -> Result<Self, vigil_core::GeoError> {
        Ok(Self {
            id: config.id.clone(),
            name: config.name.clone(),
            personnel: config.personnel,
            vehicle: config.vehicle.clone(),
            equipment: config.equipment.iter().cloned().collect(),
            location: Location::new(config.lat, config.lng)?,
            status: TeamStatus::Available,
            assigned_to: None,
            eta_minutes: None,
            last_update: now,
        })
    }

    /// True when this team carries every item in `required`.
    pub fn carries_all(&self, required: &[String]) -> bool {
        required.iter().all(|item| self.equipment.contains(item))
    }
}
