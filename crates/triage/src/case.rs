//! Case model and lifecycle
//!
//! A case is one incident/victim report tracked through triage and dispatch.
//! Status moves strictly `pending -> in_progress -> resolved`; no skipping,
//! no reverse.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vigil_core::Location;

/// Case lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Awaiting dispatch
    Pending,
    /// A team is en route or on scene
    InProgress,
    /// Response completed
    Resolved,
}

impl CaseStatus {
    /// Check if transition to a new status is valid
    pub fn can_transition_to(&self, new_status: CaseStatus) -> bool {
        matches!(
            (self, new_status),
            (CaseStatus::Pending, CaseStatus::InProgress)
                | (CaseStatus::InProgress, CaseStatus::Resolved)
        )
    }

    /// Check if the status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Resolved)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseStatus::Pending => "pending",
            CaseStatus::InProgress => "in_progress",
            CaseStatus::Resolved => "resolved",
        };
        f.write_str(s)
    }
}

impl FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CaseStatus::Pending),
            "in_progress" => Ok(CaseStatus::InProgress),
            "resolved" => Ok(CaseStatus::Resolved),
            other => Err(format!(
                "Invalid status '{other}'. Must be one of: pending, in_progress, resolved"
            )),
        }
    }
}

/// Triage priority level derived from the severity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    Critical,
    Urgent,
    Serious,
    Minor,
    NonUrgent,
}

impl PriorityLevel {
    /// Map a severity score onto a priority band.
    ///
    /// Any integer is accepted; scores above the 0-10 band saturate at
    /// CRITICAL and negative scores fall to NON_URGENT.
    pub fn from_score(score: i32) -> Self {
        if score >= 9 {
            PriorityLevel::Critical
        } else if score >= 7 {
            PriorityLevel::Urgent
        } else if score >= 5 {
            PriorityLevel::Serious
        } else if score >= 3 {
            PriorityLevel::Minor
        } else {
            PriorityLevel::NonUrgent
        }
    }

    /// Display color for operator dashboards.
    pub fn color_code(&self) -> &'static str {
        match self {
            PriorityLevel::Critical => "red",
            PriorityLevel::Urgent | PriorityLevel::Serious => "orange",
            PriorityLevel::Minor => "yellow",
            PriorityLevel::NonUrgent => "green",
        }
    }
}

/// One incident case tracked through triage and dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    /// Unique case identifier
    pub id: String,
    /// Severity score from the scoring collaborator (higher = more urgent)
    pub score: i32,
    /// Priority band derived from the score
    pub priority_level: PriorityLevel,
    /// Incident location
    pub location: Location,
    /// Situation description
    pub description: String,
    /// Number of people affected
    pub num_people: u32,
    /// Lifecycle status
    pub status: CaseStatus,
    /// Creation timestamp (Unix epoch milliseconds)
    pub created_at: u64,
    /// Timestamp of the last status change
    pub status_updated_at: Option<u64>,
}

impl Case {
    /// Create a new pending case, deriving the priority level from the score.
    pub fn new(
        id: impl Into<String>,
        score: i32,
        location: Location,
        description: impl Into<String>,
        num_people: u32,
        created_at: u64,
    ) -> Self {
        Self {
            id: id.into(),
            score,
            priority_level: PriorityLevel::from_score(score),
            location,
            description: description.into(),
            num_people,
            status: CaseStatus::Pending,
            created_at,
            status_updated_at: None,
        }
    }
}
