//! Priority queue of cases
//!
//! The collection is always sorted by `(-score, created_at)`: higher severity
//! first, ties broken by earlier arrival. Readers observe a fully-sorted
//! snapshot; every mutation is persisted before it is considered committed.

use crate::case::{Case, CaseStatus};
use crate::store::{QueueStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};
use vigil_core::now_ms;

/// Errors from queue operations
#[derive(Debug, Error)]
pub enum TriageError {
    /// No case with the given id
    #[error("Case not found: {0}")]
    CaseNotFound(String),

    /// Status change outside pending -> in_progress -> resolved
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: CaseStatus,
        /// Rejected target status
        to: CaseStatus,
    },

    /// Status string outside the allowed enum
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Durability layer failure; the mutation was not committed
    #[error("Queue store error: {0}")]
    Store(#[from] StoreError),
}

/// Where a case landed after an upsert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuePlacement {
    pub case_id: String,
    pub score: i32,
    /// 1-indexed rank in the full sorted order
    pub position: usize,
    pub queue_size: usize,
}

/// Aggregate queue counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub top_score: Option<i32>,
}

struct QueueInner {
    cases: Vec<Case>,
    store: QueueStore,
}

/// Priority queue over the durable case list.
///
/// A single lock guards both the in-memory order and the snapshot store, so
/// no reader can observe a partially-sorted state and no two writers can
/// interleave their snapshot writes.
pub struct PriorityQueue {
    inner: Mutex<QueueInner>,
}

impl PriorityQueue {
    /// Open the queue over a snapshot store, loading any persisted cases.
    pub fn open(store: QueueStore) -> Result<Self, TriageError> {
        let mut cases = store.load()?;
        sort_cases(&mut cases);

        info!(queue_size = cases.len(), "Priority queue ready");

        Ok(Self {
            inner: Mutex::new(QueueInner { cases, store }),
        })
    }

    /// Insert a new case or replace an existing one with the same id.
    ///
    /// A replaced case keeps its original `created_at` (stable tie-break) and
    /// its current status; score, location and description are updated and
    /// the queue is re-sorted. The snapshot is written before the mutation
    /// commits.
    pub fn upsert(&self, mut case: Case) -> Result<QueuePlacement, TriageError> {
        let mut inner = self.inner.lock().expect("queue lock poisoned");

        let mut next = inner.cases.clone();
        if let Some(existing) = next.iter_mut().find(|c| c.id == case.id) {
            case.created_at = existing.created_at;
            case.status = existing.status;
            case.status_updated_at = existing.status_updated_at;
            *existing = case.clone();
            info!(case_id = %case.id, score = case.score, "Updated existing case");
        } else {
            next.push(case.clone());
            info!(case_id = %case.id, score = case.score, "Added new case");
        }

        sort_cases(&mut next);
        inner.store.save(&next)?;
        inner.cases = next;

        let position = inner
            .cases
            .iter()
            .position(|c| c.id == case.id)
            .map(|i| i + 1)
            .unwrap_or(0);

        Ok(QueuePlacement {
            case_id: case.id,
            score: case.score,
            position,
            queue_size: inner.cases.len(),
        })
    }

    /// Get a case by id.
    pub fn get(&self, id: &str) -> Option<Case> {
        let inner = self.inner.lock().expect("queue lock poisoned");
        inner.cases.iter().find(|c| c.id == id).cloned()
    }

    /// List cases in priority order, optionally filtered by status and
    /// truncated to `limit` entries.
    pub fn list(&self, limit: Option<usize>, status_filter: Option<CaseStatus>) -> Vec<Case> {
        let inner = self.inner.lock().expect("queue lock poisoned");
        let filtered = inner
            .cases
            .iter()
            .filter(|c| status_filter.map_or(true, |s| c.status == s))
            .cloned();

        match limit {
            Some(n) => filtered.take(n).collect(),
            None => filtered.collect(),
        }
    }

    /// Top `n` cases by priority, ignoring status.
    pub fn top(&self, n: usize) -> Vec<Case> {
        self.list(Some(n), None)
    }

    /// 1-indexed rank of a case in the full sorted order, independent of any
    /// limit or filter applied by reads.
    pub fn position(&self, id: &str) -> Result<usize, TriageError> {
        let inner = self.inner.lock().expect("queue lock poisoned");
        inner
            .cases
            .iter()
            .position(|c| c.id == id)
            .map(|i| i + 1)
            .ok_or_else(|| TriageError::CaseNotFound(id.to_string()))
    }

    /// Advance a case's status.
    ///
    /// Only `pending -> in_progress -> resolved` is allowed; anything else is
    /// rejected with [`TriageError::InvalidTransition`].
    pub fn set_status(&self, id: &str, status: CaseStatus) -> Result<Case, TriageError> {
        let mut inner = self.inner.lock().expect("queue lock poisoned");

        let mut next = inner.cases.clone();
        let case = next
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| TriageError::CaseNotFound(id.to_string()))?;

        if !case.status.can_transition_to(status) {
            warn!(case_id = %id, from = %case.status, to = %status, "Rejected status transition");
            return Err(TriageError::InvalidTransition {
                from: case.status,
                to: status,
            });
        }

        case.status = status;
        case.status_updated_at = Some(now_ms());
        let updated = case.clone();

        inner.store.save(&next)?;
        inner.cases = next;

        info!(case_id = %id, status = %status, "Case status updated");
        Ok(updated)
    }

    /// Remove a case from the queue entirely.
    pub fn remove(&self, id: &str) -> Result<Case, TriageError> {
        let mut inner = self.inner.lock().expect("queue lock poisoned");

        let idx = inner
            .cases
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| TriageError::CaseNotFound(id.to_string()))?;

        let mut next = inner.cases.clone();
        let removed = next.remove(idx);

        inner.store.save(&next)?;
        inner.cases = next;

        info!(case_id = %id, "Case removed from queue");
        Ok(removed)
    }

    /// Number of cases in the queue.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("queue lock poisoned").cases.len()
    }

    /// True when no cases are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate counters for dashboards.
    pub fn stats(&self) -> QueueStats {
        let inner = self.inner.lock().expect("queue lock poisoned");
        let mut stats = QueueStats {
            total: inner.cases.len(),
            top_score: inner.cases.first().map(|c| c.score),
            ..QueueStats::default()
        };

        for case in &inner.cases {
            match case.status {
                CaseStatus::Pending => stats.pending += 1,
                CaseStatus::InProgress => stats.in_progress += 1,
                CaseStatus::Resolved => stats.resolved += 1,
            }
        }

        stats
    }
}

/// Sort by descending score, ties broken by earlier arrival.
fn sort_cases(cases: &mut [Case]) {
    cases.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}
