//! Search output.

use serde::{Deserialize, Serialize};

use super::state::EvolutionTrace;
use crate::models::{Candidate, Catalog, Encoding};
use crate::objective::ObjectiveMode;

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Generations recorded, including the initial one.
    pub generations: usize,
    /// Whether the stagnation threshold ended the run.
    pub stopped_early: bool,
    /// Fitness history.
    pub trace: EvolutionTrace,
    /// Objective used.
    pub objective: ObjectiveMode,
    /// Encoding used.
    pub encoding: Encoding,
}

/// Best-ever candidate of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Per-workload decisions.
    pub candidate: Candidate,
    /// Fitness of `candidate`.
    pub fitness: f64,
    /// Run summary.
    pub report: RunReport,
}

impl Solution {
    /// Ids of accepted workloads (placed ones under the assignment encoding).
    pub fn accepted_ids(&self) -> Vec<&str> {
        self.candidate.enabled_ids(self.report.encoding)
    }

    /// Target site of a workload, if placed.
    pub fn site_of(&self, workload_id: &str) -> Option<&str> {
        self.candidate.gene(workload_id).and_then(|g| g.target_site())
    }

    /// Flattens into a selection-only view in catalog order.
    pub fn selection(&self, catalog: &Catalog) -> SelectionResult {
        SelectionResult::from_candidate(catalog, &self.candidate, self.report.encoding)
    }
}

/// Admission decision for one workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedWorkload {
    /// Workload identifier.
    pub id: String,
    /// Workload priority.
    pub priority: i32,
    /// Whether the workload was admitted.
    pub accepted: bool,
}

/// Selection-only outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// One entry per workload, in catalog order.
    pub accepted: Vec<AcceptedWorkload>,
    /// Whether the result accepts anything at all.
    pub usable: bool,
}

impl SelectionResult {
    /// An empty, unusable result.
    pub fn unusable() -> Self {
        Self::default()
    }

    /// Builds the view of `candidate` over `catalog`.
    pub fn from_candidate(catalog: &Catalog, candidate: &Candidate, encoding: Encoding) -> Self {
        let accepted: Vec<AcceptedWorkload> = catalog
            .workloads()
            .iter()
            .map(|w| AcceptedWorkload {
                id: w.id.clone(),
                priority: w.priority,
                accepted: candidate.gene(&w.id).is_some_and(|g| g.is_enabled(encoding)),
            })
            .collect();
        let usable = accepted.iter().any(|a| a.accepted);
        Self { accepted, usable }
    }

    /// Entries that were accepted.
    pub fn accepted_workloads(&self) -> impl Iterator<Item = &AcceptedWorkload> {
        self.accepted.iter().filter(|a| a.accepted)
    }

    /// Number of accepted workloads.
    pub fn accepted_count(&self) -> usize {
        self.accepted_workloads().count()
    }
}
