//! Checks over the dependency graph

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cycles::find_cycles;
use super::{DanglingReference, DependencyGraph};
use crate::index::ItemIndex;
use crate::model::ItemStatus;

/// Which checks to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisCriteria {
    #[serde(default)]
    pub check_cycles: bool,
    #[serde(default)]
    pub check_missing: bool,
    #[serde(default)]
    pub check_status: bool,
}

impl AnalysisCriteria {
    /// Every check enabled
    pub fn all() -> Self {
        Self {
            check_cycles: true,
            check_missing: true,
            check_status: true,
        }
    }
}

/// Result of cycle detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub has_cycles: bool,
    pub cycles: Vec<Vec<String>>,
    /// Set when enumeration stopped at the configured cap
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// Result of missing-reference detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingReport {
    pub has_missing: bool,
    pub missing: Vec<DanglingReference>,
}

/// A blocked item that is further along than an unfinished blocker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusInconsistency {
    pub blocker_id: String,
    pub blocked_id: String,
    pub blocker_status: ItemStatus,
    pub blocked_status: ItemStatus,
}

/// Result of the status consistency check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub has_inconsistencies: bool,
    pub inconsistencies: Vec<StatusInconsistency>,
}

/// Dependency analysis report; only requested checks are present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<CycleReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<MissingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusReport>,
}

impl DependencyAnalysis {
    /// Run the requested checks
    pub fn run(
        graph: &DependencyGraph,
        index: &ItemIndex<'_>,
        criteria: AnalysisCriteria,
        max_cycles: usize,
    ) -> Self {
        let analysis = Self {
            cycles: criteria
                .check_cycles
                .then(|| check_cycles(graph, max_cycles)),
            missing: criteria.check_missing.then(|| check_missing(graph)),
            status: criteria.check_status.then(|| check_status(graph, index)),
        };

        debug!(
            cycles = analysis.cycles.as_ref().map(|c| c.cycles.len()),
            missing = analysis.missing.as_ref().map(|m| m.missing.len()),
            inconsistencies = analysis.status.as_ref().map(|s| s.inconsistencies.len()),
            "Dependency analysis complete"
        );

        analysis
    }
}

pub(crate) fn check_cycles(graph: &DependencyGraph, max_cycles: usize) -> CycleReport {
    let search = find_cycles(graph, max_cycles);
    CycleReport {
        has_cycles: !search.cycles.is_empty(),
        cycles: search.cycles,
        truncated: search.truncated,
    }
}

pub(crate) fn check_missing(graph: &DependencyGraph) -> MissingReport {
    let missing = graph.dangling().to_vec();
    MissingReport {
        has_missing: !missing.is_empty(),
        missing,
    }
}

/// Flag edges where the blocked item ranks above a blocker that is not done
///
/// Items without a status on the lifecycle ordering are skipped.
pub(crate) fn check_status(graph: &DependencyGraph, index: &ItemIndex<'_>) -> StatusReport {
    let inconsistencies: Vec<StatusInconsistency> = graph
        .edges()
        .filter_map(|(blocker, blocked)| {
            let blocker_status = index.status_of(blocker)?;
            let blocked_status = index.status_of(blocked)?;
            let blocker_rank = blocker_status.lifecycle_rank()?;
            let blocked_rank = blocked_status.lifecycle_rank()?;

            (blocker_status != ItemStatus::Done && blocked_rank > blocker_rank).then(|| {
                StatusInconsistency {
                    blocker_id: blocker.to_string(),
                    blocked_id: blocked.to_string(),
                    blocker_status,
                    blocked_status,
                }
            })
        })
        .collect();

    StatusReport {
        has_inconsistencies: !inconsistencies.is_empty(),
        inconsistencies,
    }
}
