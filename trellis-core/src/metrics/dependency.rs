//! Dependency status

use std::collections::HashSet;

use serde::Serialize;

use crate::graph::{cyclic_components, DependencyGraph};
use crate::index::ItemIndex;

/// How tangled the project's blocking relationships are
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    /// Items with at least one blocker that is not done
    pub blocked_items: usize,
    /// Edges on the longest blocking chain
    pub max_chain_length: usize,
    /// Distinct items taking part in a cycle
    pub circular_dependencies: usize,
}

pub fn dependency_status(index: &ItemIndex<'_>, graph: &DependencyGraph) -> DependencyStatus {
    let blocked_items = index
        .items()
        .filter(|item| {
            graph
                .blockers_of(&item.id)
                .into_iter()
                .any(|blocker| !index.is_done(blocker))
        })
        .count();

    let in_cycles: HashSet<&str> = cyclic_components(graph).into_iter().flatten().collect();

    DependencyStatus {
        blocked_items,
        max_chain_length: graph.max_chain_length(),
        circular_dependencies: in_cycles.len(),
    }
}
