//! Dependency graph built from a project snapshot
//!
//! # Edge Direction
//!
//! Every edge means "source blocks target". A `blocks` reference on item A
//! pointing at B adds `A -> B`; a `blocked_by` reference on B pointing at A adds
//! the same edge, so both declaration styles collapse into one edge.
//! `related_to` references never become edges.

mod analysis;
mod cycles;

pub use analysis::{
    AnalysisCriteria, CycleReport, DependencyAnalysis, MissingReport, StatusInconsistency,
    StatusReport,
};
pub use cycles::{cyclic_components, find_cycles, CycleSearch};

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::{condensation, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use tracing::debug;

use crate::index::ItemIndex;
use crate::model::RelationshipKind;

/// A relationship whose target is not in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    /// Item that declared the reference
    pub item_id: String,
    /// How the reference was declared
    pub kind: RelationshipKind,
    /// Id that could not be found
    pub target_id: String,
}

/// Directed "blocks" graph over the items of one snapshot
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
    related: BTreeSet<(String, String)>,
    dangling: Vec<DanglingReference>,
}

impl DependencyGraph {
    /// Build the graph from an indexed snapshot
    ///
    /// Never fails: references to unknown items are collected as dangling.
    pub fn build(index: &ItemIndex<'_>) -> Self {
        let mut graph = Self::default();

        for item in index.items() {
            graph.add_node(&item.id);
        }

        let mut seen_dangling: HashSet<(&str, RelationshipKind, &str)> = HashSet::new();

        for item in index.items() {
            for (kind, target) in item.relationships.iter() {
                if !index.contains(target) {
                    if seen_dangling.insert((item.id.as_str(), kind, target)) {
                        graph.dangling.push(DanglingReference {
                            item_id: item.id.clone(),
                            kind,
                            target_id: target.to_string(),
                        });
                    }
                    continue;
                }

                match kind {
                    RelationshipKind::Blocks => graph.add_edge(&item.id, target),
                    RelationshipKind::BlockedBy => graph.add_edge(target, &item.id),
                    RelationshipKind::RelatedTo => {
                        let pair = if item.id.as_str() <= target {
                            (item.id.clone(), target.to_string())
                        } else {
                            (target.to_string(), item.id.clone())
                        };
                        graph.related.insert(pair);
                    }
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dangling = graph.dangling.len(),
            "Built dependency graph"
        );

        graph
    }

    fn add_node(&mut self, id: &str) {
        if !self.nodes.contains_key(id) {
            let idx = self.graph.add_node(id.to_string());
            self.nodes.insert(id.to_string(), idx);
        }
    }

    fn add_edge(&mut self, blocker: &str, blocked: &str) {
        if let (Some(&from), Some(&to)) = (self.nodes.get(blocker), self.nodes.get(blocked)) {
            // update_edge keeps a single edge per ordered pair
            self.graph.update_edge(from, to, ());
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether `blocker` has a canonical edge to `blocked`
    pub fn blocks(&self, blocker: &str, blocked: &str) -> bool {
        match (self.nodes.get(blocker), self.nodes.get(blocked)) {
            (Some(&from), Some(&to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// All canonical edges as `(blocker, blocked)` id pairs
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
            )
        })
    }

    /// Ids of items blocking `id`
    pub fn blockers_of<'s>(&'s self, id: &str) -> Vec<&'s str> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Ids of items blocked by `id`
    pub fn blocked_by<'s>(&'s self, id: &str) -> Vec<&'s str> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors<'s>(&'s self, id: &str, dir: Direction) -> Vec<&'s str> {
        let Some(&idx) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        out.sort_unstable();
        out.into_iter().map(|n| self.graph[n].as_str()).collect()
    }

    /// Unordered `related_to` pairs, smaller id first
    pub fn related(&self) -> &BTreeSet<(String, String)> {
        &self.related
    }

    /// References to items missing from the snapshot, grouped by source item
    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Number of edges on the longest blocking chain
    ///
    /// Cycles are collapsed first: a cyclic component counts each of its
    /// members once, so a chain through it spans all of them.
    pub fn max_chain_length(&self) -> usize {
        if self.graph.edge_count() == 0 {
            return 0;
        }

        let condensed = condensation(self.graph.clone(), true);
        let Ok(order) = toposort(&condensed, None) else {
            return 0;
        };

        // Longest path measured in items, each component weighted by its size
        let mut longest: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
        for &v in &order {
            let best_pred = condensed
                .edges_directed(v, Direction::Incoming)
                .filter_map(|e| longest.get(&e.source()).copied())
                .max()
                .unwrap_or(0);
            longest.insert(v, best_pred + condensed[v].len());
        }

        longest.values().copied().max().unwrap_or(0).saturating_sub(1)
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, ()> {
        &self.graph
    }
}
