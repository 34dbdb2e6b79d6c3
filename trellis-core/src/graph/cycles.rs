//! Cycle enumeration over the blocks graph

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::DependencyGraph;

/// Simple cycles found in a graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSearch {
    /// Each cycle starts at its earliest item (snapshot order) and follows
    /// the blocks edges around the loop
    pub cycles: Vec<Vec<String>>,
    /// The search stopped at the limit with more cycles left
    pub truncated: bool,
}

/// Enumerate every simple cycle, up to `limit` of them
///
/// Strongly connected components bound the search. Inside a cyclic component
/// each member in turn roots a depth-first search that only steps onto later
/// members, so every cycle is reported once, rotated to start at its earliest
/// item. A self-edge yields a one-element cycle.
pub fn find_cycles(graph: &DependencyGraph, limit: usize) -> CycleSearch {
    let g = graph.inner();
    let mut search = CycleSearch::default();

    for component in cyclic_indices(g) {
        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        for &root in &component {
            if !cycles_rooted_at(g, root, &members, limit, &mut search.cycles) {
                search.truncated = true;
                return search;
            }
        }
    }

    search
}

/// Members of every component that contains a cycle, in snapshot order
pub fn cyclic_components(graph: &DependencyGraph) -> Vec<Vec<&str>> {
    let g = graph.inner();
    cyclic_indices(g)
        .into_iter()
        .map(|component| component.into_iter().map(|n| g[n].as_str()).collect())
        .collect()
}

fn cyclic_indices(g: &DiGraph<String, ()>) -> Vec<Vec<NodeIndex>> {
    let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(g)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| g.find_edge(n, n).is_some())
        })
        .map(|mut component| {
            component.sort_unstable();
            component
        })
        .collect();

    components.sort_unstable_by_key(|c| c[0]);
    components
}

/// One vertex on the current search path
struct Frame {
    node: NodeIndex,
    next: Vec<NodeIndex>,
    /// Some cycle through `root` was closed below this vertex
    closed: bool,
}

impl Frame {
    fn new(g: &DiGraph<String, ()>, node: NodeIndex) -> Self {
        Frame {
            node,
            next: successors(g, node),
            closed: false,
        }
    }
}

/// Collect the cycles whose earliest member is `root`
///
/// A vertex that failed to lead back to `root` stays blocked until one of its
/// successors is unblocked, so dead-end paths are walked once per root rather
/// than once per way of reaching them.
///
/// Returns `false` once a cycle is found with `limit` already collected.
fn cycles_rooted_at(
    g: &DiGraph<String, ()>,
    root: NodeIndex,
    members: &HashSet<NodeIndex>,
    limit: usize,
    out: &mut Vec<Vec<String>>,
) -> bool {
    let in_scope = |n: NodeIndex| n > root && members.contains(&n);

    let mut path = vec![root];
    let mut blocked: HashSet<NodeIndex> = HashSet::from([root]);
    let mut waiting: HashMap<NodeIndex, HashSet<NodeIndex>> = HashMap::new();
    let mut stack = vec![Frame::new(g, root)];

    while let Some(frame) = stack.last_mut() {
        let node = frame.node;
        match frame.next.pop() {
            Some(next) if next == root => {
                if out.len() >= limit {
                    return false;
                }
                out.push(path.iter().map(|&n| g[n].clone()).collect());
                frame.closed = true;
            }
            Some(next) if in_scope(next) && !blocked.contains(&next) => {
                path.push(next);
                blocked.insert(next);
                stack.push(Frame::new(g, next));
            }
            Some(_) => {}
            None => {
                let closed = frame.closed;
                stack.pop();
                path.pop();

                if closed {
                    unblock(node, &mut blocked, &mut waiting);
                    if let Some(parent) = stack.last_mut() {
                        parent.closed = true;
                    }
                } else {
                    for succ in g.neighbors(node).filter(|&n| in_scope(n)) {
                        waiting.entry(succ).or_default().insert(node);
                    }
                }
            }
        }
    }

    true
}

/// Release `node` and every blocked vertex waiting on it
fn unblock(
    node: NodeIndex,
    blocked: &mut HashSet<NodeIndex>,
    waiting: &mut HashMap<NodeIndex, HashSet<NodeIndex>>,
) {
    let mut pending = vec![node];
    while let Some(n) = pending.pop() {
        if blocked.remove(&n) {
            if let Some(released) = waiting.remove(&n) {
                pending.extend(released);
            }
        }
    }
}

/// Successors in reverse index order, so popping visits them in snapshot order
fn successors(g: &DiGraph<String, ()>, node: NodeIndex) -> Vec<NodeIndex> {
    let mut next: Vec<NodeIndex> = g.neighbors(node).collect();
    next.sort_unstable_by(|a, b| b.cmp(a));
    next.dedup();
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ItemIndex;
    use crate::model::{ContentKind, Item, Snapshot};

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        owned_graph(
            edges
                .iter()
                .map(|(id, blocks)| {
                    let blocks = blocks.iter().map(|s| s.to_string()).collect();
                    (id.to_string(), blocks)
                })
                .collect(),
        )
    }

    fn owned_graph(edges: Vec<(String, Vec<String>)>) -> DependencyGraph {
        let items = edges
            .into_iter()
            .map(|(id, blocks)| {
                let mut item = Item::new(id, ContentKind::Issue);
                item.relationships.blocks = blocks;
                item
            })
            .collect();
        let snapshot = Snapshot::new("P", items);
        let index = ItemIndex::new(&snapshot, "Status");
        DependencyGraph::build(&index)
    }

    fn ids(cycle: &[&str]) -> Vec<String> {
        cycle.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_self_edge_is_single_cycle() {
        let g = graph(&[("A", &["A"])]);
        let search = find_cycles(&g, 100);

        assert_eq!(search.cycles, vec![ids(&["A"])]);
        assert!(!search.truncated);
    }

    #[test]
    fn test_three_cycle_reported_once_from_any_start() {
        let orders: [&[(&str, &[&str])]; 3] = [
            &[("A", &["B"]), ("B", &["C"]), ("C", &["A"])],
            &[("B", &["C"]), ("C", &["A"]), ("A", &["B"])],
            &[("C", &["A"]), ("A", &["B"]), ("B", &["C"])],
        ];

        for order in orders {
            let search = find_cycles(&graph(order), 100);
            assert_eq!(search.cycles.len(), 1);
            let cycle = &search.cycles[0];
            assert_eq!(cycle.len(), 3);

            // Same loop, rotated to the earliest item of that snapshot
            let start = cycle.iter().position(|id| id == "A").unwrap();
            let mut rotated = cycle.clone();
            rotated.rotate_left(start);
            assert_eq!(rotated, ids(&["A", "B", "C"]));
        }
    }

    #[test]
    fn test_overlapping_cycles_all_found() {
        // A <-> B and B -> C -> A share B
        let g = graph(&[("A", &["B"]), ("B", &["A", "C"]), ("C", &["A"])]);
        let search = find_cycles(&g, 100);

        assert_eq!(
            search.cycles,
            vec![ids(&["A", "B"]), ids(&["A", "B", "C"])]
        );
    }

    #[test]
    fn test_no_duplicate_rotations() {
        let g = graph(&[
            ("A", &["B", "C"]),
            ("B", &["C", "A"]),
            ("C", &["A", "B"]),
        ]);
        let search = find_cycles(&g, 100);

        let mut canonical: Vec<Vec<String>> = search
            .cycles
            .iter()
            .map(|c| {
                let min = c.iter().enumerate().min_by_key(|(_, id)| *id).map(|(i, _)| i).unwrap();
                let mut r = c.clone();
                r.rotate_left(min);
                r
            })
            .collect();
        let before = canonical.len();
        canonical.sort();
        canonical.dedup();
        assert_eq!(canonical.len(), before);
        // Three 2-cycles and two 3-cycles
        assert_eq!(before, 5);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
        assert!(find_cycles(&g, 100).cycles.is_empty());
        assert!(cyclic_components(&g).is_empty());
    }

    #[test]
    fn test_limit_truncates() {
        let g = graph(&[("A", &["A"]), ("B", &["B"]), ("C", &["C"])]);
        let search = find_cycles(&g, 2);

        assert_eq!(search.cycles.len(), 2);
        assert!(search.truncated);
    }

    /// R -> G -> R, plus `layers` two-wide layers from G that all funnel into
    /// Z -> G. From R every route through the layers dead-ends at G.
    fn layered(layers: usize) -> DependencyGraph {
        let layer = |i: usize| vec![format!("a{}", i), format!("b{}", i)];
        let mut edges = vec![
            ("R".to_string(), vec!["G".to_string()]),
            ("G".to_string(), [vec!["R".to_string()], layer(0)].concat()),
        ];
        for i in 0..layers {
            let next = if i + 1 == layers { vec!["Z".to_string()] } else { layer(i + 1) };
            for id in layer(i) {
                edges.push((id, next.clone()));
            }
        }
        edges.push(("Z".to_string(), vec!["G".to_string()]));
        owned_graph(edges)
    }

    #[test]
    fn test_dead_end_paths_are_not_rewalked() {
        // 2^40 routes from G to Z; only blocking keeps root R linear
        let search = find_cycles(&layered(40), 50);

        assert_eq!(search.cycles[0], ids(&["R", "G"]));
        assert_eq!(search.cycles.len(), 50);
        assert!(search.truncated);
    }

    #[test]
    fn test_blocking_keeps_every_cycle() {
        // 2 + 2 routes through two layers, plus R <-> G
        let search = find_cycles(&layered(2), 100);

        assert_eq!(search.cycles.len(), 5);
        assert!(!search.truncated);
        assert!(search.cycles[1..].iter().all(|c| c[0] == "G" && c.len() == 4));
    }

    #[test]
    fn test_cyclic_components() {
        let g = graph(&[("A", &["B"]), ("B", &["A"]), ("C", &["C"]), ("D", &["A"])]);
        assert_eq!(cyclic_components(&g), vec![vec!["A", "B"], vec!["C"]]);
    }
}
