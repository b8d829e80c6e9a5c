//! Generic directed-graph algorithms over opaque node identifiers.
//!
//! All traversals use explicit stacks instead of call-stack recursion so
//! that pathological inputs (a 10,000-node chain, a 5,000-node ring) cannot
//! overflow. Auxiliary memory is O(V+E): nodes are mapped to dense indices
//! up front and the algorithms run on integer adjacency lists.
//!
//! Input shape is a node set plus an adjacency map; nodes missing from the
//! adjacency map simply have an empty out-set.

use std::collections::{BTreeMap, BTreeSet};

/// Dense-index view of a graph. Node order follows the ordered input set,
/// which makes every algorithm's output deterministic.
struct IndexedGraph<'a, N> {
    nodes: Vec<&'a N>,
    adjacency: Vec<Vec<usize>>,
}

impl<'a, N: Ord> IndexedGraph<'a, N> {
    fn build(nodes: &'a BTreeSet<N>, edges: &'a BTreeMap<N, BTreeSet<N>>) -> Self {
        let node_list: Vec<&N> = nodes.iter().collect();
        let index: BTreeMap<&N, usize> = node_list.iter().enumerate().map(|(i, n)| (*n, i)).collect();

        let mut adjacency = vec![Vec::new(); node_list.len()];
        for (i, node) in node_list.iter().enumerate() {
            if let Some(targets) = edges.get(node) {
                // Edges to nodes outside the node set are ignored.
                adjacency[i] = targets.iter().filter_map(|t| index.get(t).copied()).collect();
            }
        }

        Self {
            nodes: node_list,
            adjacency,
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Finds cycles in the directed graph.
///
/// Each cycle is reported as the node path closed by repeating the entry
/// node; a self-edge on `n` yields the size-2 cycle `[n, n]`. One cycle is
/// reported per back edge discovered during the DFS sweep.
pub fn find_cycles<N>(nodes: &BTreeSet<N>, edges: &BTreeMap<N, BTreeSet<N>>) -> Vec<Vec<N>>
where
    N: Clone + Ord,
{
    let graph = IndexedGraph::build(nodes, edges);
    let n = graph.len();

    let mut cycles = Vec::new();
    let mut visited = vec![false; n];
    let mut on_path = vec![false; n];
    // DFS frames: (node, next adjacency offset to explore).
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut path: Vec<usize> = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        stack.push((start, 0));

        while let Some(&mut (node, ref mut next)) = stack.last_mut() {
            if *next == 0 {
                visited[node] = true;
                on_path[node] = true;
                path.push(node);
            }

            if *next < graph.adjacency[node].len() {
                let neighbor = graph.adjacency[node][*next];
                *next += 1;

                if !visited[neighbor] {
                    stack.push((neighbor, 0));
                } else if on_path[neighbor] {
                    // Back edge: the cycle runs from the neighbor's position
                    // on the current path to the top, closed by the neighbor.
                    if let Some(pos) = path.iter().position(|&p| p == neighbor) {
                        let mut cycle: Vec<N> =
                            path[pos..].iter().map(|&p| graph.nodes[p].clone()).collect();
                        cycle.push(graph.nodes[neighbor].clone());
                        cycles.push(cycle);
                    }
                }
                // Visited but off-path: forward or cross edge, not a cycle.
            } else {
                stack.pop();
                on_path[node] = false;
                path.pop();
            }
        }
    }

    cycles
}

/// Short-circuiting cycle existence check.
///
/// Invariant: `has_cycles(g) == !find_cycles(g).is_empty()`.
pub fn has_cycles<N>(nodes: &BTreeSet<N>, edges: &BTreeMap<N, BTreeSet<N>>) -> bool
where
    N: Clone + Ord,
{
    let graph = IndexedGraph::build(nodes, edges);
    let n = graph.len();

    let mut visited = vec![false; n];
    let mut on_path = vec![false; n];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        stack.push((start, 0));

        while let Some(&mut (node, ref mut next)) = stack.last_mut() {
            if *next == 0 {
                visited[node] = true;
                on_path[node] = true;
            }

            if *next < graph.adjacency[node].len() {
                let neighbor = graph.adjacency[node][*next];
                *next += 1;

                if !visited[neighbor] {
                    stack.push((neighbor, 0));
                } else if on_path[neighbor] {
                    return true;
                }
            } else {
                stack.pop();
                on_path[node] = false;
            }
        }
    }

    false
}

/// Strongly connected components of size >= 2, via iterative Tarjan.
///
/// Size-1 components are excluded even when they carry a self-loop: they do
/// not represent a mutual dependency between distinct nodes.
pub fn find_strongly_connected_components<N>(
    nodes: &BTreeSet<N>,
    edges: &BTreeMap<N, BTreeSet<N>>,
) -> Vec<BTreeSet<N>>
where
    N: Clone + Ord,
{
    all_sccs(nodes, edges)
        .into_iter()
        .filter(|scc| scc.len() >= 2)
        .collect()
}

/// Total map from each node to its SCC representative.
///
/// The representative is the minimum member of the component; acyclic nodes
/// (including self-loops) map to themselves. Within one SCC every node maps
/// to the same representative, which makes the mapping directly usable for
/// contracting SCCs into super-nodes of a condensed DAG.
pub fn compute_scc_mapping<N>(nodes: &BTreeSet<N>, edges: &BTreeMap<N, BTreeSet<N>>) -> BTreeMap<N, N>
where
    N: Clone + Ord,
{
    let mut mapping = BTreeMap::new();
    for scc in all_sccs(nodes, edges) {
        // BTreeSet iteration starts at the minimum element.
        let representative = scc.iter().next().cloned().expect("SCC is never empty");
        for member in scc {
            mapping.insert(member, representative.clone());
        }
    }
    mapping
}

/// All SCCs including singletons, via Tarjan's algorithm with an explicit
/// frame stack replacing recursion.
fn all_sccs<N>(nodes: &BTreeSet<N>, edges: &BTreeMap<N, BTreeSet<N>>) -> Vec<BTreeSet<N>>
where
    N: Clone + Ord,
{
    let graph = IndexedGraph::build(nodes, edges);
    let n = graph.len();

    const UNVISITED: usize = usize::MAX;
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut tarjan_stack: Vec<usize> = Vec::new();
    let mut counter = 0usize;
    let mut result = Vec::new();

    // Frames: (node, next adjacency offset, parent or UNVISITED for roots).
    let mut call_stack: Vec<(usize, usize, usize)> = Vec::new();

    for start in 0..n {
        if index[start] != UNVISITED {
            continue;
        }
        index[start] = counter;
        lowlink[start] = counter;
        counter += 1;
        on_stack[start] = true;
        tarjan_stack.push(start);
        call_stack.push((start, 0, UNVISITED));

        while let Some(&mut (node, ref mut next, parent)) = call_stack.last_mut() {
            if *next < graph.adjacency[node].len() {
                let neighbor = graph.adjacency[node][*next];
                *next += 1;

                if index[neighbor] == UNVISITED {
                    index[neighbor] = counter;
                    lowlink[neighbor] = counter;
                    counter += 1;
                    on_stack[neighbor] = true;
                    tarjan_stack.push(neighbor);
                    call_stack.push((neighbor, 0, node));
                } else if on_stack[neighbor] {
                    lowlink[node] = lowlink[node].min(index[neighbor]);
                }
            } else {
                // All neighbors explored: emit the SCC if this is its root.
                if lowlink[node] == index[node] {
                    let mut scc = BTreeSet::new();
                    loop {
                        let popped = tarjan_stack.pop().expect("Tarjan stack underflow");
                        on_stack[popped] = false;
                        scc.insert(graph.nodes[popped].clone());
                        if popped == node {
                            break;
                        }
                    }
                    result.push(scc);
                }

                call_stack.pop();
                if parent != UNVISITED {
                    lowlink[parent] = lowlink[parent].min(lowlink[node]);
                }
            }
        }
    }

    result
}
