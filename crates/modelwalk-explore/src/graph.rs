//! State graph store: arena-indexed directed multigraph.
//!
//! Vertices are distinct state values, edges are `(from, action, to)`
//! triples. Both live in flat tables addressed by integer handles, so
//! auxiliary per-vertex data (see [`crate::exploration`]) is just another
//! vector indexed by [`VertexId`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Stable handle of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub usize);

/// Stable handle of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

/// A labeled transition between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: VertexId,
    pub action: usize,
    pub to: VertexId,
}

/// Directed multigraph of observed states and transitions.
#[derive(Debug, Clone)]
pub struct StateGraph<S> {
    states: Vec<S>,
    index: BTreeMap<S, VertexId>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming_counts: Vec<usize>,
    edge_set: BTreeSet<(VertexId, usize, VertexId)>,
}

impl<S: Clone + Ord> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            index: BTreeMap::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming_counts: Vec::new(),
            edge_set: BTreeSet::new(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.states.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Vertex handle for a state, if it has been visited.
    pub fn vertex(&self, state: &S) -> Option<VertexId> {
        self.index.get(state).copied()
    }

    /// State value of a vertex.
    pub fn state(&self, vertex: VertexId) -> &S {
        &self.states[vertex.0]
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> {
        (0..self.states.len()).map(VertexId)
    }

    /// Insert a vertex for `state` unless one exists.
    ///
    /// Returns the handle and whether the vertex was created.
    pub fn add_vertex(&mut self, state: S) -> (VertexId, bool) {
        if let Some(&id) = self.index.get(&state) {
            return (id, false);
        }
        let id = VertexId(self.states.len());
        self.states.push(state.clone());
        self.index.insert(state, id);
        self.outgoing.push(Vec::new());
        self.incoming_counts.push(0);
        (id, true)
    }

    /// Insert an edge unless the same triple already exists.
    ///
    /// Returns the new edge handle, or `None` if it coalesced.
    pub fn add_edge(&mut self, from: VertexId, action: usize, to: VertexId) -> Option<EdgeId> {
        if !self.edge_set.insert((from, action, to)) {
            return None;
        }
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { from, action, to });
        self.outgoing[from.0].push(id);
        self.incoming_counts[to.0] += 1;
        Some(id)
    }

    pub fn contains_edge(&self, from: VertexId, action: usize, to: VertexId) -> bool {
        self.edge_set.contains(&(from, action, to))
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edges of `vertex`, in insertion order.
    pub fn outgoing(&self, vertex: VertexId) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing[vertex.0].iter().map(move |e| &self.edges[e.0])
    }

    pub fn out_degree(&self, vertex: VertexId) -> usize {
        self.outgoing[vertex.0].len()
    }

    pub fn in_degree(&self, vertex: VertexId) -> usize {
        self.incoming_counts[vertex.0]
    }

    /// Targets reached from `vertex` by `action` (several if the model is
    /// nondeterministic under this abstraction).
    pub fn successors(&self, vertex: VertexId, action: usize) -> Vec<VertexId> {
        self.outgoing(vertex)
            .filter(|e| e.action == action)
            .map(|e| e.to)
            .collect()
    }

    /// Whether `vertex` has at least one outgoing edge labeled `action`.
    pub fn has_action_edge(&self, vertex: VertexId, action: usize) -> bool {
        self.outgoing(vertex).any(|e| e.action == action)
    }

    /// Breadth-first search from `from` to the nearest vertex satisfying
    /// `target`. Returns the edge path (empty if `from` itself matches).
    pub fn find_path(
        &self,
        from: VertexId,
        target: impl Fn(VertexId) -> bool,
    ) -> Option<Vec<EdgeId>> {
        if target(from) {
            return Some(Vec::new());
        }
        let mut parent: Vec<Option<EdgeId>> = vec![None; self.states.len()];
        let mut seen = vec![false; self.states.len()];
        let mut queue = VecDeque::new();
        seen[from.0] = true;
        queue.push_back(from);

        while let Some(v) = queue.pop_front() {
            for &edge_id in &self.outgoing[v.0] {
                let to = self.edges[edge_id.0].to;
                if seen[to.0] {
                    continue;
                }
                seen[to.0] = true;
                parent[to.0] = Some(edge_id);
                if target(to) {
                    return Some(self.unwind(&parent, from, to));
                }
                queue.push_back(to);
            }
        }
        None
    }

    /// Shortest edge path between two vertices.
    pub fn shortest_path(&self, from: VertexId, to: VertexId) -> Option<Vec<EdgeId>> {
        self.find_path(from, |v| v == to)
    }

    fn unwind(&self, parent: &[Option<EdgeId>], from: VertexId, to: VertexId) -> Vec<EdgeId> {
        let mut path = Vec::new();
        let mut v = to;
        while v != from {
            // Every vertex reached by the search has a parent edge.
            let Some(edge_id) = parent[v.0] else { break };
            path.push(edge_id);
            v = self.edges[edge_id.0].from;
        }
        path.reverse();
        path
    }
}

impl<S: Clone + Ord> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> StateGraph<&'static str> {
        // a -0-> b -1-> d, a -1-> c -0-> d, d -2-> a
        let mut g = StateGraph::new();
        let (a, _) = g.add_vertex("a");
        let (b, _) = g.add_vertex("b");
        let (c, _) = g.add_vertex("c");
        let (d, _) = g.add_vertex("d");
        g.add_edge(a, 0, b);
        g.add_edge(b, 1, d);
        g.add_edge(a, 1, c);
        g.add_edge(c, 0, d);
        g.add_edge(d, 2, a);
        g
    }

    #[test]
    fn test_vertices_are_unique_by_value() {
        let mut g = StateGraph::new();
        let (x, created) = g.add_vertex("x".to_string());
        assert!(created);
        let (y, created) = g.add_vertex("x".to_string());
        assert!(!created);
        assert_eq!(x, y);
        assert_eq!(g.num_vertices(), 1);
        assert_eq!(g.state(x), "x");
    }

    #[test]
    fn test_duplicate_edges_coalesce() {
        let mut g = StateGraph::new();
        let (a, _) = g.add_vertex(1);
        let (b, _) = g.add_vertex(2);
        assert!(g.add_edge(a, 0, b).is_some());
        assert!(g.add_edge(a, 0, b).is_none());
        assert!(g.add_edge(a, 1, b).is_some());
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.out_degree(a), 2);
        assert_eq!(g.in_degree(b), 2);
    }

    #[test]
    fn test_successors_and_labels() {
        let g = diamond();
        let a = g.vertex(&"a").unwrap();
        assert_eq!(g.successors(a, 0), vec![g.vertex(&"b").unwrap()]);
        assert!(g.has_action_edge(a, 1));
        assert!(!g.has_action_edge(a, 2));
    }

    #[test]
    fn test_shortest_path() {
        let g = diamond();
        let a = g.vertex(&"a").unwrap();
        let d = g.vertex(&"d").unwrap();

        let path = g.shortest_path(a, d).unwrap();
        assert_eq!(path.len(), 2);
        // First discovered branch wins: a -0-> b -1-> d.
        let actions: Vec<_> = path.iter().map(|&e| g.edge(e).action).collect();
        assert_eq!(actions, vec![0, 1]);

        let back = g.shortest_path(d, a).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(g.shortest_path(a, a).unwrap().len(), 0);
    }

    #[test]
    fn test_find_path_unreachable() {
        let mut g = diamond();
        let (lonely, _) = g.add_vertex("z");
        let a = g.vertex(&"a").unwrap();
        assert!(g.shortest_path(a, lonely).is_none());
        assert!(g.find_path(lonely, |v| v == a).is_none());
    }
}
